//! FFmpeg CLI wrapper and pose inference for the hoopcoach backend.
//!
//! This crate provides:
//! - Container probing via FFprobe (fps, dimensions, duration)
//! - Sequential frame decoding over an FFmpeg rawvideo pipe
//! - ONNX pose-landmark inference behind a [`pose::PoseEstimator`] seam
//! - The head-tracking pipeline combining the three

pub mod error;
pub mod pose;
pub mod probe;
pub mod sampler;
pub mod tracking;

// Re-export common types
pub use error::{MediaError, MediaResult};
pub use pose::{HeadPosition, OnnxPoseDetector, PoseDetectorConfig, PoseEstimator};
pub use probe::{probe_video, VideoProbe};
pub use sampler::{FrameStream, RawFrame};
pub use tracking::{track_head_positions, DEFAULT_FRAME_STRIDE};
