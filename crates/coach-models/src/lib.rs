//! Shared data models for the hoopcoach backend.
//!
//! This crate provides Serde-serializable types for:
//! - Shot events decoded from the AI video analysis
//! - Head tracking samples and container metadata
//! - The process-video response aggregate
//! - Upload storage keys

pub mod analysis;
pub mod shot;
pub mod tracking;
pub mod upload;

// Re-export common types
pub use analysis::{AnalysisResult, ProcessVideoResponse};
pub use shot::{ShotAnalysis, ShotEvent, ShotResult};
pub use tracking::{TrackingSample, VideoMetadata};
pub use upload::UploadId;
