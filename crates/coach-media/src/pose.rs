//! ONNX pose-landmark inference for head tracking.
//!
//! Runs a MediaPipe-style pose landmark model over decoded RGB frames and
//! exposes the nose landmark as a normalized head position.
//!
//! Notes:
//! - Frames arrive as packed RGB24 from the rawvideo pipe; the frame is
//!   resized directly onto the model canvas, so landmark coordinates are
//!   normalized against the canvas and map 1:1 onto the frame.
//! - The session is guarded by a mutex so one detector instance can be shared
//!   across concurrent requests.

use std::path::PathBuf;
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{info, warn};

use crate::error::{MediaError, MediaResult};
use crate::sampler::RawFrame;

/// Normalized head position for one frame, both coordinates in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPosition {
    pub x: f64,
    pub y: f64,
}

/// Seam for head detection so callers can inject a real or stub detector.
pub trait PoseEstimator: Send + Sync {
    /// Detect the head position in one RGB frame, if a pose is present.
    ///
    /// `None` means "no pose in this frame" and the caller skips the frame;
    /// it is not an error.
    fn detect_head(&self, frame: &RawFrame) -> Option<HeadPosition>;
}

/// Model input canvas size (pose_landmark_full).
const INPUT_SIZE: u32 = 256;
/// Values per landmark: x, y, z, visibility, presence.
const LANDMARK_DIMS: usize = 5;
/// Landmark 0 is the nose.
const NOSE_LANDMARK: usize = 0;
/// Output tensor carrying the landmark block.
const OUTPUT_LANDMARKS: &str = "Identity";

/// Model search paths in preference order.
const POSE_MODEL_PATHS: &[&str] = &[
    // Repository models directory
    "models/pose/pose_landmark_full.onnx",
    // Container models directory
    "/app/models/pose/pose_landmark_full.onnx",
    // System path
    "/usr/share/hoopcoach/models/pose_landmark_full.onnx",
];

/// Configuration for the ONNX pose detector.
#[derive(Debug, Clone)]
pub struct PoseDetectorConfig {
    /// Explicit model path; falls back to the search-path list when unset.
    pub model_path: Option<PathBuf>,
    /// Minimum presence score for a pose to count as detected.
    pub min_detection_confidence: f32,
    /// Minimum visibility score for the nose landmark to be reported.
    pub min_tracking_confidence: f32,
}

impl Default for PoseDetectorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

/// ONNX Runtime-backed pose landmark detector.
#[derive(Debug)]
pub struct OnnxPoseDetector {
    session: Mutex<Session>,
    config: PoseDetectorConfig,
}

impl OnnxPoseDetector {
    /// Load the detector, resolving the model path if not configured.
    pub fn load(config: PoseDetectorConfig) -> MediaResult<Self> {
        let model_path = config
            .model_path
            .clone()
            .or_else(find_default_model_path)
            .ok_or_else(|| {
                MediaError::model_not_found(
                    "pose_landmark_full.onnx not found; place it under models/pose/",
                )
            })?;

        if !model_path.exists() {
            return Err(MediaError::model_not_found(format!(
                "Pose model not found at {}",
                model_path.display()
            )));
        }

        let model_bytes = std::fs::read(&model_path)
            .map_err(|e| MediaError::detection_failed(format!("ORT read model file: {e}")))?;

        let session = Session::builder()
            .map_err(|e| MediaError::detection_failed(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| MediaError::detection_failed(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| MediaError::detection_failed(format!("ORT load model: {e}")))?;

        info!("Pose landmark model loaded from {}", model_path.display());

        Ok(Self {
            session: Mutex::new(session),
            config,
        })
    }

    /// Load with default configuration and model search paths.
    pub fn with_defaults() -> MediaResult<Self> {
        Self::load(PoseDetectorConfig::default())
    }

    fn infer(&self, frame: &RawFrame) -> MediaResult<Option<HeadPosition>> {
        let tensor = frame_to_tensor(frame)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::detection_failed("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| MediaError::detection_failed(format!("ORT run failed: {e}")))?;

        let output = outputs
            .get(OUTPUT_LANDMARKS)
            .ok_or_else(|| MediaError::detection_failed("ORT returned no landmark output"))?;

        extract_head(output, &self.config)
    }
}

impl PoseEstimator for OnnxPoseDetector {
    fn detect_head(&self, frame: &RawFrame) -> Option<HeadPosition> {
        match self.infer(frame) {
            Ok(head) => head,
            Err(e) => {
                // Per-frame inference failure degrades to "no detection"
                warn!("Pose inference failed on frame {}: {}", frame.index, e);
                None
            }
        }
    }
}

/// Locate a model file from the default search paths.
fn find_default_model_path() -> Option<PathBuf> {
    POSE_MODEL_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Resize packed RGB24 data to the model canvas (nearest neighbor).
fn resize_rgb(data: &[u8], src_w: u32, src_h: u32, dst: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((dst * dst * 3) as usize);
    for y in 0..dst {
        let sy = (y as u64 * src_h as u64 / dst as u64) as u32;
        for x in 0..dst {
            let sx = (x as u64 * src_w as u64 / dst as u64) as u32;
            let idx = ((sy * src_w + sx) * 3) as usize;
            out.extend_from_slice(&data[idx..idx + 3]);
        }
    }
    out
}

/// Convert a frame to the model input tensor (1, H, W, 3) normalized to [0, 1].
fn frame_to_tensor(frame: &RawFrame) -> MediaResult<Value> {
    if frame.data.len() != (frame.width * frame.height * 3) as usize {
        return Err(MediaError::detection_failed(format!(
            "Frame {} has truncated pixel data",
            frame.index
        )));
    }

    let resized = resize_rgb(&frame.data, frame.width, frame.height, INPUT_SIZE);
    let normalized: Vec<f32> = resized.iter().map(|v| *v as f32 / 255.0).collect();

    let shape = vec![1usize, INPUT_SIZE as usize, INPUT_SIZE as usize, 3];
    Tensor::from_array((shape, normalized.into_boxed_slice()))
        .map(Value::from)
        .map_err(|e| MediaError::detection_failed(format!("ORT tensor: {e}")))
}

/// Extract the nose landmark as a normalized head position.
///
/// The landmark block is a flat (1, 33 * 5) tensor of canvas-pixel x/y/z plus
/// visibility and presence logits per landmark.
fn extract_head(output: &Value, config: &PoseDetectorConfig) -> MediaResult<Option<HeadPosition>> {
    let (shape, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e| MediaError::detection_failed(format!("ORT extract: {e}")))?;

    let len: usize = shape.iter().map(|d| *d as usize).product();
    if len < LANDMARK_DIMS || data.len() < LANDMARK_DIMS {
        return Err(MediaError::detection_failed(format!(
            "Unexpected pose output shape: {:?}",
            shape
        )));
    }

    let base = NOSE_LANDMARK * LANDMARK_DIMS;
    let visibility = sigmoid(data[base + 3]);
    let presence = sigmoid(data[base + 4]);

    if presence < config.min_detection_confidence || visibility < config.min_tracking_confidence {
        return Ok(None);
    }

    let x = (data[base] / INPUT_SIZE as f32).clamp(0.0, 1.0) as f64;
    let y = (data[base + 1] / INPUT_SIZE as f32).clamp(0.0, 1.0) as f64;

    Ok(Some(HeadPosition { x, y }))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
