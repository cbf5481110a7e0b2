//! Head tracking models.

use serde::{Deserialize, Serialize};

/// Head position for one sampled frame.
///
/// Emitted only for frames where a pose was detected; frames without a
/// detection are omitted from the sequence, not null-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSample {
    /// Source frame index (multiple of the sampling stride).
    pub frame: u64,

    /// Seconds from stream start (frame / fps).
    pub timestamp: f64,

    /// Normalized head x coordinate in [0, 1].
    pub head_x: f64,

    /// Normalized head y coordinate in [0, 1].
    pub head_y: f64,
}

/// Container-level stream metadata.
///
/// Zeroed when the container could not be probed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Frame rate (fps).
    pub fps: f64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}
