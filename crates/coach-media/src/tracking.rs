//! Head tracking pipeline: probe, sample, detect, aggregate.

use std::path::Path;

use tracing::{debug, warn};

use coach_models::{TrackingSample, VideoMetadata};

use crate::pose::PoseEstimator;
use crate::probe::probe_video;
use crate::sampler::{is_sampled, sampled_frame_count, FrameStream, RawFrame};

/// Default sampling stride: every 5th frame.
pub const DEFAULT_FRAME_STRIDE: u64 = 5;

/// Run the detector on one decoded frame and build its tracking sample.
///
/// Returns `None` when the frame is not on the stride or no pose was
/// detected; both mean "skip", not failure.
fn sample_from_frame(
    frame: &RawFrame,
    detector: &dyn PoseEstimator,
    stride: u64,
    fps: f64,
) -> Option<TrackingSample> {
    if !is_sampled(frame.index, stride) {
        return None;
    }
    let head = detector.detect_head(frame)?;
    Some(TrackingSample {
        frame: frame.index,
        timestamp: frame.index as f64 / fps,
        head_x: head.x,
        head_y: head.y,
    })
}

/// Scan a video for head positions at the given frame stride.
///
/// Degrades instead of failing: an unreadable container yields an empty
/// sequence with zeroed metadata, and a missing detector yields an empty
/// sequence with real metadata. Output order is strictly increasing by frame
/// index, every index a multiple of the stride.
pub async fn track_head_positions(
    path: impl AsRef<Path>,
    detector: Option<&dyn PoseEstimator>,
    stride: u64,
) -> (Vec<TrackingSample>, VideoMetadata) {
    let path = path.as_ref();

    let probe = match probe_video(path).await {
        Ok(p) => p,
        Err(e) => {
            warn!("Cannot probe {}, skipping head tracking: {}", path.display(), e);
            return (Vec::new(), VideoMetadata::default());
        }
    };
    let metadata = probe.metadata();

    let Some(detector) = detector else {
        debug!("No pose detector available, returning empty tracking");
        return (Vec::new(), metadata);
    };

    let mut stream = match FrameStream::open(path, probe.width, probe.height).await {
        Ok(s) => s,
        Err(e) => {
            warn!("Cannot decode {}, skipping head tracking: {}", path.display(), e);
            return (Vec::new(), metadata);
        }
    };

    let stride = stride.max(1);
    let estimated_frames = (probe.duration * probe.fps).ceil() as u64;
    let mut samples = Vec::with_capacity(sampled_frame_count(estimated_frames, stride) as usize);

    loop {
        match stream.next_frame().await {
            Ok(Some(frame)) => {
                if let Some(sample) = sample_from_frame(&frame, detector, stride, metadata.fps) {
                    samples.push(sample);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Frame decode ended early after {} frames: {}", stream.frames_read(), e);
                break;
            }
        }
    }

    debug!(
        "Head tracking complete: {} samples from {} frames",
        samples.len(),
        stream.frames_read()
    );

    (samples, metadata)
}
