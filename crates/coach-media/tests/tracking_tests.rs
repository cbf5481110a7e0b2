//! Head-tracking pipeline integration tests.
//!
//! These decode real video through FFmpeg and are gated behind `--ignored`.

use std::process::Command;

use coach_media::{probe_video, track_head_positions, FrameStream, HeadPosition, PoseEstimator, RawFrame};

struct CenterDetector;

impl PoseEstimator for CenterDetector {
    fn detect_head(&self, _frame: &RawFrame) -> Option<HeadPosition> {
        Some(HeadPosition { x: 0.5, y: 0.5 })
    }
}

/// Render a short synthetic test clip with FFmpeg.
fn render_test_clip(path: &std::path::Path, frames: u32) {
    let status = Command::new("ffmpeg")
        .args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "lavfi",
            "-i",
            &format!("testsrc=size=320x240:rate=30:duration={}", frames as f64 / 30.0),
        ])
        .arg(path)
        .status()
        .expect("Failed to run ffmpeg");
    assert!(status.success(), "ffmpeg failed to render test clip");
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_probe_reports_stream_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    render_test_clip(&clip, 60);

    let probe = probe_video(&clip).await.expect("probe failed");
    assert_eq!(probe.width, 320);
    assert_eq!(probe.height, 240);
    assert!((probe.fps - 30.0).abs() < 0.5);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_frame_stream_decodes_sequentially() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    render_test_clip(&clip, 30);

    let mut stream = FrameStream::open(&clip, 320, 240).await.expect("open failed");
    let mut count = 0u64;
    while let Some(frame) = stream.next_frame().await.expect("decode failed") {
        assert_eq!(frame.index, count);
        assert_eq!(frame.data.len(), 320 * 240 * 3);
        count += 1;
    }
    assert!(count >= 29, "expected ~30 frames, got {}", count);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_tracking_samples_on_stride() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    render_test_clip(&clip, 60);

    let detector = CenterDetector;
    let (samples, metadata) = track_head_positions(&clip, Some(&detector), 5).await;

    assert!((metadata.fps - 30.0).abs() < 0.5);
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|s| s.frame % 5 == 0));
    assert!(samples.windows(2).all(|w| w[0].frame < w[1].frame));
}
