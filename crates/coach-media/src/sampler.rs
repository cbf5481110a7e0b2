//! Sequential frame decoding over FFmpeg rawvideo output.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// One decoded RGB24 frame.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Zero-based frame index within the stream.
    pub index: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Packed RGB24 pixel data, `width * height * 3` bytes.
    pub data: Vec<u8>,
}

/// Sequential decoder for a video file.
///
/// Frames are read in stream order starting at index 0; the stream ends when
/// FFmpeg stops producing output. Callers that only want every Nth frame
/// still read the intervening frames to keep the pipe position advancing.
#[derive(Debug)]
pub struct FrameStream {
    child: Child,
    stdout: BufReader<ChildStdout>,
    width: u32,
    height: u32,
    frame_len: usize,
    next_index: u64,
    done: bool,
}

impl FrameStream {
    /// Spawn FFmpeg decoding the file to an RGB24 rawvideo pipe.
    pub async fn open(path: impl AsRef<Path>, width: u32, height: u32) -> MediaResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        if width == 0 || height == 0 {
            return Err(MediaError::InvalidVideo(format!(
                "Degenerate frame size {}x{}",
                width, height
            )));
        }

        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!("Spawning FFmpeg rawvideo decode for {}", path.display());

        let mut child = cmd
            .spawn()
            .map_err(|e| MediaError::ffmpeg_failed(format!("Failed to spawn FFmpeg: {}", e), None, None))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("Failed to capture FFmpeg stdout", None, None)
        })?;

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            width,
            height,
            frame_len: (width * height * 3) as usize,
            next_index: 0,
            done: false,
        })
    }

    /// Read the next decoded frame, or `None` at end of stream.
    pub async fn next_frame(&mut self) -> MediaResult<Option<RawFrame>> {
        if self.done {
            return Ok(None);
        }

        let mut data = vec![0u8; self.frame_len];
        match self.stdout.read_exact(&mut data).await {
            Ok(_) => {
                let index = self.next_index;
                self.next_index += 1;
                Ok(Some(RawFrame {
                    index,
                    width: self.width,
                    height: self.height,
                    data,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.done = true;
                let status = self.child.wait().await.map_err(|e| {
                    MediaError::ffmpeg_failed(format!("FFmpeg process error: {}", e), None, None)
                })?;
                if !status.success() {
                    debug!("FFmpeg exited with status {:?} after {} frames", status.code(), self.next_index);
                }
                Ok(None)
            }
            Err(e) => Err(MediaError::ffmpeg_failed(
                format!("Failed to read FFmpeg output: {}", e),
                None,
                None,
            )),
        }
    }

    /// Number of frames decoded so far.
    pub fn frames_read(&self) -> u64 {
        self.next_index
    }
}

/// Whether a frame index is selected by the sampling stride.
pub fn is_sampled(index: u64, stride: u64) -> bool {
    index % stride.max(1) == 0
}

/// Number of sampled frames in a stream of `total_frames` at `stride`
/// (indices 0, stride, 2*stride, ...).
pub fn sampled_frame_count(total_frames: u64, stride: u64) -> u64 {
    total_frames.div_ceil(stride.max(1))
}
