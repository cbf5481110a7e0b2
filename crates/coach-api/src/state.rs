//! Application state.

use std::sync::Arc;

use tracing::warn;

use coach_gemini::GeminiClient;
use coach_media::{OnnxPoseDetector, PoseDetectorConfig, PoseEstimator};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analyzer: Arc<GeminiClient>,
    /// Pose detector; `None` means degraded mode (tracking disabled).
    pub pose: Option<Arc<dyn PoseEstimator>>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        tokio::fs::create_dir_all(&config.upload_dir).await?;

        let analyzer = Arc::new(GeminiClient::from_env());
        if analyzer.is_mock() {
            warn!("GEMINI_API_KEY not configured, analysis runs in mock mode");
        }

        let detector_config = PoseDetectorConfig {
            model_path: config.pose_model_path.clone(),
            ..Default::default()
        };
        let pose: Option<Arc<dyn PoseEstimator>> = match OnnxPoseDetector::load(detector_config) {
            Ok(detector) => Some(Arc::new(detector)),
            Err(e) => {
                warn!("Pose detector unavailable, head tracking disabled: {}", e);
                None
            }
        };

        Ok(Self {
            config,
            analyzer,
            pose,
        })
    }
}
