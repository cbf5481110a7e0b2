//! Gemini client for shot-by-shot video analysis.
//!
//! Uploads a video through the Files API, waits for the remote asset to
//! finish processing, then runs one generation request against it. When no
//! API key is configured the client serves a fixed mock analysis instead of
//! calling out.

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use coach_models::{AnalysisResult, ShotAnalysis, ShotEvent, ShotResult};

use crate::error::{GeminiError, GeminiResult};
use crate::response::parse_analysis;

/// Default Gemini REST endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default analysis model.
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Instruction prompt requesting the shots-JSON shape.
const ANALYSIS_PROMPT: &str = r#"
Analyze this basketball video and output a JSON object with the following structure for each shot attempt:
{
    "shots": [
        {
            "timestamp_of_outcome": "MM:SS.s",
            "result": "made" or "missed",
            "shot_type": "description of shot",
            "feedback": "Constructive coaching feedback based on form",
            "total_shots_made_so_far": int,
            "total_shots_missed_so_far": int
        }
    ]
}
Only output valid JSON.
"#;

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; absent means mock mode.
    pub api_key: Option<String>,
    /// Model name used for generation.
    pub model: String,
    /// REST base URL (overridable for tests).
    pub base_url: String,
    /// Timeout applied to the generation request.
    pub request_timeout: Duration,
    /// Initial delay between file-state polls.
    pub poll_initial_interval: Duration,
    /// Cap on the backoff between polls.
    pub poll_max_interval: Duration,
    /// Total wait budget for remote processing.
    pub poll_budget: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(600),
            poll_initial_interval: Duration::from_secs(1),
            poll_max_interval: Duration::from_secs(10),
            poll_budget: Duration::from_secs(600),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        config
    }
}

/// Gemini API client for video analysis.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

/// Uploaded file resource as reported by the Files API.
#[derive(Debug, Clone, Deserialize)]
struct FileResource {
    name: String,
    uri: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

/// Generation request body.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(rename = "fileUri")]
    file_uri: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

/// Generation response body.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    /// Create a new client.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Self {
        Self::new(GeminiConfig::from_env())
    }

    /// Whether the client runs in mock mode (no API key configured).
    pub fn is_mock(&self) -> bool {
        self.config.api_key.is_none()
    }

    /// Analyze a video file, returning the decoded shot events or an
    /// error marker carrying the raw model output.
    pub async fn analyze(&self, video_path: &Path) -> GeminiResult<AnalysisResult> {
        let Some(api_key) = self.config.api_key.clone() else {
            info!("GEMINI_API_KEY not configured, serving mock analysis");
            return Ok(mock_analysis());
        };

        info!("Uploading video to Gemini");
        let file = self.upload_video(&api_key, video_path).await?;

        let file = self.wait_for_processing(&api_key, file).await?;

        info!("Generating analysis");
        let text = self
            .generate_analysis(&api_key, &file, video_mime(video_path))
            .await?;

        Ok(parse_analysis(&text))
    }

    /// Upload the video through the Files API (multipart upload).
    async fn upload_video(&self, api_key: &str, video_path: &Path) -> GeminiResult<FileResource> {
        let bytes = tokio::fs::read(video_path).await?;
        let display_name = video_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.mp4".to_string());

        let metadata = serde_json::json!({ "file": { "display_name": display_name.clone() } });
        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .expect("static mime type"),
            )
            .part(
                "file",
                Part::bytes(bytes)
                    .file_name(display_name)
                    .mime_str(video_mime(video_path))
                    .expect("static mime type"),
            );

        let url = format!(
            "{}/upload/v1beta/files?key={}&uploadType=multipart",
            self.config.base_url, api_key
        );

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = check_status(response).await?;
        let upload: UploadResponse = response.json().await?;

        debug!("Uploaded file {} (state {})", upload.file.name, upload.file.state);
        Ok(upload.file)
    }

    /// Poll the file resource until it leaves the processing state.
    ///
    /// Bounded: backoff doubles from the initial interval up to the cap, and
    /// the whole wait fails once the budget is exhausted.
    async fn wait_for_processing(
        &self,
        api_key: &str,
        mut file: FileResource,
    ) -> GeminiResult<FileResource> {
        let start = Instant::now();
        let mut interval = self.config.poll_initial_interval;

        while file.state == "PROCESSING" {
            if start.elapsed() >= self.config.poll_budget {
                warn!("Gave up waiting for {} to finish processing", file.name);
                return Err(GeminiError::PollTimeout(self.config.poll_budget.as_secs()));
            }
            sleep(interval).await;
            interval = (interval * 2).min(self.config.poll_max_interval);

            file = self.get_file(api_key, &file.name).await?;
            debug!("File {} state: {}", file.name, file.state);
        }

        if file.state == "FAILED" {
            return Err(GeminiError::processing_failed(format!(
                "remote asset {} entered state FAILED",
                file.name
            )));
        }

        Ok(file)
    }

    /// Fetch the current file resource.
    async fn get_file(&self, api_key: &str, name: &str) -> GeminiResult<FileResource> {
        let url = format!("{}/v1beta/{}?key={}", self.config.base_url, name, api_key);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Run one generation request against the uploaded asset.
    async fn generate_analysis(
        &self,
        api_key: &str,
        file: &FileResource,
        mime_type: &str,
    ) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::FileData {
                        file_data: FileData {
                            file_uri: file.uri.clone(),
                            mime_type: mime_type.to_string(),
                        },
                    },
                    RequestPart::Text {
                        text: ANALYSIS_PROMPT.to_string(),
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;
        let generated: GenerateResponse = response.json().await?;

        generated
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or(GeminiError::EmptyResponse)
    }
}

/// Map a non-success status to an API error, passing success through.
async fn check_status(response: reqwest::Response) -> GeminiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GeminiError::api(status.as_u16(), body))
}

/// The fixed deterministic analysis served when no API key is configured.
pub fn mock_analysis() -> AnalysisResult {
    AnalysisResult::Shots(ShotAnalysis {
        shots: vec![ShotEvent {
            timestamp_of_outcome: "0:05.0".to_string(),
            result: ShotResult::Missed,
            shot_type: "Jump shot".to_string(),
            feedback: "Mock feedback: Check API key.".to_string(),
            total_shots_made_so_far: None,
            total_shots_missed_so_far: None,
        }],
    })
}

/// Guess the upload MIME type from the file extension.
fn video_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_analysis_is_deterministic() {
        let first = mock_analysis();
        let second = mock_analysis();
        assert_eq!(first, second);

        let shots = first.shots().unwrap();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].result, ShotResult::Missed);
        assert_eq!(shots[0].shot_type, "Jump shot");
        assert!(shots[0].total_shots_made_so_far.is_none());
    }

    #[test]
    fn test_video_mime_from_extension() {
        assert_eq!(video_mime(Path::new("a.MOV")), "video/quicktime");
        assert_eq!(video_mime(Path::new("a.webm")), "video/webm");
        assert_eq!(video_mime(Path::new("a")), "video/mp4");
    }

    #[tokio::test]
    async fn test_analyze_without_key_never_calls_out() {
        // Unroutable base URL proves mock mode short-circuits the network
        let config = GeminiConfig {
            api_key: None,
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let client = GeminiClient::new(config);
        assert!(client.is_mock());

        let result = client.analyze(Path::new("ignored.mp4")).await.unwrap();
        assert_eq!(result, mock_analysis());
    }
}
