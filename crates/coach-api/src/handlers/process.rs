//! Video processing endpoint.
//!
//! Orchestrates one request: persist the upload, obtain the AI analysis,
//! scan sampled frames for head positions, assemble the response, and delete
//! the stored file on every exit path.

use axum::extract::{Multipart, State};
use axum::Json;
use std::path::Path;
use tracing::info;

use coach_media::track_head_positions;
use coach_models::ProcessVideoResponse;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use crate::upload::StoredUpload;

/// Multipart field carrying the video.
const FILE_FIELD: &str = "file";

/// Process an uploaded basketball video.
pub async fn process_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ProcessVideoResponse>> {
    let (filename, bytes) = read_video_field(multipart).await?;
    info!(
        "Processing upload {} ({} bytes)",
        filename.as_deref().unwrap_or("<unnamed>"),
        bytes.len()
    );

    let upload = StoredUpload::persist(&state.config.upload_dir, filename.as_deref(), &bytes)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store upload: {}", e)))?;

    // Run the pipeline, then delete the stored file regardless of outcome
    let result = run_pipeline(&state, upload.path()).await;
    upload.remove().await;

    result.map(Json)
}

/// Pull the video field out of the multipart body.
async fn read_video_field(mut multipart: Multipart) -> ApiResult<(Option<String>, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            let filename = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            return Ok((filename, bytes.to_vec()));
        }
    }

    Err(ApiError::bad_request(format!(
        "Missing '{}' field in multipart body",
        FILE_FIELD
    )))
}

/// Analysis + head tracking over the stored file.
async fn run_pipeline(state: &AppState, path: &Path) -> ApiResult<ProcessVideoResponse> {
    let analysis = match state.analyzer.analyze(path).await {
        Ok(analysis) => analysis,
        Err(e) => {
            metrics::record_analysis_failure();
            return Err(e.into());
        }
    };

    let (tracking, metadata) = track_head_positions(
        path,
        state.pose.as_deref(),
        state.config.frame_stride,
    )
    .await;

    metrics::record_video_processed(state.analyzer.is_mock(), tracking.len());

    Ok(ProcessVideoResponse {
        analysis,
        tracking,
        metadata,
    })
}
