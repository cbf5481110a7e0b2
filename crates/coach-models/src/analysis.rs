//! Analysis result models.

use serde::{Deserialize, Serialize};

use crate::shot::{ShotAnalysis, ShotEvent};
use crate::tracking::{TrackingSample, VideoMetadata};

/// Result of the external AI analysis.
///
/// Either the decoded shots payload, or an error marker carrying the raw
/// model output verbatim when it could not be decoded. Callers must check the
/// variant before trusting structured fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Shots(ShotAnalysis),
    Unparsed { error: String, raw_response: String },
}

impl AnalysisResult {
    /// Build the error-marker variant.
    pub fn unparsed(error: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self::Unparsed {
            error: error.into(),
            raw_response: raw_response.into(),
        }
    }

    /// The decoded shot events, if the analysis was parsed.
    pub fn shots(&self) -> Option<&[ShotEvent]> {
        match self {
            AnalysisResult::Shots(analysis) => Some(&analysis.shots),
            AnalysisResult::Unparsed { .. } => None,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, AnalysisResult::Unparsed { .. })
    }
}

/// Aggregate returned by the process-video endpoint.
///
/// Constructed once per request, never mutated after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessVideoResponse {
    pub analysis: AnalysisResult,
    pub tracking: Vec<TrackingSample>,
    pub metadata: VideoMetadata,
}
