//! Shot event models decoded from the AI analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single shot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotResult {
    Made,
    Missed,
}

impl ShotResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShotResult::Made => "made",
            ShotResult::Missed => "missed",
        }
    }
}

impl fmt::Display for ShotResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One analyzed shot attempt.
///
/// Field names are fixed by the instruction prompt sent to the model; the
/// running counters are optional because the model does not always emit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotEvent {
    /// Time offset of the outcome, "MM:SS.s".
    pub timestamp_of_outcome: String,

    /// Made or missed.
    pub result: ShotResult,

    /// Free-text description of the attempt (e.g. "Jump shot").
    pub shot_type: String,

    /// Coaching feedback on the attempt.
    pub feedback: String,

    /// Running made counter up to and including this attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_shots_made_so_far: Option<u32>,

    /// Running missed counter up to and including this attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_shots_missed_so_far: Option<u32>,
}

/// The decoded shots payload returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotAnalysis {
    pub shots: Vec<ShotEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shot_result_snake_case() {
        assert_eq!(serde_json::to_string(&ShotResult::Made).unwrap(), "\"made\"");
        let r: ShotResult = serde_json::from_str("\"missed\"").unwrap();
        assert_eq!(r, ShotResult::Missed);
    }

    #[test]
    fn test_shot_event_counters_optional() {
        let json = r#"{
            "timestamp_of_outcome": "0:12.5",
            "result": "made",
            "shot_type": "Layup",
            "feedback": "Good follow-through."
        }"#;
        let event: ShotEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.result, ShotResult::Made);
        assert!(event.total_shots_made_so_far.is_none());

        // Absent counters are omitted on the way back out
        let out = serde_json::to_string(&event).unwrap();
        assert!(!out.contains("total_shots_made_so_far"));
    }

    #[test]
    fn test_shot_analysis_roundtrip() {
        let analysis = ShotAnalysis {
            shots: vec![ShotEvent {
                timestamp_of_outcome: "1:03.2".to_string(),
                result: ShotResult::Missed,
                shot_type: "Three pointer".to_string(),
                feedback: "Elbow drifting out on release.".to_string(),
                total_shots_made_so_far: Some(2),
                total_shots_missed_so_far: Some(1),
            }],
        };
        let json = serde_json::to_string(&analysis).unwrap();
        let back: ShotAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, analysis);
    }
}
