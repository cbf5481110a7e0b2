//! Extraction and decoding of the model's JSON reply.
//!
//! The model is instructed to return bare JSON but frequently wraps it in a
//! markdown code fence. Extraction is a pure function so it can be tested
//! without any network plumbing.

use tracing::warn;

use coach_models::{AnalysisResult, ShotAnalysis};

/// Strip an optional fenced code block around the payload.
///
/// Precedence: a ```json labeled fence first, any ``` fence second, else the
/// raw text unchanged.
pub fn extract_json_payload(raw: &str) -> &str {
    if let Some(inner) = fenced_block(raw, "```json") {
        return inner;
    }
    if let Some(inner) = fenced_block(raw, "```") {
        return inner;
    }
    raw
}

/// The text between an opening fence marker and the next closing ```.
fn fenced_block<'a>(raw: &'a str, open: &str) -> Option<&'a str> {
    let start = raw.find(open)? + open.len();
    let rest = &raw[start..];
    let end = rest.find("```")?;
    Some(&rest[..end])
}

/// Decode the model reply into an [`AnalysisResult`].
///
/// Decode failure is recovered locally: the error-marker variant carries the
/// raw reply verbatim, and this function never fails.
pub fn parse_analysis(raw: &str) -> AnalysisResult {
    let payload = extract_json_payload(raw).trim();
    match serde_json::from_str::<ShotAnalysis>(payload) {
        Ok(analysis) => AnalysisResult::Shots(analysis),
        Err(e) => {
            warn!("Failed to decode analysis JSON: {}", e);
            AnalysisResult::unparsed("Failed to parse analysis", raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_models::ShotResult;

    const SHOTS_JSON: &str = r#"{"shots":[{"timestamp_of_outcome":"0:07.3","result":"made","shot_type":"Free throw","feedback":"Consistent release point.","total_shots_made_so_far":1,"total_shots_missed_so_far":0}]}"#;

    #[test]
    fn test_extract_prefers_labeled_fence() {
        let raw = "```\nnot this\n```\n```json\n{\"shots\":[]}\n```";
        assert_eq!(extract_json_payload(raw).trim(), "{\"shots\":[]}");
    }

    #[test]
    fn test_extract_falls_back_to_any_fence() {
        let raw = "Here you go:\n```\n{\"shots\":[]}\n```";
        assert_eq!(extract_json_payload(raw).trim(), "{\"shots\":[]}");
    }

    #[test]
    fn test_extract_passes_through_bare_text() {
        assert_eq!(extract_json_payload("{\"shots\":[]}"), "{\"shots\":[]}");
    }

    #[test]
    fn test_parse_roundtrip_through_fence() {
        let expected: ShotAnalysis = serde_json::from_str(SHOTS_JSON).unwrap();

        for raw in [
            SHOTS_JSON.to_string(),
            format!("```json\n{}\n```", SHOTS_JSON),
            format!("```\n{}\n```", SHOTS_JSON),
        ] {
            match parse_analysis(&raw) {
                AnalysisResult::Shots(analysis) => {
                    assert_eq!(analysis, expected);
                    assert_eq!(analysis.shots[0].result, ShotResult::Made);
                }
                AnalysisResult::Unparsed { .. } => panic!("expected parsed shots for {raw}"),
            }
        }
    }

    #[test]
    fn test_parse_failure_keeps_raw_text_verbatim() {
        let raw = "The video shows a player missing two shots.";
        match parse_analysis(raw) {
            AnalysisResult::Unparsed {
                error,
                raw_response,
            } => {
                assert_eq!(error, "Failed to parse analysis");
                assert_eq!(raw_response, raw);
            }
            AnalysisResult::Shots(_) => panic!("expected error marker"),
        }
    }

    #[test]
    fn test_parse_failure_on_unclosed_fence() {
        // Opening fence with no closer falls through to raw text, which is
        // not valid JSON
        let raw = "```json\n{\"shots\":[]}";
        assert!(parse_analysis(raw).is_unparsed());
    }
}
