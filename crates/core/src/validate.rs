use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    schema::{
        Schema, content_idea_schema, deep_dive_schema, key_points_schema, quiz_schema,
        schema_for, summary_schema, video_suggestions_schema,
    },
    types::{
        AnalysisKind, ContentIdeaResult, DeepDiveResult, KeyPointsResult, QuizResult,
        SummaryResult, VideoSuggestion, VideoSuggestionList,
    },
};

/// Parse `raw` as JSON, check it against `schema`, then deserialize into `T`.
///
/// Never fails loudly: any parse error or shape mismatch yields `None`, which
/// callers treat as "render the raw text".
pub fn parse_with_schema<T: DeserializeOwned>(raw: &str, schema: &Schema) -> Option<T> {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "response is not JSON");
            return None;
        }
    };

    if let Some(reason) = schema.mismatch(&value, "$") {
        debug!(%reason, "response does not match schema");
        return None;
    }

    serde_json::from_value(value)
        .map_err(|e| debug!(error = %e, "response has unexpected field types"))
        .ok()
}

pub fn parse_summary(raw: &str) -> Option<SummaryResult> {
    parse_with_schema(raw, &summary_schema())
}

pub fn parse_key_points(raw: &str) -> Option<KeyPointsResult> {
    parse_with_schema(raw, &key_points_schema())
}

pub fn parse_quiz(raw: &str) -> Option<QuizResult> {
    parse_with_schema(raw, &quiz_schema())
}

pub fn parse_content_idea(raw: &str) -> Option<ContentIdeaResult> {
    parse_with_schema(raw, &content_idea_schema())
}

pub fn parse_deep_dive(raw: &str) -> Option<DeepDiveResult> {
    parse_with_schema(raw, &deep_dive_schema())
}

pub fn parse_video_suggestions(raw: &str) -> Option<Vec<VideoSuggestion>> {
    parse_with_schema::<VideoSuggestionList>(raw, &video_suggestions_schema())
        .map(|list| list.videos)
}

/// A response that passed validation for its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedResult {
    Summary(SummaryResult),
    KeyPoints(KeyPointsResult),
    Quiz(QuizResult),
    ContentIdea(ContentIdeaResult),
    DeepDive(DeepDiveResult),
}

impl TypedResult {
    /// Free-text kinds, and responses that fail validation, give `None`.
    pub fn parse(kind: AnalysisKind, raw: &str) -> Option<Self> {
        let schema = schema_for(kind)?;
        match kind {
            AnalysisKind::Summary => parse_with_schema(raw, &schema).map(TypedResult::Summary),
            AnalysisKind::KeyPoints => parse_with_schema(raw, &schema).map(TypedResult::KeyPoints),
            AnalysisKind::Quiz => parse_with_schema(raw, &schema).map(TypedResult::Quiz),
            AnalysisKind::ContentIdea => {
                parse_with_schema(raw, &schema).map(TypedResult::ContentIdea)
            }
            AnalysisKind::DeepDive => parse_with_schema(raw, &schema).map(TypedResult::DeepDive),
            AnalysisKind::Transcript
            | AnalysisKind::Timestamps
            | AnalysisKind::Scene
            | AnalysisKind::Clips => None,
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        match self {
            TypedResult::Summary(_) => AnalysisKind::Summary,
            TypedResult::KeyPoints(_) => AnalysisKind::KeyPoints,
            TypedResult::Quiz(_) => AnalysisKind::Quiz,
            TypedResult::ContentIdea(_) => AnalysisKind::ContentIdea,
            TypedResult::DeepDive(_) => AnalysisKind::DeepDive,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            TypedResult::Summary(r) => serde_json::to_string(r),
            TypedResult::KeyPoints(r) => serde_json::to_string(r),
            TypedResult::Quiz(r) => serde_json::to_string(r),
            TypedResult::ContentIdea(r) => serde_json::to_string(r),
            TypedResult::DeepDive(r) => serde_json::to_string(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_points_accepts_valid_shape() {
        let result = parse_key_points(r#"{"keyPoints":["a","b"],"relatedVideos":[]}"#).unwrap();
        assert_eq!(result.key_points, vec!["a", "b"]);
        assert!(result.related_videos.is_empty());
    }

    #[test]
    fn test_key_points_rejects_non_array() {
        assert_eq!(parse_key_points(r#"{"keyPoints":"not-an-array"}"#), None);
        assert_eq!(
            parse_key_points(r#"{"keyPoints":"not-an-array","relatedVideos":[]}"#),
            None
        );
    }

    #[test]
    fn test_garbage_is_none_not_a_panic() {
        for raw in ["", "   ", "null", "[]", "42", "{", "Here is your summary:", "{\"title\":null}"] {
            assert_eq!(parse_summary(raw), None, "{raw:?}");
            assert_eq!(parse_quiz(raw), None, "{raw:?}");
            assert_eq!(parse_deep_dive(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn test_summary_requires_every_field() {
        let missing_channel =
            r#"{"title":"T","summary":"S","relatedVideos":[{"title":"x","reason":"y"}]}"#;
        assert_eq!(parse_summary(missing_channel), None);

        let complete = r#"{"title":"T","channel":"C","summary":"S","relatedVideos":[{"title":"x","reason":"y"}],"extra":1}"#;
        let summary = parse_summary(complete).unwrap();
        assert_eq!(summary.channel, "C");
        assert_eq!(summary.related_videos[0].reason, "y");
    }

    #[test]
    fn test_quiz_rejects_partial_questions() {
        let partial = r#"{"questions":[{"question":"Q","options":["a"],"answer":"a"}]}"#;
        assert_eq!(parse_quiz(partial), None);

        let options_not_array =
            r#"{"questions":[{"question":"Q","options":"a","answer":"a","explanation":"e"}]}"#;
        assert_eq!(parse_quiz(options_not_array), None);
    }

    #[test]
    fn test_deep_dive_and_content_idea() {
        let deep = r#"{"coreConcepts":["c"],"keyArguments":[],"targetAudience":"devs","overallTone":"calm"}"#;
        assert_eq!(parse_deep_dive(deep).unwrap().target_audience, "devs");

        let idea = r#"{"mainIdea":"M","keyTakeaways":["k1","k2"]}"#;
        assert_eq!(parse_content_idea(idea).unwrap().key_takeaways.len(), 2);
        assert_eq!(parse_content_idea(r#"{"mainIdea":"M"}"#), None);
    }

    #[test]
    fn test_video_suggestions() {
        let raw = r#"{"videos":[{"videoId":"dQw4w9WgXcQ","title":"T","channel":"C","description":"D"}]}"#;
        let videos = parse_video_suggestions(raw).unwrap();
        assert_eq!(videos[0].video_id, "dQw4w9WgXcQ");

        let missing_id = r#"{"videos":[{"title":"T","channel":"C","description":"D"}]}"#;
        assert_eq!(parse_video_suggestions(missing_id), None);
    }

    #[test]
    fn test_valid_results_survive_reserialization() {
        let raw = r#"{"questions":[{"question":"Q","options":["a","b"],"answer":"b","explanation":"because"}]}"#;
        let first = TypedResult::parse(AnalysisKind::Quiz, raw).unwrap();
        let again = TypedResult::parse(AnalysisKind::Quiz, &first.to_json().unwrap()).unwrap();
        assert_eq!(first, again);
        assert_eq!(again.kind(), AnalysisKind::Quiz);
    }

    #[test]
    fn test_free_text_kinds_never_parse() {
        let raw = r#"{"keyPoints":["a"],"relatedVideos":[]}"#;
        assert_eq!(TypedResult::parse(AnalysisKind::Transcript, raw), None);
        assert!(TypedResult::parse(AnalysisKind::KeyPoints, raw).is_some());
    }
}
