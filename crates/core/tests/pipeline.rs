use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tubelens_core::{
    AnalysisClient, AnalysisError, AnalysisKind, AnalysisRequest, BackendError, GenerateRequest,
    HISTORY_CAPACITY, HistoryStore, MemoryStore, ModelBackend, RequestOptions, TypedResult,
    analyze_and_record, load_all, prompt::SYSTEM_INSTRUCTION,
};

/// Replays canned replies in order and records every request it sees.
#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, String>>>,
    seen: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedBackend {
    fn replying(replies: impl IntoIterator<Item = Result<&'static str, &'static str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            seen: Mutex::default(),
        }
    }

    fn seen(&self) -> Vec<GenerateRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        self.seen.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(BackendError::Api {
                status: 400,
                message,
            }),
            None => Err(BackendError::EmptyResponse {
                reason: "script exhausted".to_string(),
            }),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

const KEY_POINTS: &str = r#"{"keyPoints":["a","b"],"relatedVideos":[]}"#;

#[tokio::test]
async fn analyze_sends_canonical_url_instruction_and_schema() {
    let client = AnalysisClient::new(ScriptedBackend::replying([Ok(KEY_POINTS)]));
    let request = AnalysisRequest::new(
        "https://youtu.be/dQw4w9WgXcQ?t=30",
        AnalysisKind::KeyPoints,
        RequestOptions::default(),
    );

    let result = client.analyze(&request).await.unwrap();
    assert_eq!(result.text, KEY_POINTS);

    let seen = client.backend().seen();
    assert_eq!(seen.len(), 1);
    let sent = &seen[0];
    assert_eq!(
        sent.video_uri.as_deref(),
        Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
    assert_eq!(sent.system_instruction.as_deref(), Some(SYSTEM_INSTRUCTION));
    assert_eq!(
        sent.schema.as_ref().unwrap().required,
        vec!["keyPoints", "relatedVideos"]
    );
    assert_eq!(
        result.approx_tokens,
        (sent.prompt.chars().count() + KEY_POINTS.len()).div_ceil(4) as u64
    );
}

#[tokio::test]
async fn free_text_kinds_send_no_schema() {
    let client = AnalysisClient::new(ScriptedBackend::replying([Ok("[00:00:01] Hello")]));
    let request = AnalysisRequest::new(
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        AnalysisKind::Timestamps,
        RequestOptions::default(),
    );

    client.analyze(&request).await.unwrap();
    assert!(client.backend().seen()[0].schema.is_none());
}

#[tokio::test]
async fn quiz_request_carries_question_count() {
    let client = AnalysisClient::new(ScriptedBackend::replying([Ok("{}")]));
    let request = AnalysisRequest::new(
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        AnalysisKind::Quiz,
        RequestOptions::with_questions(3),
    );

    client.analyze(&request).await.unwrap();
    let sent = &client.backend().seen()[0];
    assert!(sent.prompt.contains("3 questions"));
    let questions = &sent.schema.as_ref().unwrap().properties["questions"];
    assert_eq!(
        questions.items.as_ref().unwrap().required,
        vec!["question", "options", "answer", "explanation"]
    );
}

#[tokio::test]
async fn invalid_reference_never_reaches_the_backend() {
    let client = AnalysisClient::new(ScriptedBackend::replying([Ok(KEY_POINTS)]));
    let request = AnalysisRequest::new(
        "https://example.com/not-a-video",
        AnalysisKind::Summary,
        RequestOptions::default(),
    );

    let err = client.analyze(&request).await.unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidReference { .. }));
    assert!(client.backend().seen().is_empty());
}

#[tokio::test]
async fn backend_failures_are_classified() {
    let client = AnalysisClient::new(ScriptedBackend::replying([
        Err("Unsupported file uri: https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        Err("The input token count (2000000) exceeds the maximum number of tokens allowed"),
        Err("Internal error encountered."),
    ]));
    let request = AnalysisRequest::new(
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        AnalysisKind::Summary,
        RequestOptions::default(),
    );

    assert!(matches!(
        client.analyze(&request).await,
        Err(AnalysisError::ContentUnavailable { .. })
    ));
    assert!(matches!(
        client.analyze(&request).await,
        Err(AnalysisError::TooLarge { .. })
    ));
    match client.analyze(&request).await {
        Err(AnalysisError::ServiceUnavailable { message }) => {
            assert!(message.contains("Internal error encountered."))
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(client.backend().seen().len(), 3);
}

#[tokio::test]
async fn find_videos_validates_shape() {
    let client = AnalysisClient::new(ScriptedBackend::replying([
        Ok(r#"{"videos":[{"videoId":"dQw4w9WgXcQ","title":"T","channel":"C","description":"D"}]}"#),
        Ok(r#"{"videos":"none"}"#),
        Err("quota exceeded"),
    ]));

    let videos = client.find_videos("rust").await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].channel, "C");

    assert!(matches!(
        client.find_videos("rust").await,
        Err(AnalysisError::MalformedResponse { .. })
    ));
    assert!(matches!(
        client.find_videos("rust").await,
        Err(AnalysisError::ServiceUnavailable { .. })
    ));

    let first = &client.backend().seen()[0];
    assert!(first.video_uri.is_none());
    assert!(first.system_instruction.is_none());
    assert!(first.prompt.contains("'rust'"));
}

#[tokio::test]
async fn pipeline_records_successes_only() {
    let client = AnalysisClient::new(ScriptedBackend::replying([
        Ok(KEY_POINTS),
        Err("Internal error encountered."),
    ]));
    let backing = MemoryStore::new();
    let mut history = HistoryStore::open(&backing);
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let request = AnalysisRequest::new(
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        AnalysisKind::KeyPoints,
        RequestOptions::default(),
    );

    let outcome = analyze_and_record(&client, &mut history, &request, now)
        .await
        .unwrap();
    assert!(outcome.recorded);
    assert!(matches!(outcome.typed, Some(TypedResult::KeyPoints(ref r)) if r.key_points.len() == 2));
    assert_eq!(outcome.item.prompt_type, AnalysisKind::KeyPoints);

    assert!(
        analyze_and_record(&client, &mut history, &request, now)
            .await
            .is_err()
    );
    assert_eq!(history.len(), 1);
    assert_eq!(load_all(&backing), vec![outcome.item]);
}

#[tokio::test]
async fn pipeline_keeps_history_bounded() {
    let client = AnalysisClient::new(ScriptedBackend::replying(
        std::iter::repeat_n(Ok("transcript text"), 11),
    ));
    let backing = MemoryStore::new();
    let mut history = HistoryStore::open(&backing);

    let mut last = None;
    for n in 0..11 {
        let request = AnalysisRequest::new(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            AnalysisKind::Transcript,
            RequestOptions::default(),
        );
        let now = Utc.timestamp_millis_opt(1_700_000_000_000 + n).unwrap();
        let outcome = analyze_and_record(&client, &mut history, &request, now)
            .await
            .unwrap();
        assert!(outcome.typed.is_none());
        last = Some(outcome.item);
    }

    let stored = load_all(&backing);
    assert_eq!(stored.len(), HISTORY_CAPACITY);
    assert_eq!(Some(&stored[0]), last.as_ref());
    assert!(stored.iter().all(|item| item.timestamp != "2023-11-14T22:13:20.000Z"));
}
