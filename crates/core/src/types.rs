use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The closed set of analyses that can be requested for a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    Summary,
    Transcript,
    Timestamps,
    Scene,
    Clips,
    KeyPoints,
    Quiz,
    ContentIdea,
    DeepDive,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown analysis kind: {0}")]
pub struct UnknownKind(pub String);

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 9] = [
        AnalysisKind::Summary,
        AnalysisKind::Transcript,
        AnalysisKind::Timestamps,
        AnalysisKind::Scene,
        AnalysisKind::Clips,
        AnalysisKind::KeyPoints,
        AnalysisKind::Quiz,
        AnalysisKind::ContentIdea,
        AnalysisKind::DeepDive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::Transcript => "transcript",
            AnalysisKind::Timestamps => "timestamps",
            AnalysisKind::Scene => "scene",
            AnalysisKind::Clips => "clips",
            AnalysisKind::KeyPoints => "key-points",
            AnalysisKind::Quiz => "quiz",
            AnalysisKind::ContentIdea => "content-idea",
            AnalysisKind::DeepDive => "deep-dive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "Summary",
            AnalysisKind::Transcript => "Transcript",
            AnalysisKind::Timestamps => "Timestamps",
            AnalysisKind::Scene => "Scene",
            AnalysisKind::Clips => "Clips",
            AnalysisKind::KeyPoints => "Key Points",
            AnalysisKind::Quiz => "Quiz",
            AnalysisKind::ContentIdea => "Content Idea",
            AnalysisKind::DeepDive => "Deep Dive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "Get a concise overview of the video's main points.",
            AnalysisKind::Transcript => "Generate a full, word-for-word text version of the video.",
            AnalysisKind::Timestamps => "Create a table of contents with key video moments.",
            AnalysisKind::Scene => "Receive a visual description of the key scenes in the video.",
            AnalysisKind::Clips => "Extract shareable clips with timestamps and a rationale.",
            AnalysisKind::KeyPoints => {
                "Extract the most important takeaways and insights as a bulleted list."
            }
            AnalysisKind::Quiz => "Create a multiple-choice quiz based on the video content.",
            AnalysisKind::ContentIdea => {
                "Generate a main idea and key takeaways, perfect for content planning."
            }
            AnalysisKind::DeepDive => {
                "Get a detailed, structured analysis of the video's topic, arguments, and tone."
            }
        }
    }

    /// Whether this kind asks the model for schema-constrained JSON.
    pub fn is_structured(&self) -> bool {
        !matches!(
            self,
            AnalysisKind::Transcript
                | AnalysisKind::Timestamps
                | AnalysisKind::Scene
                | AnalysisKind::Clips
        )
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Number of quiz questions, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionCount(u32);

impl QuestionCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 10;
    pub const DEFAULT: u32 = 5;

    /// Out-of-range values are clamped rather than rejected.
    pub fn new(n: u32) -> Self {
        Self(n.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for QuestionCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub number_of_questions: QuestionCount,
}

impl RequestOptions {
    pub fn with_questions(n: u32) -> Self {
        Self {
            number_of_questions: QuestionCount::new(n),
        }
    }
}

/// Immutable context of a single analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub url: String,
    pub kind: AnalysisKind,
    pub options: RequestOptions,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>, kind: AnalysisKind, options: RequestOptions) -> Self {
        Self {
            url: url.into(),
            kind,
            options,
        }
    }
}

/// Raw model output plus a rough size estimate.
///
/// `approx_tokens` is a client-side heuristic (one token per four characters of
/// instruction and output), not a billing figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub approx_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedVideo {
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub title: String,
    pub channel: String,
    pub summary: String,
    pub related_videos: Vec<RelatedVideo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPointsResult {
    pub key_points: Vec<String>,
    pub related_videos: Vec<RelatedVideo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
}

impl QuizQuestion {
    /// Whether the option at `choice` is the answer. Out-of-range picks are wrong.
    pub fn is_correct(&self, choice: usize) -> bool {
        self.options
            .get(choice)
            .is_some_and(|option| *option == self.answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub questions: Vec<QuizQuestion>,
}

impl QuizResult {
    /// Count of correctly answered questions. `answers[i]` is the option index
    /// picked for question `i`; `None` and missing entries score nothing.
    pub fn score(&self, answers: &[Option<usize>]) -> usize {
        self.questions
            .iter()
            .zip(answers)
            .filter(|&(question, &choice)| choice.is_some_and(|c| question.is_correct(c)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIdeaResult {
    pub main_idea: String,
    pub key_takeaways: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveResult {
    pub core_concepts: Vec<String>,
    pub key_arguments: Vec<String>,
    pub target_audience: String,
    pub overall_tone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSuggestion {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSuggestionList {
    pub videos: Vec<VideoSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub youtube_url: String,
    pub prompt_type: AnalysisKind,
    pub result: String,
    pub token_count: u64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_questions: Option<u32>,
}
