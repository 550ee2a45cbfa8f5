use url::form_urlencoded;

use crate::{
    resolver::canonical_url,
    types::{
        AnalysisKind, ContentIdeaResult, DeepDiveResult, HistoryItem, KeyPointsResult,
        QuizQuestion, QuizResult, RelatedVideo, SummaryResult, VideoSuggestion,
    },
    validate::TypedResult,
};

/// YouTube search page for a suggested title.
pub fn search_link(title: &str) -> String {
    let query: String = form_urlencoded::byte_serialize(title.as_bytes()).collect();
    format!("https://www.youtube.com/results?search_query={}", query)
}

/// Render a result as readable markdown, falling back to the raw text when it
/// does not validate for its kind.
pub fn format_result_readable(kind: AnalysisKind, raw: &str) -> String {
    match TypedResult::parse(kind, raw) {
        Some(typed) => format_typed(&typed),
        None => format!("## {}\n\n{}\n", kind.label(), raw.trim()),
    }
}

pub fn format_typed(result: &TypedResult) -> String {
    match result {
        TypedResult::Summary(r) => format_summary(r),
        TypedResult::KeyPoints(r) => format_key_points(r),
        TypedResult::Quiz(r) => format_quiz(r),
        TypedResult::ContentIdea(r) => format_content_idea(r),
        TypedResult::DeepDive(r) => format_deep_dive(r),
    }
}

fn push_bullets(output: &mut String, items: &[String]) {
    for item in items {
        output.push_str(&format!("• {}\n", item));
    }
    output.push('\n');
}

fn push_related(output: &mut String, videos: &[RelatedVideo]) {
    if videos.is_empty() {
        return;
    }
    output.push_str("## Related Videos\n\n");
    for video in videos {
        output.push_str(&format!("• **{}** — {}\n", video.title, video.reason));
        output.push_str(&format!("  {}\n", search_link(&video.title)));
    }
    output.push('\n');
}

pub fn format_summary(summary: &SummaryResult) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", summary.title));
    output.push_str(&format!("**Channel:** {}\n\n", summary.channel));

    output.push_str("## Summary\n\n");
    output.push_str(&summary.summary);
    output.push_str("\n\n");

    push_related(&mut output, &summary.related_videos);
    output
}

pub fn format_key_points(result: &KeyPointsResult) -> String {
    let mut output = String::from("## Key Points\n\n");
    push_bullets(&mut output, &result.key_points);
    push_related(&mut output, &result.related_videos);
    output
}

pub fn format_quiz(quiz: &QuizResult) -> String {
    let mut output = String::from("## Quiz\n\n");
    for (i, question) in quiz.questions.iter().enumerate() {
        output.push_str(&format_quiz_question(i, question));
        output.push_str(&format!("\n**Answer:** {}\n", question.answer));
        output.push_str(&format!("_{}_\n\n", question.explanation));
    }
    output
}

/// One quiz question with lettered options and the answer hidden.
pub fn format_quiz_question(index: usize, question: &QuizQuestion) -> String {
    let mut output = format!("### {}. {}\n\n", index + 1, question.question);
    for (letter, option) in ('A'..='Z').zip(&question.options) {
        output.push_str(&format!("  {}) {}\n", letter, option));
    }
    output
}

/// Score line followed by each question's pick, answer and explanation.
pub fn format_quiz_review(quiz: &QuizResult, answers: &[Option<usize>]) -> String {
    let mut output = format!(
        "## Score: {} / {}\n\n",
        quiz.score(answers),
        quiz.questions.len()
    );
    for (i, question) in quiz.questions.iter().enumerate() {
        let choice = answers.get(i).copied().flatten();
        let picked = choice
            .and_then(|c| question.options.get(c))
            .map(String::as_str)
            .unwrap_or("(no answer)");
        let mark = if choice.is_some_and(|c| question.is_correct(c)) {
            "✓"
        } else {
            "✗"
        };
        output.push_str(&format!("{} {}. {}\n", mark, i + 1, question.question));
        output.push_str(&format!("  Your answer: {}\n", picked));
        output.push_str(&format!("  Correct answer: {}\n", question.answer));
        output.push_str(&format!("  _{}_\n\n", question.explanation));
    }
    output
}

pub fn format_content_idea(idea: &ContentIdeaResult) -> String {
    let mut output = String::from("## Content Idea\n\n");
    output.push_str(&format!("**Main idea:** {}\n\n", idea.main_idea));
    output.push_str("### Key Takeaways\n\n");
    push_bullets(&mut output, &idea.key_takeaways);
    output
}

pub fn format_deep_dive(deep: &DeepDiveResult) -> String {
    let mut output = String::from("## Deep Dive\n\n");

    output.push_str("### Core Concepts\n\n");
    push_bullets(&mut output, &deep.core_concepts);

    output.push_str("### Key Arguments\n\n");
    for (i, argument) in deep.key_arguments.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, argument));
    }
    output.push('\n');

    output.push_str("### Target Audience\n\n");
    output.push_str(&deep.target_audience);
    output.push_str("\n\n### Overall Tone\n\n");
    output.push_str(&deep.overall_tone);
    output.push('\n');
    output
}

pub fn format_suggestions(videos: &[VideoSuggestion]) -> String {
    let mut output = String::from("## Suggested Videos\n\n");
    for (i, video) in videos.iter().enumerate() {
        output.push_str(&format!(
            "{}. **{}** ({})\n   {}\n   {}\n\n",
            i + 1,
            video.title,
            video.channel,
            video.description,
            canonical_url(&video.video_id)
        ));
    }
    output
}

pub fn format_history(items: &[HistoryItem]) -> String {
    if items.is_empty() {
        return "No analyses yet.\n".to_string();
    }
    let mut output = String::new();
    for (i, item) in items.iter().enumerate() {
        let label = match item.number_of_questions {
            Some(n) => format!("{} ({} questions)", item.prompt_type.label(), n),
            None => item.prompt_type.label().to_string(),
        };
        output.push_str(&format!(
            "[{}] {} | {} | {} | ~{} tokens\n",
            i, label, item.youtube_url, item.timestamp, item.token_count
        ));
    }
    output
}

/// Plain text to copy or read aloud: the summary body or the key points when
/// they validate, otherwise the raw text with markdown headers stripped.
pub fn speakable_text(kind: AnalysisKind, raw: &str) -> String {
    match TypedResult::parse(kind, raw) {
        Some(TypedResult::Summary(r)) => r.summary,
        Some(TypedResult::KeyPoints(r)) => r.key_points.join("\n"),
        _ => raw
            .lines()
            .map(|line| line.trim_start_matches('#').trim_start())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuizQuestion;

    #[test]
    fn test_search_link_encodes_title() {
        assert_eq!(
            search_link("Rust & async?"),
            "https://www.youtube.com/results?search_query=Rust+%26+async%3F"
        );
    }

    #[test]
    fn test_invalid_json_falls_back_to_raw_text() {
        let rendered = format_result_readable(AnalysisKind::Summary, "Just prose.");
        assert_eq!(rendered, "## Summary\n\nJust prose.\n");
    }

    #[test]
    fn test_summary_rendering() {
        let raw = r#"{"title":"Never Gonna","channel":"Rick","summary":"A song.","relatedVideos":[{"title":"Together Forever","reason":"Same artist"}]}"#;
        let rendered = format_result_readable(AnalysisKind::Summary, raw);
        assert!(rendered.starts_with("# Never Gonna\n"));
        assert!(rendered.contains("**Channel:** Rick"));
        assert!(rendered.contains("search_query=Together+Forever"));
    }

    #[test]
    fn test_quiz_rendering_letters_options() {
        let quiz = QuizResult {
            questions: vec![QuizQuestion {
                question: "Which?".to_string(),
                options: vec!["one".to_string(), "two".to_string()],
                answer: "two".to_string(),
                explanation: "Because.".to_string(),
            }],
        };
        let rendered = format_quiz(&quiz);
        assert!(rendered.contains("### 1. Which?"));
        assert!(rendered.contains("  A) one\n  B) two\n"));
        assert!(rendered.contains("**Answer:** two"));
    }

    #[test]
    fn test_quiz_question_hides_answer() {
        let question = QuizQuestion {
            question: "Which?".to_string(),
            options: vec!["one".to_string(), "two".to_string()],
            answer: "two".to_string(),
            explanation: "Because.".to_string(),
        };
        let rendered = format_quiz_question(1, &question);
        assert_eq!(rendered, "### 2. Which?\n\n  A) one\n  B) two\n");
        assert!(!rendered.contains("Because."));
    }

    #[test]
    fn test_quiz_review_scores_and_explains() {
        let question = |answer: &str| QuizQuestion {
            question: "Which?".to_string(),
            options: vec!["one".to_string(), "two".to_string()],
            answer: answer.to_string(),
            explanation: format!("It is {}.", answer),
        };
        let quiz = QuizResult {
            questions: vec![question("two"), question("one")],
        };
        let rendered = format_quiz_review(&quiz, &[Some(1), None]);
        assert!(rendered.starts_with("## Score: 1 / 2\n"));
        assert!(rendered.contains("✓ 1. Which?\n  Your answer: two\n"));
        assert!(rendered.contains("✗ 2. Which?\n  Your answer: (no answer)\n  Correct answer: one\n"));
        assert!(rendered.contains("_It is one._"));
    }

    #[test]
    fn test_history_listing() {
        let item = HistoryItem {
            id: "id".to_string(),
            youtube_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            prompt_type: AnalysisKind::Quiz,
            result: "{}".to_string(),
            token_count: 40,
            timestamp: "2025-03-01T12:00:00.000Z".to_string(),
            number_of_questions: Some(3),
        };
        assert_eq!(
            format_history(&[item]),
            "[0] Quiz (3 questions) | https://youtu.be/dQw4w9WgXcQ | 2025-03-01T12:00:00.000Z | ~40 tokens\n"
        );
        assert_eq!(format_history(&[]), "No analyses yet.\n");
    }

    #[test]
    fn test_speakable_text() {
        let key_points = r#"{"keyPoints":["a","b"],"relatedVideos":[]}"#;
        assert_eq!(speakable_text(AnalysisKind::KeyPoints, key_points), "a\nb");
        assert_eq!(
            speakable_text(AnalysisKind::Scene, "## Setting\nA studio."),
            "Setting\nA studio."
        );
    }
}
