use crate::types::{AnalysisKind, RequestOptions};

pub static SYSTEM_INSTRUCTION: &str = "You are a YouTube Video Analysis Expert. Your sole purpose is to analyze the provided YouTube video and respond based ONLY on its content. Do not use any external knowledge. If the video does not contain the answer to a user's prompt, you must state that clearly. Adhere strictly to the requested output format.";

pub static DEFAULT_INSTRUCTION: &str = "Summarize this YouTube video.";

/// Natural-language instruction for a kind.
///
/// JSON kinds spell out their fields in prose as well, so a response is still
/// usable when the schema is not honoured.
pub fn instruction_for(kind: AnalysisKind, options: &RequestOptions) -> String {
    match kind {
        AnalysisKind::Summary => "Analyze the video and provide its title, the channel name, a concise summary of the main points, and 3-5 related video suggestions with a brief reason for each. Respond in JSON: a single object with \"title\", \"channel\", \"summary\" and a \"relatedVideos\" array of objects with \"title\" and \"reason\".".to_string(),
        AnalysisKind::Transcript => "Transcribe the video. Return only the spoken dialogue, verbatim. Omit any additional text or descriptions.".to_string(),
        AnalysisKind::Timestamps => "Generate a timestamped transcript of the video. Each line must follow this format precisely: [hh:mm:ss] Dialogue. Return only the timestamp and spoken content; omit any other text or formatting.".to_string(),
        AnalysisKind::Scene => "Provide a detailed description of the scene in the video, including: Setting, Objects, People, Lighting, Colors, and Camera Angle/Movement. Start output directly with the response; do not include any introductory text or explanations.".to_string(),
        AnalysisKind::Clips => "Extract shareable clips for social media. Each clip must include: a Timestamp [hh:mm:ss]-[hh:mm:ss], the verbatim Transcript, and a concise Rationale (under 20 words) for its social media appeal (e.g. 'humorous', 'controversial', 'inspiring'). Start output directly with the response.".to_string(),
        AnalysisKind::KeyPoints => "Extract the most important takeaways and actionable insights from this video. Also suggest 3-5 related videos with a brief reason for each. Respond in JSON: a \"keyPoints\" array of strings and a \"relatedVideos\" array of objects with \"title\" and \"reason\".".to_string(),
        AnalysisKind::Quiz => format!(
            "Generate a multiple-choice quiz with exactly {} questions based on the video. For each question, provide a few options, identify the correct answer, and give a brief explanation for why it's correct. Respond in JSON: a \"questions\" array of objects with \"question\", an \"options\" array of strings, \"answer\" and \"explanation\".",
            options.number_of_questions.get()
        ),
        AnalysisKind::ContentIdea => "Analyze this video and generate a new content idea based on it. Provide a main idea and a list of key takeaways for the new content. Respond in JSON: an object with a \"mainIdea\" string and a \"keyTakeaways\" array of strings.".to_string(),
        AnalysisKind::DeepDive => "Provide a detailed analysis of this video. Identify the core concepts, key arguments, intended target audience, and the overall tone. Respond in JSON: a single object with \"coreConcepts\" and \"keyArguments\" arrays of strings, and \"targetAudience\" and \"overallTone\" strings.".to_string(),
    }
}

/// `instruction_for` over a kind name; unrecognized names fall back to a plain summary.
pub fn instruction_for_name(name: &str, options: &RequestOptions) -> String {
    match name.parse::<AnalysisKind>() {
        Ok(kind) => instruction_for(kind, options),
        Err(_) => DEFAULT_INSTRUCTION.to_string(),
    }
}

pub fn search_instruction(topic: &str) -> String {
    format!(
        "Find 5 relevant and popular YouTube videos about the following topic: '{}'. For each video, provide its title, the channel name, its unique video ID, and a brief, one-sentence description of why it's a good recommendation. Respond in JSON: a single object with a \"videos\" array of objects with \"videoId\", \"title\", \"channel\" and \"description\".",
        topic.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_an_instruction() {
        let options = RequestOptions::default();
        for kind in AnalysisKind::ALL {
            assert!(!instruction_for(kind, &options).is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_json_kinds_ask_for_json() {
        let options = RequestOptions::default();
        for kind in AnalysisKind::ALL {
            let instruction = instruction_for(kind, &options);
            assert_eq!(
                instruction.contains("Respond in JSON"),
                kind.is_structured(),
                "{kind}"
            );
        }
    }

    #[test]
    fn test_quiz_interpolates_question_count() {
        let instruction = instruction_for(AnalysisKind::Quiz, &RequestOptions::with_questions(3));
        assert!(instruction.contains("3 questions"));

        let instruction = instruction_for(AnalysisKind::Quiz, &RequestOptions::default());
        assert!(instruction.contains("5 questions"));
    }

    #[test]
    fn test_unknown_name_falls_back_to_summary() {
        let options = RequestOptions::default();
        assert_eq!(instruction_for_name("podcast", &options), DEFAULT_INSTRUCTION);
        assert_eq!(
            instruction_for_name("key-points", &options),
            instruction_for(AnalysisKind::KeyPoints, &options)
        );
    }

    #[test]
    fn test_search_instruction_quotes_topic() {
        assert!(search_instruction("  rust async  ").contains("topic: 'rust async'"));
    }
}
