use tracing::{debug, warn};

use crate::{
    error::{AnalysisError, Result, classify_failure},
    prompt::{SYSTEM_INSTRUCTION, instruction_for, search_instruction},
    provider::{GenerateRequest, ModelBackend},
    resolver::{canonical_url, resolve_video_id},
    schema::{schema_for, video_suggestions_schema},
    types::{AnalysisRequest, AnalysisResult, VideoSuggestion},
    validate::parse_video_suggestions,
};

/// Rough token estimate: one token per four characters, rounded up.
pub fn approx_tokens(instruction: &str, output: &str) -> u64 {
    let chars = (instruction.chars().count() + output.chars().count()) as u64;
    chars.div_ceil(4)
}

/// Stateless front for the model: shapes requests and classifies failures.
/// It never touches history; callers own that.
pub struct AnalysisClient<B> {
    backend: B,
}

impl<B: ModelBackend> AnalysisClient<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Run one analysis. The URL is resolved before anything goes out, so an
    /// unrecognized reference never reaches the network.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let video_id =
            resolve_video_id(&request.url).ok_or_else(|| AnalysisError::InvalidReference {
                url: request.url.clone(),
            })?;

        let prompt = instruction_for(request.kind, &request.options);
        let generate = GenerateRequest {
            system_instruction: Some(SYSTEM_INSTRUCTION.to_string()),
            prompt,
            schema: schema_for(request.kind),
            video_uri: Some(canonical_url(&video_id)),
        };
        debug!(kind = %request.kind, %video_id, "dispatching analysis");

        let text = self.backend.generate(&generate).await.map_err(|e| {
            let err = classify_failure(&e.to_string());
            warn!(error = %e, kind = %request.kind, "analysis failed");
            err
        })?;

        let approx_tokens = approx_tokens(&generate.prompt, &text);
        debug!(approx_tokens, "analysis complete");

        Ok(AnalysisResult {
            text,
            approx_tokens,
        })
    }

    /// Ask the model for videos about a topic. No video reference is involved.
    pub async fn find_videos(&self, topic: &str) -> Result<Vec<VideoSuggestion>> {
        let generate = GenerateRequest {
            system_instruction: None,
            prompt: search_instruction(topic),
            schema: Some(video_suggestions_schema()),
            video_uri: None,
        };

        let text = self.backend.generate(&generate).await.map_err(|e| {
            warn!(error = %e, "video search failed");
            AnalysisError::ServiceUnavailable {
                message: e.to_string(),
            }
        })?;

        parse_video_suggestions(&text).ok_or_else(|| AnalysisError::MalformedResponse {
            reason: "expected an object with a \"videos\" array".to_string(),
        })
    }
}
