use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::BackendError, schema::Schema};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },
}

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub api_base: String,
    pub model: String,
    pub env_var: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            env_var: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    /// Validate that the API key is set for this model endpoint
    pub fn validate_api_key(&self) -> Result<String, ProviderError> {
        std::env::var(&self.env_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey {
                env_var: self.env_var.clone(),
            })
    }
}

/// One model invocation: an instruction, optionally grounded on a video and
/// constrained by a response schema.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub schema: Option<Schema>,
    pub video_uri: Option<String>,
}

#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError>;
    fn model(&self) -> &str;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent<'a>>,
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text {
        text: &'a str,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData<'a> {
    mime_type: &'static str,
    file_uri: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Schema,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn build_body(request: &GenerateRequest) -> GeminiRequest<'_> {
    let mut parts = vec![GeminiPart::Text {
        text: &request.prompt,
    }];
    if let Some(uri) = &request.video_uri {
        parts.push(GeminiPart::File {
            file_data: FileData {
                mime_type: "video/youtube",
                file_uri: uri,
            },
        });
    }

    GeminiRequest {
        system_instruction: request.system_instruction.as_deref().map(|text| GeminiContent {
            parts: vec![GeminiPart::Text { text }],
        }),
        contents: vec![GeminiContent { parts }],
        generation_config: request.schema.as_ref().map(|schema| GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema,
        }),
    }
}

/// Provider message from an error body, or the body itself if it is not the
/// usual `{"error": {"message": ...}}` envelope.
fn error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn response_text(response: GeminiResponse) -> Result<String, BackendError> {
    let block_reason = response.prompt_feedback.and_then(|f| f.block_reason);
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(BackendError::EmptyResponse {
            reason: block_reason.unwrap_or_else(|| "no candidates".to_string()),
        });
    };

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(BackendError::EmptyResponse {
            reason: candidate
                .finish_reason
                .unwrap_or_else(|| "empty candidate".to_string()),
        });
    }

    Ok(text)
}

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    config: ModelConfig,
}

impl GeminiBackend {
    pub fn new(config: ModelConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            config,
        }
    }

    /// Build a backend from the API key in the configured environment variable.
    pub fn from_env(config: ModelConfig) -> Result<Self, ProviderError> {
        let api_key = config.validate_api_key()?;
        Ok(Self::new(config, api_key))
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        debug!(
            model = %self.config.model,
            has_schema = request.schema.is_some(),
            video = request.video_uri.as_deref().unwrap_or("-"),
            "calling generateContent"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&build_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status,
                message: error_message(&body),
            });
        }

        response_text(response.json::<GeminiResponse>().await?)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
