//! Tubelens Core Library
//!
//! Request shaping, model invocation, response validation and history for
//! analyzing YouTube videos with a hosted multimodal model.

pub mod client;
pub mod error;
pub mod format;
pub mod history;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod resolver;
pub mod schema;
pub mod speech;
pub mod store;
pub mod types;
pub mod validate;

// Re-export commonly used items at crate root
pub use client::{AnalysisClient, approx_tokens};
pub use error::{AnalysisError, BackendError, Result, StorageError, classify_failure};
pub use format::{format_history, format_result_readable, format_suggestions, speakable_text};
pub use history::{HISTORY_CAPACITY, HISTORY_KEY, HistoryStore, load_all};
pub use pipeline::{AnalysisOutcome, analyze_and_record};
pub use prompt::{instruction_for, instruction_for_name};
pub use provider::{GeminiBackend, GenerateRequest, ModelBackend, ModelConfig, ProviderError};
pub use resolver::{canonical_url, resolve_video_id};
pub use schema::{Schema, SchemaType, schema_for, schema_for_name};
pub use speech::{
    PlaybackRate, PlaybackState, SpeechEngine, SpeechError, SpeechSession, Utterance,
    chunk_sentences,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, default_data_dir};
pub use types::{
    AnalysisKind, AnalysisRequest, AnalysisResult, HistoryItem, QuestionCount, RequestOptions,
    VideoSuggestion,
};
pub use validate::TypedResult;
