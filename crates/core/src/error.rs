use std::path::PathBuf;

use thiserror::Error;

/// Terminal failures of a single analysis or search request. None are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid YouTube URL provided: {url}. Please check the format.")]
    InvalidReference { url: String },

    #[error("The video could not be accessed. It may be private, deleted, or unavailable. ({message})")]
    ContentUnavailable { message: String },

    #[error("The video is too long to be processed. Please try a shorter video. ({message})")]
    TooLarge { message: String },

    #[error("The response from the model was not in the expected format: {reason}")]
    MalformedResponse { reason: String },

    #[error("The model service is unavailable: {message}")]
    ServiceUnavailable { message: String },
}

/// Infer an error kind from an unstructured provider message by substring.
pub fn classify_failure(message: &str) -> AnalysisError {
    let message = message.to_string();
    if message.contains("token count") || message.contains("maximum number of tokens") {
        return AnalysisError::TooLarge { message };
    }
    if message.contains("Unsupported file uri") || message.contains("could not be accessed") {
        return AnalysisError::ContentUnavailable { message };
    }
    AnalysisError::ServiceUnavailable { message }
}

/// Failures of the model invocation capability itself.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no text: {reason}")]
    EmptyResponse { reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key: {key:?}")]
    InvalidKey { key: String },

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_token_limit() {
        let err = classify_failure(
            "The input token count (1200000) exceeds the maximum number of tokens allowed (1048576).",
        );
        assert!(matches!(err, AnalysisError::TooLarge { .. }));
    }

    #[test]
    fn test_classify_inaccessible_video() {
        assert!(matches!(
            classify_failure("API error (400): Unsupported file uri: https://www.youtube.com/watch?v=x"),
            AnalysisError::ContentUnavailable { .. }
        ));
        assert!(matches!(
            classify_failure("The file could not be accessed"),
            AnalysisError::ContentUnavailable { .. }
        ));
    }

    #[test]
    fn test_classify_keeps_raw_message_for_unknown_failures() {
        let err = classify_failure("API error (503): The model is overloaded.");
        assert_eq!(
            err,
            AnalysisError::ServiceUnavailable {
                message: "API error (503): The model is overloaded.".to_string()
            }
        );
        assert!(err.to_string().contains("The model is overloaded."));
    }
}
