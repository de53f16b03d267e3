use std::time::Duration;
use thiserror::Error;

/// Failures that can end a run.
///
/// Everything except [`AgentError::Cancelled`] is turned into exactly one `RUN_ERROR` event at
/// the run boundary. Cancellation ends the run silently.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("No user query found")]
    MissingQuery,

    #[error("{0}")]
    Processing(String),

    #[error("Classification timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to encode visualization payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Run cancelled by subscriber")]
    Cancelled,
}

impl AgentError {
    /// Machine-readable code carried on the `RUN_ERROR` event.
    pub fn code(&self) -> &'static str {
        match self {
            AgentError::MissingQuery => "MISSING_QUERY",
            AgentError::Timeout(_) => "TIMEOUT",
            AgentError::Cancelled => "CANCELLED",
            AgentError::Processing(_) | AgentError::Serialization(_) => "PROCESSING_FAILURE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_query_message_is_fixed() {
        assert_eq!(AgentError::MissingQuery.to_string(), "No user query found");
        assert_eq!(AgentError::MissingQuery.code(), "MISSING_QUERY");
    }

    #[test]
    fn test_processing_error_keeps_message_text() {
        let err = AgentError::Processing("classifier offline".to_string());
        assert_eq!(err.to_string(), "classifier offline");
        assert_eq!(err.code(), "PROCESSING_FAILURE");
    }

    #[test]
    fn test_serialization_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AgentError = json_err.into();
        assert_eq!(err.code(), "PROCESSING_FAILURE");
    }
}
