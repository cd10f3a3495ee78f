//! Error types for structured-filter extraction
//!
//! Every failure is local to one question. The engine renders these into
//! short user-facing strings instead of propagating them.

/// Message shown when no completion credential is configured
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Falta OPENAI_API_KEY en la configuración.";

/// Prefix of every other extraction failure message
pub const EXTRACTION_ERROR_PREFIX: &str = "Error interpretando la pregunta";

/// Errors turning a question into a filter spec via the completion service
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No API key configured; nothing was sent
    #[error("missing completion service credential")]
    MissingCredential,

    /// Transport failure talking to the service
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("completion service answered {status}: {detail}")]
    Service { status: u16, detail: String },

    /// Service answered without any message content
    #[error("completion service returned no content")]
    EmptyResponse,

    /// Response text is not the expected JSON object
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// `size` could not be coerced to an integer
    #[error("invalid size value: {0}")]
    InvalidSize(String),
}

impl ExtractError {
    /// Create service error
    pub fn service(status: u16, detail: impl Into<String>) -> Self {
        Self::Service {
            status,
            detail: detail.into(),
        }
    }

    /// True for configuration problems rather than per-request failures
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }

    /// Short text shown to the user in place of an answer
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
            other => format!("{EXTRACTION_ERROR_PREFIX}: {other}"),
        }
    }
}

/// Result type alias for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_message_is_fixed() {
        let err = ExtractError::MissingCredential;
        assert!(err.is_configuration());
        assert_eq!(err.user_message(), MISSING_CREDENTIAL_MESSAGE);
    }

    #[test]
    fn other_errors_embed_diagnostic() {
        let err = ExtractError::InvalidSize("\"cuarenta\"".to_string());
        assert!(!err.is_configuration());
        assert_eq!(
            err.user_message(),
            "Error interpretando la pregunta: invalid size value: \"cuarenta\""
        );
    }

    #[test]
    fn service_error_display() {
        let err = ExtractError::service(429, "rate limited");
        assert_eq!(err.to_string(), "completion service answered 429: rate limited");
    }
}
