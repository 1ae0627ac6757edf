//! ShieldChat error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShieldChatError>;

#[derive(Debug, Error)]
pub enum ShieldChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API key missing for provider '{0}'")]
    ApiKeyMissing(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShieldChatError {
    /// True for failures that came from talking to an external service
    /// (completion or embeddings), as opposed to local configuration.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::Http(_) | Self::Embedding(_) | Self::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = ShieldChatError::ApiKeyMissing("openai".into());
        assert_eq!(e.to_string(), "API key missing for provider 'openai'");
        let e = ShieldChatError::Http("timeout".into());
        assert_eq!(e.to_string(), "HTTP error: timeout");
    }

    #[test]
    fn test_service_error_classification() {
        assert!(ShieldChatError::Provider("429".into()).is_service_error());
        assert!(ShieldChatError::Http("refused".into()).is_service_error());
        assert!(!ShieldChatError::ApiKeyMissing("openai".into()).is_service_error());
        assert!(!ShieldChatError::Config("bad".into()).is_service_error());
    }

    #[test]
    fn test_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: ShieldChatError = io.into();
        assert!(matches!(e, ShieldChatError::Io(_)));
    }
}
