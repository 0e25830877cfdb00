//! Error types for Claimdesk

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OpenAI API key not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("OpenAI API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("AI request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// True when the failure means the service was never configured,
    /// as opposed to being down or misbehaving.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::MissingApiKey => true,
            Error::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_mentions_api_key() {
        let err = Error::MissingApiKey;
        assert!(err.to_string().contains("API key"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unauthorized_is_configuration() {
        let err = Error::Api {
            status: 401,
            body: "Incorrect API key provided".into(),
        };
        assert!(err.is_configuration());

        let err = Error::Api {
            status: 503,
            body: "overloaded".into(),
        };
        assert!(!err.is_configuration());
        assert!(!Error::Timeout(std::time::Duration::from_secs(30)).is_configuration());
    }
}
