use thiserror::Error;

/// Main error type for MediCore
#[derive(Error, Debug)]
pub enum MedicoreError {
    /// The model endpoint was unreachable, timed out or answered with a failure status
    #[error("Network error: {0}")]
    Network(String),

    /// The model answered, but not with a usable agent response
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The exchange task died before it could report back
    #[error("Request aborted: {0}")]
    Aborted(String),
}

impl MedicoreError {
    /// Whether the failure is scoped to a single request and the session can carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::MalformedResponse(_) | Self::Image(_) | Self::Aborted(_)
        )
    }

    /// Short label shown in the inline error turn
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "Network error",
            Self::MalformedResponse(_) => "Malformed response",
            Self::Image(_) => "Image error",
            Self::Config(_) => "Configuration error",
            Self::Aborted(_) => "Request aborted",
        }
    }
}

impl From<reqwest::Error> for MedicoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MedicoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_scoped_errors_are_recoverable() {
        assert!(MedicoreError::Network("timeout".into()).is_recoverable());
        assert!(MedicoreError::MalformedResponse("no agentType".into()).is_recoverable());
        assert!(MedicoreError::Image("too large".into()).is_recoverable());
        assert!(MedicoreError::Aborted("task panicked".into()).is_recoverable());
        assert!(!MedicoreError::Config("bad toml".into()).is_recoverable());
    }

    #[test]
    fn test_json_errors_map_to_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(
            MedicoreError::from(err),
            MedicoreError::MalformedResponse(_)
        ));
    }
}
