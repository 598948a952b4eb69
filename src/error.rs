//! Error types for authsock-mux

use thiserror::Error;

/// Main error type for authsock-mux
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upstream agent not available: {0}")]
    UpstreamNotAvailable(String),

    /// The upstream agent answered with SSH_AGENT_FAILURE
    #[error("Upstream agent refused {0} request")]
    AgentFailure(&'static str),

    /// The exchange with an upstream agent broke down
    #[error("Upstream agent error: {0}")]
    Upstream(String),

    #[error("No matching key")]
    NoMatchingKey,

    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error originated from talking to an upstream agent
    /// (as opposed to a local policy decision or a startup problem).
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            Error::AgentFailure(_)
                | Error::Upstream(_)
                | Error::Io(_)
                | Error::Protocol(_)
                | Error::InvalidMessage(_)
        )
    }

    /// Whether this error can only be raised while starting up
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::TomlParse(_)
                | Error::Socket(_)
                | Error::UpstreamNotAvailable(_)
        )
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
