//! Exit code definitions for authsock-mux
//!
//! Provides standardized exit codes for different error conditions.

use crate::error::Error;

/// Exit codes for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// General/unspecified error
    GeneralError = 1,
    /// Configuration error (invalid config, missing required settings)
    ConfigError = 2,
    /// Socket error (cannot create/bind socket, permission denied)
    SocketError = 3,
    /// Upstream error (cannot connect to upstream agent)
    UpstreamError = 4,
}

impl ExitCode {
    /// Classify a command failure by the first crate error in its chain
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.chain().find_map(|e| e.downcast_ref::<Error>()) {
            Some(Error::Config(_) | Error::TomlParse(_)) => ExitCode::ConfigError,
            Some(Error::Socket(_)) => ExitCode::SocketError,
            Some(Error::UpstreamNotAvailable(_)) => ExitCode::UpstreamError,
            Some(e) if e.is_upstream_failure() => ExitCode::UpstreamError,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<ExitCode> for u8 {
    fn from(code: ExitCode) -> Self {
        code as u8
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
