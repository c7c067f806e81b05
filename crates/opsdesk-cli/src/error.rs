//! CLI-specific error types and mappings.
//!
//! This module provides error types for the CLI adapter and mappings
//! from store errors to exit codes and user-facing messages.

use opsdesk_core::StoreError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Store or domain error.
    #[error("{0}")]
    Store(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Configuration error (missing environment variables, bad URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend unreachable or refused the request.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Store(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Backend(_) => 69,  // EX_UNAVAILABLE
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => Self::Arguments(msg),
            StoreError::UnknownConversation(id) => {
                Self::Arguments(format!("unknown conversation: {id}"))
            }
            StoreError::Transport(e) => Self::Backend(e.to_string()),
            StoreError::SendFailed(e) => {
                Self::Backend(format!("reply was not sent (draft preserved): {e}"))
            }
            StoreError::MarkReadFailed(e) => {
                Self::Backend(format!("could not confirm read state: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdesk_core::TransportError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Store("x".to_string()).exit_code(), 1);
        assert_eq!(CliError::Arguments("x".to_string()).exit_code(), 2);
        assert_eq!(CliError::Config("x".to_string()).exit_code(), 78);
        assert_eq!(CliError::Backend("x".to_string()).exit_code(), 69);
    }

    #[test]
    fn test_store_error_mapping() {
        let err: CliError = StoreError::Validation("empty reply".to_string()).into();
        assert!(matches!(err, CliError::Arguments(_)));

        let err: CliError = StoreError::SendFailed(TransportError::Network {
            message: "reset".to_string(),
        })
        .into();
        assert!(matches!(err, CliError::Backend(_)));
        assert!(err.to_string().contains("draft preserved"));
    }
}
