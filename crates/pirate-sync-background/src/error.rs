//! Error types for background sync sessions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type
pub type Result<T> = std::result::Result<T, SyncError>;

/// Session-fatal sync errors.
///
/// Closed set: callers branch on [`SyncError::code`]. Recoverable per-item
/// problems go into `SyncResult::errors` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Tor was selected but is not ready or reachable
    #[error("Tor connection failed: {0}")]
    TorConnectionFailed(String),

    /// SOCKS5 was selected but the proxy is unusable
    #[error("SOCKS5 connection failed: {0}")]
    Socks5ConnectionFailed(String),

    /// Network error while syncing
    #[error("Network error: {0}")]
    NetworkError(String),

    /// No wallet could be resolved for the session
    #[error("No wallet: {0}")]
    NoWallet(String),

    /// Any other sync failure, including cancellation and timeouts
    #[error("Sync failed: {0}")]
    SyncFailed(String),
}

/// Discriminant of [`SyncError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncErrorKind {
    /// See [`SyncError::TorConnectionFailed`]
    TorConnectionFailed,
    /// See [`SyncError::Socks5ConnectionFailed`]
    Socks5ConnectionFailed,
    /// See [`SyncError::NetworkError`]
    NetworkError,
    /// See [`SyncError::NoWallet`]
    NoWallet,
    /// See [`SyncError::SyncFailed`]
    SyncFailed,
}

impl SyncErrorKind {
    /// Stable code surfaced to the scheduler boundary
    pub fn code(&self) -> &'static str {
        match self {
            SyncErrorKind::TorConnectionFailed => "TOR_CONNECTION_FAILED",
            SyncErrorKind::Socks5ConnectionFailed => "SOCKS5_CONNECTION_FAILED",
            SyncErrorKind::NetworkError => "NETWORK_ERROR",
            SyncErrorKind::NoWallet => "NO_WALLET",
            SyncErrorKind::SyncFailed => "SYNC_FAILED",
        }
    }

    /// Build an error of this kind
    pub fn with_message(self, message: impl Into<String>) -> SyncError {
        let message = message.into();
        match self {
            SyncErrorKind::TorConnectionFailed => SyncError::TorConnectionFailed(message),
            SyncErrorKind::Socks5ConnectionFailed => SyncError::Socks5ConnectionFailed(message),
            SyncErrorKind::NetworkError => SyncError::NetworkError(message),
            SyncErrorKind::NoWallet => SyncError::NoWallet(message),
            SyncErrorKind::SyncFailed => SyncError::SyncFailed(message),
        }
    }
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl SyncError {
    /// Error kind
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::TorConnectionFailed(_) => SyncErrorKind::TorConnectionFailed,
            SyncError::Socks5ConnectionFailed(_) => SyncErrorKind::Socks5ConnectionFailed,
            SyncError::NetworkError(_) => SyncErrorKind::NetworkError,
            SyncError::NoWallet(_) => SyncErrorKind::NoWallet,
            SyncError::SyncFailed(_) => SyncErrorKind::SyncFailed,
        }
    }

    /// Stable code string, e.g. `TOR_CONNECTION_FAILED`
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            SyncError::TorConnectionFailed(m)
            | SyncError::Socks5ConnectionFailed(m)
            | SyncError::NetworkError(m)
            | SyncError::NoWallet(m)
            | SyncError::SyncFailed(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            SyncError::TorConnectionFailed(String::new()).code(),
            "TOR_CONNECTION_FAILED"
        );
        assert_eq!(
            SyncError::Socks5ConnectionFailed(String::new()).code(),
            "SOCKS5_CONNECTION_FAILED"
        );
        assert_eq!(SyncError::NetworkError(String::new()).code(), "NETWORK_ERROR");
        assert_eq!(SyncError::NoWallet(String::new()).code(), "NO_WALLET");
        assert_eq!(SyncError::SyncFailed(String::new()).code(), "SYNC_FAILED");
    }

    #[test]
    fn test_kind_round_trip() {
        let err = SyncErrorKind::NetworkError.with_message("timeout");
        assert_eq!(err.kind(), SyncErrorKind::NetworkError);
        assert_eq!(err.message(), "timeout");
        assert_eq!(err.to_string(), "Network error: timeout");
    }
}
