//! Error surfaced at the scheduler boundary

use pirate_sync_background::{SyncError, SyncErrorKind};
use serde::{Deserialize, Serialize};

/// Result type
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Flat error handed back to the platform scheduler.
///
/// `code` is one of the stable [`SyncErrorKind`] codes, so the scheduler
/// shim can branch on it without parsing `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct GatewayError {
    /// Stable error code, e.g. `TOR_CONNECTION_FAILED`
    pub code: String,
    /// Human-readable detail
    pub message: String,
}

impl GatewayError {
    /// Error of the given kind
    pub fn new(kind: SyncErrorKind, message: impl Into<String>) -> Self {
        Self {
            code: kind.code().to_string(),
            message: message.into(),
        }
    }

    /// Malformed invocation arguments
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::new(SyncErrorKind::SyncFailed, message)
    }

    /// Serialize as `{"code": ..., "message": ...}`
    pub fn to_json(&self) -> String {
        serde_json::json!({ "code": self.code, "message": self.message }).to_string()
    }
}

impl From<SyncError> for GatewayError {
    fn from(err: SyncError) -> Self {
        Self::new(err.kind(), err.message())
    }
}
