//! Keyword classification of free-form sync failures.
//!
//! The sync executor reports errors as text, so the mapping onto
//! [`SyncErrorKind`] is a best-effort heuristic kept in this one place. It
//! can be dropped once executors return typed errors. Only the priority
//! order below is guaranteed, not the exact wording matched.

use crate::error::{SyncError, SyncErrorKind};

/// Pick an error kind for the given message.
///
/// Priority: `tor`, then `socks`, then `network` / `connection`, else
/// [`SyncErrorKind::SyncFailed`]. Never yields `NoWallet`, which is only
/// raised structurally.
pub fn classify_kind(message: &str) -> SyncErrorKind {
    let lowered = message.to_lowercase();
    if lowered.contains("tor") {
        SyncErrorKind::TorConnectionFailed
    } else if lowered.contains("socks") {
        SyncErrorKind::Socks5ConnectionFailed
    } else if lowered.contains("network") || lowered.contains("connection") {
        SyncErrorKind::NetworkError
    } else {
        SyncErrorKind::SyncFailed
    }
}

/// Classify an error message into a [`SyncError`] carrying that message
pub fn classify(message: &str) -> SyncError {
    classify_kind(message).with_message(message)
}

/// Classify an executor error, matching against its whole context chain
pub fn classify_error(err: &anyhow::Error) -> SyncError {
    classify(&format!("{:#}", err))
}
