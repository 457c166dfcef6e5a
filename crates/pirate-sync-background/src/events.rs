//! Structured logging for background sync observability

use crate::error::SyncError;
use crate::session::{SyncResult, SyncSession};
use pirate_net::TunnelVerification;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub(crate) fn log_started(session: &SyncSession) {
    info!(
        event = "background_sync_started",
        session_id = %session.id,
        wallet_id = %session.target,
        mode = %session.mode,
        max_duration_secs = session.max_duration.as_secs(),
        tunnel = %session.tunnel,
        timestamp = %session.started_at.to_rfc3339(),
        "Background sync started"
    );
}

pub(crate) fn log_tunnel_verified(session: &SyncSession, verification: &TunnelVerification) {
    if verification.reachable {
        info!(
            event = "background_sync_tunnel_verified",
            session_id = %session.id,
            tunnel_type = session.tunnel.label(),
            is_privacy_preserving = session.tunnel.is_privacy_preserving(),
            "Network tunnel verified for background sync"
        );
    } else {
        warn!(
            event = "background_sync_tunnel_rejected",
            session_id = %session.id,
            tunnel_type = session.tunnel.label(),
            reason = verification.message.as_deref().unwrap_or("unknown"),
            "Network tunnel not usable, skipping sync"
        );
    }
}

pub(crate) fn log_completed(session: &SyncSession, result: &SyncResult) {
    info!(
        event = "background_sync_completed",
        session_id = %session.id,
        wallet_id = %session.target,
        blocks_synced = result.blocks_synced,
        duration_secs = result.elapsed_secs,
        new_transactions = result.new_transactions,
        errors = result.errors.len(),
        "Background sync completed"
    );
}

pub(crate) fn log_failed(session: &SyncSession, err: &SyncError) {
    error!(
        event = "background_sync_failed",
        session_id = %session.id,
        wallet_id = %session.target,
        code = err.code(),
        error = %err,
        "Background sync failed"
    );
}

/// Log a "funds received" notification raised after a background run
pub fn log_notification(wallet_id: &str, transaction_count: u32) {
    info!(
        event = "background_sync_notification",
        notification_type = "funds_received",
        wallet_id = %wallet_id,
        transaction_count = transaction_count,
        "Background sync notification shown"
    );
}

/// Install a JSON `tracing` subscriber for background sync.
///
/// `RUST_LOG` overrides `default_directive`. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logging(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init()
        .is_ok();

    if installed {
        info!("Background sync logging initialized");
    }
}
