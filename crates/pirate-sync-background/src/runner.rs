//! Single-wallet sync sessions
//!
//! A session verifies the tunnel, then makes at most one executor call under
//! an outer timeout of max duration plus grace. Both steps race the
//! invocation's [`CancelToken`]. Nothing is retried here; the platform
//! scheduler re-triggers on its own cadence.

use crate::cancel::CancelToken;
use crate::classify::classify_error;
use crate::error::{Result, SyncError};
use crate::events;
use crate::executor::SyncExecutor;
use crate::guard::SyncGuard;
use crate::session::{SessionTarget, SyncMode, SyncResult, SyncSession};
use pirate_net::{TunnelMode, TunnelSelector};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default slack past the max duration before the executor call is dropped
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Inputs for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// Wallet to sync
    pub wallet_id: String,
    /// Sync mode
    pub mode: SyncMode,
    /// Time budget handed to the executor
    pub max_duration: Duration,
    /// Tunnel to switch to before verifying, if any
    pub tunnel_override: Option<TunnelMode>,
}

impl SessionRequest {
    /// Request using the currently selected tunnel
    pub fn new(wallet_id: impl Into<String>, mode: SyncMode, max_duration: Duration) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            mode,
            max_duration,
            tunnel_override: None,
        }
    }

    /// Switch the process-wide tunnel before this session verifies it
    pub fn with_tunnel(mut self, mode: TunnelMode) -> Self {
        self.tunnel_override = Some(mode);
        self
    }
}

/// Runs one bounded sync for one wallet
pub struct SessionRunner {
    tunnels: Arc<TunnelSelector>,
    executor: Arc<dyn SyncExecutor>,
    guard: SyncGuard,
    grace: Duration,
}

#[allow(dead_code)]
fn _assert_session_runner_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionRunner>();
}

impl SessionRunner {
    /// Create a runner sharing `guard` with any foreground sync
    pub fn new(
        tunnels: Arc<TunnelSelector>,
        executor: Arc<dyn SyncExecutor>,
        guard: SyncGuard,
    ) -> Self {
        Self {
            tunnels,
            executor,
            guard,
            grace: DEFAULT_GRACE,
        }
    }

    /// Override the grace margin
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Tunnel selector used by this runner
    pub fn tunnels(&self) -> &Arc<TunnelSelector> {
        &self.tunnels
    }

    /// Guard shared with foreground sync
    pub fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    /// Run one session.
    ///
    /// Fails fast with `NoWallet` for a blank wallet id and with `SyncFailed`
    /// when the wallet is already syncing. A tunnel that does not verify fails
    /// the session without calling the executor.
    pub async fn run(&self, request: SessionRequest, cancel: &CancelToken) -> Result<SyncResult> {
        let wallet_id = request.wallet_id.trim();
        if wallet_id.is_empty() {
            return Err(SyncError::NoWallet(
                "no wallet id for sync session".to_string(),
            ));
        }

        let _permit = self.guard.try_acquire(wallet_id).ok_or_else(|| {
            SyncError::SyncFailed(format!("sync already in progress for wallet {}", wallet_id))
        })?;

        if let Some(mode) = request.tunnel_override {
            self.tunnels.set_tunnel(mode);
        }

        let session = SyncSession::start(
            SessionTarget::Wallet(wallet_id.to_string()),
            request.mode,
            request.max_duration,
            self.tunnels.get_tunnel(),
        );
        events::log_started(&session);

        let outcome = self.run_session(&session, wallet_id, cancel).await;
        match &outcome {
            Ok(result) => events::log_completed(&session, result),
            Err(e) => events::log_failed(&session, e),
        }
        outcome
    }

    async fn run_session(
        &self,
        session: &SyncSession,
        wallet_id: &str,
        cancel: &CancelToken,
    ) -> Result<SyncResult> {
        let started = Instant::now();

        let verification = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(wallet_id)),
            verification = self.tunnels.verify(&session.tunnel) => verification,
        };
        events::log_tunnel_verified(session, &verification);
        if !verification.reachable {
            return Err(tunnel_error(&session.tunnel, verification.message));
        }

        let budget_secs = session.max_duration.as_secs().max(1);
        // Budgets come from untrusted invocation args
        let deadline = session.max_duration.saturating_add(self.grace);
        let call = self.executor.run_sync(wallet_id, session.mode, budget_secs);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(wallet_id)),
            outcome = tokio::time::timeout(deadline, call) => outcome,
        };

        let report = match outcome {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => return Err(classify_error(&e)),
            Err(_) => {
                return Err(SyncError::SyncFailed(format!(
                    "sync for wallet {} exceeded its {}s budget",
                    wallet_id,
                    deadline.as_secs()
                )))
            }
        };

        Ok(SyncResult {
            mode: session.mode,
            blocks_synced: report.blocks_synced,
            elapsed_secs: started.elapsed().as_secs(),
            new_transactions: report.new_transactions,
            new_balance: report.new_balance,
            start_height: report.start_height,
            end_height: report.end_height,
            tunnel_used: session.tunnel.clone(),
            errors: Vec::new(),
        })
    }
}

fn cancelled(wallet_id: &str) -> SyncError {
    SyncError::SyncFailed(format!("background sync cancelled for wallet {}", wallet_id))
}

/// Verification failures map straight to the tunnel's kind, bypassing the classifier
fn tunnel_error(tunnel: &TunnelMode, message: Option<String>) -> SyncError {
    let message = message.unwrap_or_else(|| format!("{} tunnel not verified", tunnel.label()));
    match tunnel {
        TunnelMode::Tor => SyncError::TorConnectionFailed(message),
        TunnelMode::Socks5 { .. } => SyncError::Socks5ConnectionFailed(message),
        TunnelMode::Direct => SyncError::NetworkError(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunnel_error_kinds() {
        assert_eq!(
            tunnel_error(&TunnelMode::Tor, None).code(),
            "TOR_CONNECTION_FAILED"
        );
        assert_eq!(
            tunnel_error(&TunnelMode::socks5(None), Some("refused".into())).code(),
            "SOCKS5_CONNECTION_FAILED"
        );
    }

    #[test]
    fn test_request_builder() {
        let request = SessionRequest::new("w1", SyncMode::Deep, Duration::from_secs(30))
            .with_tunnel(TunnelMode::Direct);
        assert_eq!(request.tunnel_override, Some(TunnelMode::Direct));
        assert_eq!(request.mode, SyncMode::Deep);
    }
}
