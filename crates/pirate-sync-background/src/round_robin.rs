//! Round-robin background sync across wallets
//!
//! The shared budget `T` is split evenly: each of the `n` eligible wallets
//! gets `T / n`, and time a wallet leaves unused is not handed on. This can
//! under-use the budget when wallets finish early, in exchange for a slice
//! that is known up front. Wallets run one after another since they share
//! the tunnel selection and a single executor.

use crate::cancel::CancelToken;
use crate::error::{Result, SyncError, SyncErrorKind};
use crate::events;
use crate::runner::{SessionRequest, SessionRunner};
use crate::session::{SessionTarget, SyncMode, SyncResult, SyncSession};
use pirate_net::TunnelMode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Wallets used within this window are synced first
pub const WARM_WALLET_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

/// Usage data for ordering wallets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletActivity {
    /// Wallet id
    pub id: String,
    /// Last time the user opened the wallet (unix seconds)
    pub last_used_at: Option<i64>,
    /// Last successful sync (unix seconds)
    pub last_synced_at: Option<i64>,
}

/// Order wallets for a round.
///
/// Warm wallets come first, most recently used first; then the rest, least
/// recently synced first. The list is rotated so the wallet after `cursor`
/// (the last one synced) leads, keeping rotation fair across triggers.
pub fn order_candidates(
    candidates: Vec<WalletActivity>,
    cursor: Option<&str>,
    now: i64,
) -> Vec<String> {
    let (mut warm, mut cool): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|c| {
        c.last_used_at
            .map(|ts| now - ts <= WARM_WALLET_WINDOW_SECS)
            .unwrap_or(false)
    });

    warm.sort_by_key(|entry| std::cmp::Reverse(entry.last_used_at.unwrap_or(0)));
    cool.sort_by_key(|entry| entry.last_synced_at.unwrap_or(0));

    let mut ordered: Vec<String> = warm.into_iter().chain(cool).map(|c| c.id).collect();

    if let Some(cursor_id) = cursor {
        if let Some(pos) = ordered.iter().position(|id| id == cursor_id) {
            let len = ordered.len();
            ordered.rotate_left((pos + 1) % len);
        }
    }
    ordered
}

/// One wallet's turn within a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRun {
    /// Wallet id
    pub wallet_id: String,
    /// Blocks synced by this wallet's session
    pub blocks_synced: u64,
    /// Error kind when the session failed
    pub error: Option<SyncErrorKind>,
}

/// Aggregate outcome of one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRobinResult {
    /// Combined result across synced wallets
    pub result: SyncResult,
    /// Budget each eligible wallet was offered
    pub per_wallet_slice: Duration,
    /// Wallets that synced successfully, in order
    pub synced: Vec<String>,
    /// Wallets whose session failed
    pub failed: Vec<String>,
    /// Wallets not attempted (busy, out of budget or cancelled)
    pub skipped: Vec<String>,
    /// Every session attempted, in order
    pub runs: Vec<WalletRun>,
}

impl RoundRobinResult {
    /// Last wallet attempted this round, for the rotation cursor
    pub fn last_attempted(&self) -> Option<&str> {
        self.runs.last().map(|run| run.wallet_id.as_str())
    }
}

/// Sequentially syncs every known wallet under one budget
pub struct RoundRobinCoordinator {
    runner: Arc<SessionRunner>,
}

impl RoundRobinCoordinator {
    /// Create a coordinator delegating to `runner`
    pub fn new(runner: Arc<SessionRunner>) -> Self {
        Self { runner }
    }

    /// Sync `wallets` in order within `total_budget`.
    ///
    /// One wallet failing never stops the round; its error lands in the
    /// aggregate. Wallets left when the budget runs out are skipped, not
    /// failed, and get their turn on the next trigger.
    pub async fn run(
        &self,
        wallets: &[String],
        mode: SyncMode,
        total_budget: Duration,
        tunnel_override: Option<TunnelMode>,
        cancel: &CancelToken,
    ) -> Result<RoundRobinResult> {
        if wallets.is_empty() {
            return Err(SyncError::NoWallet(
                "no wallets available for background sync".to_string(),
            ));
        }

        let guard = self.runner.guard();
        let (eligible, mut skipped): (Vec<&String>, Vec<&String>) =
            wallets.iter().partition(|w| !guard.is_running(w));
        if !skipped.is_empty() {
            debug!("Skipping wallets already syncing: {:?}", skipped);
        }

        let tunnels = self.runner.tunnels();
        let session = SyncSession::start(
            SessionTarget::RoundRobin,
            mode,
            total_budget,
            tunnel_override.clone().unwrap_or_else(|| tunnels.get_tunnel()),
        );
        events::log_started(&session);

        let per_wallet_slice = if eligible.is_empty() {
            Duration::ZERO
        } else {
            total_budget / eligible.len() as u32
        };

        let started = Instant::now();
        let mut aggregate = SyncResult::empty(mode, session.tunnel.clone());
        let mut last_tunnel = None;
        let mut synced = Vec::new();
        let mut failed = Vec::new();
        let mut runs = Vec::new();

        for (index, wallet_id) in eligible.iter().enumerate() {
            let elapsed = started.elapsed();
            if elapsed >= total_budget || cancel.is_cancelled() {
                info!(
                    "Round-robin stopping after {:?}: {} wallet(s) left for next trigger",
                    elapsed,
                    eligible.len() - index
                );
                skipped.extend(eligible[index..].iter().copied());
                break;
            }

            let budget = per_wallet_slice.min(total_budget - elapsed);
            let mut request = SessionRequest::new(wallet_id.as_str(), mode, budget);
            request.tunnel_override = tunnel_override.clone();

            match self.runner.run(request, cancel).await {
                Ok(result) => {
                    aggregate.blocks_synced += result.blocks_synced;
                    aggregate.new_transactions += result.new_transactions;
                    if let Some(balance) = result.new_balance {
                        aggregate.new_balance =
                            Some(aggregate.new_balance.unwrap_or(0).saturating_add(balance));
                    }
                    aggregate
                        .errors
                        .extend(result.errors.into_iter().map(|e| format!("{}: {}", wallet_id, e)));
                    last_tunnel = Some(result.tunnel_used);
                    runs.push(WalletRun {
                        wallet_id: (*wallet_id).clone(),
                        blocks_synced: result.blocks_synced,
                        error: None,
                    });
                    synced.push((*wallet_id).clone());
                }
                Err(e) => {
                    aggregate
                        .errors
                        .push(format!("{}: {}: {}", wallet_id, e.code(), e.message()));
                    runs.push(WalletRun {
                        wallet_id: (*wallet_id).clone(),
                        blocks_synced: 0,
                        error: Some(e.kind()),
                    });
                    failed.push((*wallet_id).clone());
                }
            }
        }

        aggregate.elapsed_secs = started.elapsed().as_secs();
        aggregate.tunnel_used = last_tunnel.unwrap_or_else(|| tunnels.get_tunnel());

        info!(
            event = "background_sync_round_robin_completed",
            session_id = %session.id,
            synced = synced.len(),
            failed = failed.len(),
            skipped = skipped.len(),
            slice_secs = per_wallet_slice.as_secs(),
            blocks_synced = aggregate.blocks_synced,
            "Round-robin background sync finished"
        );

        Ok(RoundRobinResult {
            result: aggregate,
            per_wallet_slice,
            synced,
            failed,
            skipped: skipped.into_iter().cloned().collect(),
            runs,
        })
    }
}
