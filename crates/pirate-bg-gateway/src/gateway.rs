//! Entry point for OS-triggered background sync

use crate::args::BackgroundSyncArgs;
use crate::error::Result;
use crate::registry::WalletRegistry;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use pirate_net::{redact_socks5_url, TorReadiness, TunnelMode, TunnelSelector};
use pirate_sync_background::{
    log_notification, order_candidates, BackgroundSyncConfig, CancelToken, RoundRobinCoordinator,
    RoundRobinResult, ScheduleRequest, SessionRequest, SessionRunner, SyncError, SyncExecutor,
    SyncGuard, SyncMode, SyncResult,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Most recent background sync outcome for one wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastOutcome {
    /// When the session finished
    pub at: DateTime<Utc>,
    /// Blocks synced (0 on failure)
    pub blocks_synced: u64,
    /// Error code if the session failed
    pub error_code: Option<&'static str>,
}

/// Background sync gateway
pub struct BackgroundSyncGateway {
    config: BackgroundSyncConfig,
    runner: Arc<SessionRunner>,
    coordinator: RoundRobinCoordinator,
    registry: Arc<dyn WalletRegistry>,
    cursor: Mutex<Option<String>>,
    outcomes: RwLock<HashMap<String, LastOutcome>>,
}

impl BackgroundSyncGateway {
    /// Gateway with its own tunnel selector and sync guard.
    ///
    /// SOCKS5 proxies are probed over TCP; the initial tunnel is Tor.
    pub fn new(
        config: BackgroundSyncConfig,
        tor: Arc<dyn TorReadiness>,
        executor: Arc<dyn SyncExecutor>,
        registry: Arc<dyn WalletRegistry>,
    ) -> Self {
        let tunnels =
            Arc::new(TunnelSelector::new(tor).with_verify_timeout(config.verify_timeout()));
        Self::with_components(config, tunnels, executor, SyncGuard::new(), registry)
    }

    /// Gateway sharing a tunnel selector and sync guard with the foreground app
    pub fn with_components(
        config: BackgroundSyncConfig,
        tunnels: Arc<TunnelSelector>,
        executor: Arc<dyn SyncExecutor>,
        guard: SyncGuard,
        registry: Arc<dyn WalletRegistry>,
    ) -> Self {
        let runner =
            Arc::new(SessionRunner::new(tunnels, executor, guard).with_grace(config.grace()));
        Self {
            coordinator: RoundRobinCoordinator::new(Arc::clone(&runner)),
            config,
            runner,
            registry,
            cursor: Mutex::new(None),
            outcomes: RwLock::new(HashMap::new()),
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &BackgroundSyncConfig {
        &self.config
    }

    /// Tunnel selector shared with sessions
    pub fn tunnels(&self) -> &Arc<TunnelSelector> {
        self.runner.tunnels()
    }

    /// Sync guard shared with sessions
    pub fn guard(&self) -> &SyncGuard {
        self.runner.guard()
    }

    /// Execute background sync.
    ///
    /// Called by the platform scheduler (WorkManager, BGTask) with an untyped
    /// argument bag. Syncs the requested or active wallet, or every known
    /// wallet in round-robin when asked to or when no wallet resolves.
    pub async fn execute_background_sync(
        &self,
        args: &Value,
        cancel: &CancelToken,
    ) -> Result<HashMap<String, String>> {
        let args = BackgroundSyncArgs::from_value(args)?;
        let mode = args.sync_mode();
        // Unset budgets use the compact cap whatever the mode
        let max_duration = args
            .max_duration_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.max_duration_for(SyncMode::Compact));
        let tunnel = args.tunnel_mode();

        let wallet_id = args
            .wallet_id()
            .map(str::to_string)
            .or_else(|| self.get_active_wallet_id());

        info!(
            event = "background_sync_invoked",
            mode = %mode,
            max_duration_secs = max_duration.as_secs(),
            round_robin = args.use_round_robin || wallet_id.is_none(),
            tunnel = tunnel.label(),
            "Executing background sync"
        );

        match wallet_id {
            Some(wallet_id) if !args.use_round_robin => {
                self.sync_wallet(&wallet_id, mode, max_duration, tunnel, cancel)
                    .await
            }
            _ => self.sync_round_robin(mode, max_duration, tunnel, cancel).await,
        }
    }

    async fn sync_wallet(
        &self,
        wallet_id: &str,
        mode: SyncMode,
        max_duration: Duration,
        tunnel: TunnelMode,
        cancel: &CancelToken,
    ) -> Result<HashMap<String, String>> {
        let request = SessionRequest::new(wallet_id, mode, max_duration).with_tunnel(tunnel);

        match self.runner.run(request, cancel).await {
            Ok(result) => {
                let now = Utc::now();
                self.record(wallet_id, now, result.blocks_synced, None);
                self.registry.mark_synced(wallet_id, now);
                *self.cursor.lock() = Some(wallet_id.to_string());

                let mut map = result_map(&result);
                self.notify(wallet_id, &result, &mut map);
                map.insert("wallet_id".to_string(), wallet_id.to_string());
                Ok(map)
            }
            Err(e) => {
                if !matches!(e, SyncError::NoWallet(_)) {
                    self.record(wallet_id, Utc::now(), 0, Some(e.code()));
                }
                Err(e.into())
            }
        }
    }

    async fn sync_round_robin(
        &self,
        mode: SyncMode,
        total_budget: Duration,
        tunnel: TunnelMode,
        cancel: &CancelToken,
    ) -> Result<HashMap<String, String>> {
        let candidates = self.registry.wallets();
        if candidates.is_empty() {
            return Err(SyncError::NoWallet(
                "no wallets available for background sync".to_string(),
            )
            .into());
        }

        let cursor = self.cursor.lock().clone();
        let ordered = order_candidates(candidates, cursor.as_deref(), Utc::now().timestamp());

        let outcome = self
            .coordinator
            .run(&ordered, mode, total_budget, Some(tunnel), cancel)
            .await?;

        let now = Utc::now();
        for run in &outcome.runs {
            self.record(&run.wallet_id, now, run.blocks_synced, run.error.map(|k| k.code()));
            if run.error.is_none() {
                self.registry.mark_synced(&run.wallet_id, now);
            }
        }
        if let Some(last) = outcome.last_attempted() {
            *self.cursor.lock() = Some(last.to_string());
        }

        let mut map = round_robin_map(&outcome);
        self.notify("round-robin", &outcome.result, &mut map);
        Ok(map)
    }

    fn notify(&self, target: &str, result: &SyncResult, map: &mut HashMap<String, String>) {
        let notify = self.config.should_notify(result);
        if notify {
            log_notification(target, result.new_transactions);
        }
        map.insert("notify".to_string(), notify.to_string());
    }

    fn record(
        &self,
        wallet_id: &str,
        at: DateTime<Utc>,
        blocks_synced: u64,
        error_code: Option<&'static str>,
    ) {
        self.outcomes.write().insert(
            wallet_id.to_string(),
            LastOutcome {
                at,
                blocks_synced,
                error_code,
            },
        );
    }

    /// Most recent background outcome for a wallet
    pub fn last_outcome(&self, wallet_id: &str) -> Option<LastOutcome> {
        self.outcomes.read().get(wallet_id).cloned()
    }

    /// Label of the current tunnel mode
    pub fn get_tunnel_mode(&self) -> String {
        self.tunnels().get_tunnel().label().to_string()
    }

    /// Set the tunnel mode for subsequent syncs.
    ///
    /// Unknown modes fall back to Tor. Returns the mode now in effect.
    pub fn set_tunnel_mode(&self, mode: &str, socks5_url: Option<&str>) -> TunnelMode {
        let tunnel = TunnelMode::from_parts(mode, socks5_url).unwrap_or_else(|e| {
            warn!("Rejected tunnel mode ({}), falling back to tor", e);
            TunnelMode::Tor
        });
        self.tunnels().set_tunnel(tunnel.clone());
        tunnel
    }

    /// Get background sync status.
    ///
    /// Without a wallet id the active wallet is reported, if any.
    pub fn get_sync_status(&self, wallet_id: Option<&str>) -> HashMap<String, String> {
        let mut status = HashMap::new();
        let tunnel = self.tunnels().get_tunnel();

        status.insert("tunnel_mode".to_string(), tunnel.label().to_string());
        if let Some(url) = tunnel.socks5_url() {
            status.insert("socks5_url".to_string(), redact_socks5_url(url));
        }
        status.insert(
            "is_privacy_preserving".to_string(),
            tunnel.is_privacy_preserving().to_string(),
        );

        let running = self.guard().running_wallets();
        let wallet_id = wallet_id
            .map(str::to_string)
            .or_else(|| self.get_active_wallet_id());

        match wallet_id {
            Some(wallet_id) => {
                status.insert(
                    "is_running".to_string(),
                    running.contains(&wallet_id).to_string(),
                );
                if let Some(outcome) = self.last_outcome(&wallet_id) {
                    status.insert("last_run_at".to_string(), outcome.at.to_rfc3339());
                    status.insert(
                        "last_blocks_synced".to_string(),
                        outcome.blocks_synced.to_string(),
                    );
                    if let Some(code) = outcome.error_code {
                        status.insert("last_error_code".to_string(), code.to_string());
                    }
                }
                status.insert("wallet_id".to_string(), wallet_id);
            }
            None => {
                status.insert("is_running".to_string(), (!running.is_empty()).to_string());
            }
        }
        if !running.is_empty() {
            status.insert("running_wallets".to_string(), running.join(","));
        }

        status
    }

    /// Active wallet, if one is open
    pub fn get_active_wallet_id(&self) -> Option<String> {
        self.registry
            .active_wallet_id()
            .filter(|id| !id.trim().is_empty())
    }

    /// Mode to request given minutes since the last sync
    pub fn recommend_sync_mode(&self, minutes_since_last: u32) -> SyncMode {
        self.config.recommend_sync_mode(minutes_since_last)
    }

    /// Registrations for the platform scheduler
    pub fn schedule(&self) -> Vec<ScheduleRequest> {
        self.config.schedules()
    }
}

fn result_map(result: &SyncResult) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("mode".to_string(), result.mode.to_string());
    map.insert("blocks_synced".to_string(), result.blocks_synced.to_string());
    map.insert("duration_secs".to_string(), result.elapsed_secs.to_string());
    map.insert(
        "new_transactions".to_string(),
        result.new_transactions.to_string(),
    );
    map.insert(
        "tunnel_used".to_string(),
        result.tunnel_used.label().to_string(),
    );
    if let Some(balance) = result.new_balance {
        map.insert("new_balance".to_string(), balance.to_string());
    }
    if let Some(height) = result.start_height {
        map.insert("start_height".to_string(), height.to_string());
    }
    if let Some(height) = result.end_height {
        map.insert("end_height".to_string(), height.to_string());
    }
    if !result.errors.is_empty() {
        map.insert("errors".to_string(), result.errors.join("; "));
    }
    map
}

fn round_robin_map(outcome: &RoundRobinResult) -> HashMap<String, String> {
    let mut map = result_map(&outcome.result);
    map.insert("wallets_synced".to_string(), outcome.synced.len().to_string());
    map.insert("wallets_failed".to_string(), outcome.failed.len().to_string());
    map.insert(
        "wallets_skipped".to_string(),
        outcome.skipped.len().to_string(),
    );
    map.insert(
        "slice_secs".to_string(),
        outcome.per_wallet_slice.as_secs().to_string(),
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_map_optional_keys() {
        let mut result = SyncResult::empty(SyncMode::Deep, TunnelMode::Direct);
        let map = result_map(&result);
        assert_eq!(map.get("mode").map(String::as_str), Some("deep"));
        assert_eq!(map.get("tunnel_used").map(String::as_str), Some("direct"));
        assert!(!map.contains_key("new_balance"));
        assert!(!map.contains_key("errors"));
        assert!(!map.contains_key("start_height"));

        result.new_balance = Some(42);
        result.start_height = Some(10);
        result.end_height = Some(12);
        result.errors = vec!["a".to_string(), "b".to_string()];
        let map = result_map(&result);
        assert_eq!(map.get("new_balance").map(String::as_str), Some("42"));
        assert_eq!(map.get("errors").map(String::as_str), Some("a; b"));
        assert_eq!(map.get("start_height").map(String::as_str), Some("10"));
        assert_eq!(map.get("end_height").map(String::as_str), Some("12"));
    }
}
