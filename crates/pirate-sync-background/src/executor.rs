//! Contract with the chain sync engine

use crate::session::SyncMode;
use async_trait::async_trait;

/// What one executor run achieved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of blocks synced
    pub blocks_synced: u64,
    /// Number of new transactions
    pub new_transactions: u32,
    /// New balance after sync (if changed)
    pub new_balance: Option<u64>,
    /// Wallet height before the sync, if the engine reports it
    pub start_height: Option<u64>,
    /// Wallet height after the sync
    pub end_height: Option<u64>,
}

/// Black-box engine that scans and applies chain data for one wallet.
///
/// Implementations are expected to honour `max_duration_secs` themselves; the
/// runner still enforces an outer timeout and drops the future when it fires.
/// Errors are free-form and go through the keyword classifier.
#[async_trait]
pub trait SyncExecutor: Send + Sync {
    /// Sync `wallet_id` in `mode` within `max_duration_secs`
    async fn run_sync(
        &self,
        wallet_id: &str,
        mode: SyncMode,
        max_duration_secs: u64,
    ) -> anyhow::Result<SyncReport>;
}
