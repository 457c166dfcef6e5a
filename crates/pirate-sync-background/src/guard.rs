//! Per-wallet "sync in progress" guard
//!
//! Foreground and background syncs share one [`SyncGuard`]. Whoever holds a
//! wallet's [`SyncPermit`] owns that wallet until the permit is dropped;
//! everyone else is turned away immediately.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Registry of wallets that are currently syncing
#[derive(Clone, Default, Debug)]
pub struct SyncGuard {
    running: Arc<Mutex<HashSet<String>>>,
}

impl SyncGuard {
    /// Create an empty guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `wallet_id`, or `None` if it is already syncing
    pub fn try_acquire(&self, wallet_id: &str) -> Option<SyncPermit> {
        let mut running = self.running.lock();
        if !running.insert(wallet_id.to_string()) {
            debug!("Sync already in progress for wallet {}", wallet_id);
            return None;
        }
        Some(SyncPermit {
            wallet_id: wallet_id.to_string(),
            running: Arc::clone(&self.running),
        })
    }

    /// Check if sync is running for a wallet
    pub fn is_running(&self, wallet_id: &str) -> bool {
        self.running.lock().contains(wallet_id)
    }

    /// Wallets currently syncing, sorted
    pub fn running_wallets(&self) -> Vec<String> {
        let mut wallets: Vec<String> = self.running.lock().iter().cloned().collect();
        wallets.sort();
        wallets
    }
}

/// Exclusive claim on one wallet; released on drop
#[derive(Debug)]
pub struct SyncPermit {
    wallet_id: String,
    running: Arc<Mutex<HashSet<String>>>,
}

impl SyncPermit {
    /// Wallet this permit covers
    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }
}

impl Drop for SyncPermit {
    fn drop(&mut self) {
        self.running.lock().remove(&self.wallet_id);
    }
}
