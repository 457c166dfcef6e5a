//! Wallet registry contract
//!
//! The gateway never reads wallet storage itself; the host app tells it which
//! wallets exist, which one is active, and receives last-synced updates.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pirate_sync_background::WalletActivity;

/// Source of wallets for background sync
pub trait WalletRegistry: Send + Sync {
    /// All wallets eligible for background sync
    fn wallets(&self) -> Vec<WalletActivity>;

    /// Wallet currently open in the app, if any
    fn active_wallet_id(&self) -> Option<String>;

    /// Record a successful sync
    fn mark_synced(&self, wallet_id: &str, at: DateTime<Utc>);
}

/// In-memory registry
#[derive(Debug, Default)]
pub struct InMemoryWalletRegistry {
    wallets: RwLock<Vec<WalletActivity>>,
    active: RwLock<Option<String>>,
}

impl InMemoryWalletRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the given wallet ids, none of them used or synced yet
    pub fn with_wallets<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        for id in ids {
            registry.add_wallet(id);
        }
        registry
    }

    /// Add a wallet; no-op if it is already known
    pub fn add_wallet(&self, id: impl Into<String>) {
        let id = id.into();
        let mut wallets = self.wallets.write();
        if wallets.iter().any(|w| w.id == id) {
            return;
        }
        wallets.push(WalletActivity {
            id,
            last_used_at: None,
            last_synced_at: None,
        });
    }

    /// Forget a wallet, clearing it as active if needed
    pub fn remove_wallet(&self, id: &str) {
        self.wallets.write().retain(|w| w.id != id);
        let mut active = self.active.write();
        if active.as_deref() == Some(id) {
            *active = None;
        }
    }

    /// Set (or clear) the active wallet
    pub fn set_active(&self, id: Option<&str>) {
        *self.active.write() = id.map(str::to_string);
    }

    /// Record that the user opened a wallet
    pub fn mark_used(&self, id: &str, at: DateTime<Utc>) {
        if let Some(wallet) = self.wallets.write().iter_mut().find(|w| w.id == id) {
            wallet.last_used_at = Some(at.timestamp());
        }
    }

    /// Activity for one wallet
    pub fn activity(&self, id: &str) -> Option<WalletActivity> {
        self.wallets.read().iter().find(|w| w.id == id).cloned()
    }
}

impl WalletRegistry for InMemoryWalletRegistry {
    fn wallets(&self) -> Vec<WalletActivity> {
        self.wallets.read().clone()
    }

    fn active_wallet_id(&self) -> Option<String> {
        self.active.read().clone()
    }

    fn mark_synced(&self, wallet_id: &str, at: DateTime<Utc>) {
        if let Some(wallet) = self.wallets.write().iter_mut().find(|w| w.id == wallet_id) {
            wallet.last_synced_at = Some(at.timestamp());
        }
    }
}
