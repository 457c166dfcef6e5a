//! Session and result types

use chrono::{DateTime, Utc};
use pirate_net::TunnelMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Background sync mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Quick compact block sync (for frequent updates)
    #[default]
    Compact,
    /// Deep sync with witness updates (for daily maintenance)
    Deep,
}

impl SyncMode {
    /// Lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Compact => "compact",
            SyncMode::Deep => "deep",
        }
    }
}

impl From<&str> for SyncMode {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "deep" => SyncMode::Deep,
            _ => SyncMode::Compact,
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a session syncs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTarget {
    /// A single wallet
    Wallet(String),
    /// Every known wallet, in turn
    RoundRobin,
}

impl fmt::Display for SessionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionTarget::Wallet(id) => f.write_str(id),
            SessionTarget::RoundRobin => f.write_str("round-robin"),
        }
    }
}

/// One bounded sync execution. Transient, never persisted.
#[derive(Debug, Clone)]
pub struct SyncSession {
    /// Correlation id for logs
    pub id: Uuid,
    /// Wallet or round-robin
    pub target: SessionTarget,
    /// Sync mode
    pub mode: SyncMode,
    /// Time budget
    pub max_duration: Duration,
    /// Tunnel snapshot in effect for this session
    pub tunnel: TunnelMode,
    /// Start timestamp
    pub started_at: DateTime<Utc>,
}

impl SyncSession {
    /// Start a session now
    pub fn start(
        target: SessionTarget,
        mode: SyncMode,
        max_duration: Duration,
        tunnel: TunnelMode,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            mode,
            max_duration,
            tunnel,
            started_at: Utc::now(),
        }
    }
}

/// Background sync result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Sync mode that was executed
    pub mode: SyncMode,
    /// Number of blocks synced
    pub blocks_synced: u64,
    /// Duration in seconds
    pub elapsed_secs: u64,
    /// Number of new transactions
    pub new_transactions: u32,
    /// New balance after sync (if reported)
    pub new_balance: Option<u64>,
    /// Height before the sync (single-wallet sessions only)
    pub start_height: Option<u64>,
    /// Height after the sync (single-wallet sessions only)
    pub end_height: Option<u64>,
    /// Tunnel that was verified and used
    pub tunnel_used: TunnelMode,
    /// Any errors encountered (non-fatal)
    pub errors: Vec<String>,
}

impl SyncResult {
    /// Empty result for a mode and tunnel
    pub fn empty(mode: SyncMode, tunnel_used: TunnelMode) -> Self {
        Self {
            mode,
            blocks_synced: 0,
            elapsed_secs: 0,
            new_transactions: 0,
            new_balance: None,
            start_height: None,
            end_height: None,
            tunnel_used,
            errors: Vec::new(),
        }
    }
}
