//! Tor readiness contract
//!
//! The Tor client itself lives outside this crate. Sync only needs to know
//! whether it finished bootstrapping, which the client reports as a status
//! string through [`TorReadiness`].

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Readiness string a Tor client reports once it can carry traffic
pub const TOR_READY: &str = "ready";

/// Readiness signal exposed by the external Tor client
#[async_trait]
pub trait TorReadiness: Send + Sync {
    /// Current readiness status; only exactly [`TOR_READY`] is trusted
    async fn readiness_status(&self) -> String;
}

/// Tor bootstrap status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorStatus {
    /// Not started
    NotStarted,
    /// Bootstrapping (0-100%)
    Bootstrapping(u8),
    /// Ready for connections
    Ready,
    /// Error state
    Error,
}

impl TorStatus {
    /// Readiness string for this status
    pub fn as_readiness(&self) -> &'static str {
        match self {
            TorStatus::NotStarted => "not_started",
            TorStatus::Bootstrapping(_) => "bootstrapping",
            TorStatus::Ready => TOR_READY,
            TorStatus::Error => "error",
        }
    }
}

/// Shared status cell a host Tor client publishes into
#[derive(Clone)]
pub struct TorStatusHandle {
    status: Arc<RwLock<TorStatus>>,
}

impl TorStatusHandle {
    /// Create a handle in the `NotStarted` state
    pub fn new() -> Self {
        Self {
            status: Arc::new(RwLock::new(TorStatus::NotStarted)),
        }
    }

    /// Publish a new status
    pub async fn set(&self, status: TorStatus) {
        debug!("Tor status -> {:?}", status);
        *self.status.write().await = status;
    }

    /// Get bootstrap status
    pub async fn status(&self) -> TorStatus {
        *self.status.read().await
    }
}

impl Default for TorStatusHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TorReadiness for TorStatusHandle {
    async fn readiness_status(&self) -> String {
        self.status().await.as_readiness().to_string()
    }
}
