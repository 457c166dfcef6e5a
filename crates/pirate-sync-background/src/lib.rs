//! Background sync orchestration
//!
//! Runs time-boxed, cancellable wallet syncs on behalf of an OS background
//! scheduler: one wallet per session, or round-robin across many wallets
//! under a shared budget. The chain scanning itself is delegated to a
//! [`SyncExecutor`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cancel;
pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod guard;
pub mod round_robin;
pub mod runner;
pub mod session;

pub use cancel::CancelToken;
pub use classify::classify;
pub use config::{BackgroundSyncConfig, ScheduleRequest};
pub use error::{Result, SyncError, SyncErrorKind};
pub use events::{init_logging, log_notification};
pub use executor::{SyncExecutor, SyncReport};
pub use guard::{SyncGuard, SyncPermit};
pub use round_robin::{
    order_candidates, RoundRobinCoordinator, RoundRobinResult, WalletActivity, WalletRun,
    WARM_WALLET_WINDOW_SECS,
};
pub use runner::{SessionRequest, SessionRunner, DEFAULT_GRACE};
pub use session::{SessionTarget, SyncMode, SyncResult, SyncSession};

pub use pirate_net::{TunnelMode, TunnelSelector};
