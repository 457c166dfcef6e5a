//! Background invocation gateway
//!
//! The one surface a platform scheduler (Android WorkManager, iOS BGTask)
//! talks to: it decodes the invocation's argument bag, resolves which
//! wallet(s) to sync, and reports back a flat string map or a coded error.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod args;
pub mod error;
pub mod gateway;
pub mod registry;

pub use args::BackgroundSyncArgs;
pub use error::{GatewayError, Result};
pub use gateway::{BackgroundSyncGateway, LastOutcome};
pub use registry::{InMemoryWalletRegistry, WalletRegistry};

pub use pirate_sync_background::{
    BackgroundSyncConfig, CancelToken, ScheduleRequest, SyncExecutor, SyncMode, SyncReport,
};
