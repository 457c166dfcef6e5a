//! Background sync configuration
//!
//! Built once at startup, from defaults or persisted settings, and read-only
//! afterwards. Scheduling fields are plain data for the platform scheduler;
//! nothing here schedules work itself.

use crate::error::{Result, SyncError};
use crate::session::{SyncMode, SyncResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Background sync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSyncConfig {
    /// Compact sync interval (minutes)
    pub compact_interval_mins: u32,
    /// Deep sync interval (hours)
    pub deep_interval_hours: u32,
    /// Maximum compact sync duration (seconds)
    pub compact_max_duration_secs: u64,
    /// Maximum deep sync duration (seconds)
    pub deep_max_duration_secs: u64,
    /// Slack past the max duration before an executor call is cancelled (seconds)
    pub grace_secs: u64,
    /// Upper bound for tunnel verification (seconds)
    pub verify_timeout_secs: u64,
    /// Use foreground service for long operations
    pub use_foreground_service: bool,
    /// Notify on received funds
    pub notify_on_receive: bool,
    /// Only run deep sync while charging
    pub deep_requires_charging: bool,
    /// Only run deep sync on an unmetered network
    pub deep_requires_unmetered_network: bool,
}

impl Default for BackgroundSyncConfig {
    fn default() -> Self {
        Self {
            compact_interval_mins: 15,
            deep_interval_hours: 24,
            compact_max_duration_secs: 60, // 1 minute max per background task
            deep_max_duration_secs: 120,
            grace_secs: 5,
            verify_timeout_secs: 5,
            use_foreground_service: true,
            notify_on_receive: true,
            deep_requires_charging: true,
            deep_requires_unmetered_network: true,
        }
    }
}

/// What the platform scheduler should register for one sync mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Mode to pass back on invocation
    pub mode: SyncMode,
    /// Repeat interval
    pub interval: Duration,
    /// Time budget per invocation
    pub max_duration: Duration,
    /// Require the device to be charging
    pub requires_charging: bool,
    /// Require an unmetered network
    pub requires_unmetered_network: bool,
    /// Show a foreground service / notification while running
    pub requires_foreground_service: bool,
    /// Notify the user when a run finds new transactions
    pub notify_on_receive: bool,
}

impl BackgroundSyncConfig {
    /// Load from persisted JSON settings; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SyncError::SyncFailed(format!("invalid background sync settings: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize for persistence
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SyncError::SyncFailed(format!("failed to encode settings: {}", e)))
    }

    /// Reject zero intervals and budgets
    pub fn validate(&self) -> Result<()> {
        let zero = [
            ("compact_interval_mins", self.compact_interval_mins == 0),
            ("deep_interval_hours", self.deep_interval_hours == 0),
            ("compact_max_duration_secs", self.compact_max_duration_secs == 0),
            ("deep_max_duration_secs", self.deep_max_duration_secs == 0),
            ("verify_timeout_secs", self.verify_timeout_secs == 0),
        ];
        if let Some((field, _)) = zero.iter().find(|(_, is_zero)| *is_zero) {
            return Err(SyncError::SyncFailed(format!(
                "invalid background sync settings: {} must be non-zero",
                field
            )));
        }
        Ok(())
    }

    /// Maximum duration for a sync in the given mode
    pub fn max_duration_for(&self, mode: SyncMode) -> Duration {
        match mode {
            SyncMode::Compact => Duration::from_secs(self.compact_max_duration_secs),
            SyncMode::Deep => Duration::from_secs(self.deep_max_duration_secs),
        }
    }

    /// Grace margin on top of the max duration
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    /// Tunnel verification timeout
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }

    /// Get recommended sync mode based on time since last sync
    pub fn recommend_sync_mode(&self, minutes_since_last: u32) -> SyncMode {
        if u64::from(minutes_since_last) >= u64::from(self.deep_interval_hours) * 60 {
            SyncMode::Deep
        } else {
            SyncMode::Compact
        }
    }

    /// Whether a finished run should raise a "funds received" notification
    pub fn should_notify(&self, result: &SyncResult) -> bool {
        self.notify_on_receive && result.new_transactions > 0
    }

    /// Scheduler registration for a mode
    pub fn schedule_for(&self, mode: SyncMode) -> ScheduleRequest {
        match mode {
            SyncMode::Compact => ScheduleRequest {
                mode,
                interval: Duration::from_secs(u64::from(self.compact_interval_mins) * 60),
                max_duration: self.max_duration_for(mode),
                requires_charging: false,
                requires_unmetered_network: false,
                requires_foreground_service: false,
                notify_on_receive: self.notify_on_receive,
            },
            SyncMode::Deep => ScheduleRequest {
                mode,
                interval: Duration::from_secs(u64::from(self.deep_interval_hours) * 3600),
                max_duration: self.max_duration_for(mode),
                requires_charging: self.deep_requires_charging,
                requires_unmetered_network: self.deep_requires_unmetered_network,
                requires_foreground_service: self.use_foreground_service,
                notify_on_receive: self.notify_on_receive,
            },
        }
    }

    /// Registrations for both modes, compact first
    pub fn schedules(&self) -> Vec<ScheduleRequest> {
        vec![
            self.schedule_for(SyncMode::Compact),
            self.schedule_for(SyncMode::Deep),
        ]
    }
}
