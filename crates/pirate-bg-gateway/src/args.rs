//! Invocation argument bag

use crate::error::{GatewayError, Result};
use pirate_net::TunnelMode;
use pirate_sync_background::SyncMode;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Arguments passed by the platform scheduler.
///
/// Every field is optional. Unknown keys are ignored so older schedulers
/// keep working against newer builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundSyncArgs {
    /// Wallet to sync; falls back to the active wallet
    pub wallet_id: Option<String>,
    /// `compact` or `deep`
    pub mode: Option<String>,
    /// Time budget in seconds
    pub max_duration_secs: Option<u64>,
    /// Sync every known wallet under one budget
    pub use_round_robin: bool,
    /// `tor`, `socks5` or `direct`; Tor when absent
    pub tunnel_mode: Option<String>,
    /// Proxy URL for `socks5`
    pub socks5_url: Option<String>,
}

impl BackgroundSyncArgs {
    /// Decode from a JSON value. `null` means all defaults.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => Self::deserialize(value)
                .map_err(|e| GatewayError::invalid_args(format!("invalid sync arguments: {}", e))),
            other => Err(GatewayError::invalid_args(format!(
                "sync arguments must be an object, got {}",
                other
            ))),
        }
    }

    /// Decode from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| GatewayError::invalid_args(format!("invalid sync arguments: {}", e)))?;
        Self::from_value(&value)
    }

    /// Requested wallet id, if non-blank
    pub fn wallet_id(&self) -> Option<&str> {
        self.wallet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Requested sync mode, compact unless `deep`
    pub fn sync_mode(&self) -> SyncMode {
        self.mode.as_deref().map(SyncMode::from).unwrap_or_default()
    }

    /// Tunnel to run under.
    ///
    /// A missing `tunnelMode` means Tor, never the foreground's selection, so
    /// a scheduler invocation cannot silently inherit a direct connection.
    /// Unrecognised modes fail closed to Tor as well.
    pub fn tunnel_mode(&self) -> TunnelMode {
        let mode = self.tunnel_mode.as_deref().unwrap_or("tor");
        match TunnelMode::from_parts(mode, self.socks5_url.as_deref()) {
            Ok(tunnel) => tunnel,
            Err(e) => {
                warn!("Ignoring tunnel mode from scheduler ({}), using tor", e);
                TunnelMode::Tor
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let args = BackgroundSyncArgs::from_value(&json!({})).unwrap();
        assert_eq!(args, BackgroundSyncArgs::default());
        assert_eq!(args.sync_mode(), SyncMode::Compact);
        assert_eq!(args.wallet_id(), None);
        assert_eq!(args.tunnel_mode(), TunnelMode::Tor);
        assert!(!args.use_round_robin);

        assert_eq!(
            BackgroundSyncArgs::from_value(&Value::Null).unwrap(),
            BackgroundSyncArgs::default()
        );
    }

    #[test]
    fn test_camel_case_fields() {
        let args = BackgroundSyncArgs::from_json(
            r#"{"walletId":" w1 ","mode":"DEEP","maxDurationSecs":90,"useRoundRobin":true,
                "tunnelMode":"socks5","socks5Url":"socks5://10.0.0.2:9050","extra":1}"#,
        )
        .unwrap();
        assert_eq!(args.wallet_id(), Some("w1"));
        assert_eq!(args.sync_mode(), SyncMode::Deep);
        assert_eq!(args.max_duration_secs, Some(90));
        assert!(args.use_round_robin);
        assert_eq!(
            args.tunnel_mode(),
            TunnelMode::Socks5 {
                url: "socks5://10.0.0.2:9050".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_tunnel_fails_closed() {
        let args = BackgroundSyncArgs::from_value(&json!({ "tunnelMode": "carrier-pigeon" })).unwrap();
        assert_eq!(args.tunnel_mode(), TunnelMode::Tor);
    }

    #[test]
    fn test_malformed_args_are_sync_failed() {
        let err = BackgroundSyncArgs::from_value(&json!([1, 2])).unwrap_err();
        assert_eq!(err.code, "SYNC_FAILED");

        let err = BackgroundSyncArgs::from_value(&json!({ "maxDurationSecs": "soon" })).unwrap_err();
        assert_eq!(err.code, "SYNC_FAILED");

        let err = BackgroundSyncArgs::from_json("{not json").unwrap_err();
        assert_eq!(err.code, "SYNC_FAILED");
    }
}
