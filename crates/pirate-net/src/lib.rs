//! Network path selection for background sync
//!
//! Holds the process-wide tunnel selection (Tor, SOCKS5 proxy or direct)
//! and verifies that the selected path is usable before a sync session
//! trusts it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod proxy;
pub mod selector;
pub mod tor;
pub mod tunnel;

// Re-export main types
pub use error::{Error, Result};
pub use proxy::{ProxyProbe, Socks5Endpoint, TcpProxyProbe};
pub use selector::{TunnelSelector, TunnelVerification, DEFAULT_VERIFY_TIMEOUT};
pub use tor::{TorReadiness, TorStatus, TorStatusHandle, TOR_READY};
pub use tunnel::{redact_socks5_url, TunnelMode, DEFAULT_SOCKS5_URL};
