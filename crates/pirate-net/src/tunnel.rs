//! Tunnel mode selection

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Proxy used when SOCKS5 is selected without an explicit URL
pub const DEFAULT_SOCKS5_URL: &str = "socks5://localhost:1080";

/// Network tunnel mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TunnelMode {
    /// Tor (default, most private)
    #[default]
    Tor,
    /// SOCKS5 proxy
    Socks5 {
        /// Proxy URL
        url: String,
    },
    /// Direct connection (no privacy)
    Direct,
}

impl TunnelMode {
    /// SOCKS5 mode, falling back to [`DEFAULT_SOCKS5_URL`] when no URL is given
    pub fn socks5(url: Option<&str>) -> Self {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_SOCKS5_URL);
        TunnelMode::Socks5 {
            url: url.to_string(),
        }
    }

    /// Build a mode from its name plus an optional auxiliary proxy URL.
    ///
    /// Accepts `tor`, `direct`, `socks5` and the compact `socks5:<url>` form.
    /// An explicit `aux_url` wins over a URL embedded in the name.
    pub fn from_parts(mode: &str, aux_url: Option<&str>) -> Result<Self> {
        let trimmed = mode.trim();
        match trimmed.to_lowercase().as_str() {
            "tor" => Ok(TunnelMode::Tor),
            "direct" => Ok(TunnelMode::Direct),
            "socks5" | "socks" => Ok(TunnelMode::socks5(aux_url)),
            _ => match trimmed.split_once(':') {
                Some((scheme, rest)) if scheme.eq_ignore_ascii_case("socks5") => {
                    // A bare proxy URL names itself
                    let embedded = if rest.starts_with("//") { trimmed } else { rest };
                    Ok(TunnelMode::socks5(aux_url.or(Some(embedded))))
                }
                _ => Err(Error::UnknownMode(trimmed.to_string())),
            },
        }
    }

    /// Short label used at the scheduler boundary
    pub fn label(&self) -> &'static str {
        match self {
            TunnelMode::Tor => "tor",
            TunnelMode::Socks5 { .. } => "socks5",
            TunnelMode::Direct => "direct",
        }
    }

    /// Proxy URL for SOCKS5 mode
    pub fn socks5_url(&self) -> Option<&str> {
        match self {
            TunnelMode::Socks5 { url } => Some(url.as_str()),
            _ => None,
        }
    }

    /// Check if mode is privacy-preserving
    pub fn is_privacy_preserving(&self) -> bool {
        !matches!(self, TunnelMode::Direct)
    }

    /// Replace a blank SOCKS5 URL with the default
    pub(crate) fn normalized(self) -> Self {
        match self {
            TunnelMode::Socks5 { url } => TunnelMode::socks5(Some(&url)),
            other => other,
        }
    }
}

impl fmt::Display for TunnelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelMode::Socks5 { url } => write!(f, "socks5:{}", redact_socks5_url(url)),
            other => f.write_str(other.label()),
        }
    }
}

impl FromStr for TunnelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TunnelMode::from_parts(s, None)
    }
}

/// Strip credentials from a proxy URL before it is logged or displayed
pub fn redact_socks5_url(url: &str) -> String {
    if let Some(scheme_pos) = url.find("://") {
        let auth_start = scheme_pos + 3;
        if let Some(at_pos) = url[auth_start..].find('@') {
            let at_pos = auth_start + at_pos;
            let mut redacted = String::with_capacity(url.len());
            redacted.push_str(&url[..auth_start]);
            redacted.push_str("***@");
            redacted.push_str(&url[at_pos + 1..]);
            return redacted;
        }
    }
    url.to_string()
}
