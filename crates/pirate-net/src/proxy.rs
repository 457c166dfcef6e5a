//! SOCKS5 proxy endpoints and reachability probing

use crate::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Port assumed when a proxy URL omits one
pub const DEFAULT_SOCKS5_PORT: u16 = 1080;

/// Parsed SOCKS5 proxy endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct Socks5Endpoint {
    /// Proxy host
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Username (optional)
    pub username: Option<String>,
    /// Password (optional)
    pub password: Option<String>,
}

impl Socks5Endpoint {
    /// Parse a `socks5://` or `socks5h://` URL.
    ///
    /// Fails closed: anything without a usable host is rejected.
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        let uri: http::Uri = trimmed
            .parse()
            .map_err(|e| Error::InvalidProxyUrl(format!("'{}': {}", trimmed, e)))?;
        if let Some(scheme) = uri.scheme_str() {
            let scheme = scheme.to_lowercase();
            if scheme != "socks5" && scheme != "socks5h" {
                return Err(Error::InvalidProxyUrl(format!(
                    "unsupported scheme '{}'",
                    scheme
                )));
            }
        }
        let host = uri
            .host()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::InvalidProxyUrl("missing host".to_string()))?
            .to_string();
        let port = uri.port_u16().unwrap_or(DEFAULT_SOCKS5_PORT);

        let mut username = None;
        let mut password = None;
        if let Some(authority) = uri.authority() {
            if let Some((userinfo, _)) = authority.as_str().rsplit_once('@') {
                match userinfo.split_once(':') {
                    Some((user, pass)) => {
                        username = Some(user.to_string()).filter(|u| !u.is_empty());
                        password = Some(pass.to_string()).filter(|p| !p.is_empty());
                    }
                    None if !userinfo.is_empty() => username = Some(userinfo.to_string()),
                    None => {}
                }
            }
        }

        Ok(Self {
            host,
            port,
            username,
            password,
        })
    }

    /// `host:port` string
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Whether credentials are configured
    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

impl fmt::Debug for Socks5Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socks5Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth", &self.has_auth())
            .finish()
    }
}

/// Lightweight reachability check against a proxy
#[async_trait]
pub trait ProxyProbe: Send + Sync {
    /// Returns `Ok(())` when the proxy accepts connections
    async fn probe(&self, endpoint: &Socks5Endpoint) -> Result<()>;
}

/// Probe that opens (and immediately drops) a TCP connection to the proxy
#[derive(Debug, Clone)]
pub struct TcpProxyProbe {
    connect_timeout: Duration,
}

impl TcpProxyProbe {
    /// Create a probe with the given connect timeout
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpProxyProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

#[async_trait]
impl ProxyProbe for TcpProxyProbe {
    async fn probe(&self, endpoint: &Socks5Endpoint) -> Result<()> {
        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(_stream)) => {
                debug!("SOCKS5 proxy reachable at {}", endpoint.address());
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("SOCKS5 proxy not reachable at {}: {}", endpoint.address(), e);
                Err(Error::Io(e))
            }
            Err(_) => Err(Error::Connection(format!(
                "SOCKS5 proxy at {} did not answer within {:?}",
                endpoint.address(),
                self.connect_timeout
            ))),
        }
    }
}
