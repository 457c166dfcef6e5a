//! Error types

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown tunnel mode name
    #[error("Unknown tunnel mode: {0}")]
    UnknownMode(String),

    /// Proxy URL could not be parsed
    #[error("Invalid proxy URL: {0}")]
    InvalidProxyUrl(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
