use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("could not resolve {host}: {source}")]
    Resolve {
        host: String,
        source: std::io::Error,
    },
    #[error("no addresses found for {0}")]
    NoAddress(String),
    #[error("could not connect to {addrs:?}: {source}")]
    Connect {
        addrs: Vec<SocketAddr>,
        source: std::io::Error,
    },
    #[error("error while sending request: {0}")]
    Send(std::io::Error),
    #[error("error while reading response: {0}")]
    Read(std::io::Error),
    #[error("connection closed by server")]
    ConnectionClosed,
    #[error("bad target URL: {0}")]
    BadTarget(#[from] url::ParseError),
    #[error("unsupported target URL: {0}")]
    UnsupportedTarget(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("serialize/deserialize error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
