//! Probe target and the request sent on every round.

use bytes::{BufMut, Bytes, BytesMut};
use url::Url;

use crate::error::{ProbeError, Result};
use crate::params;

/// Server and resource fetched on every round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Server host name, also sent as the `Host` header.
    pub host: String,
    /// Server TCP port.
    pub port: u16,
    /// Path (and optional query) of the requested resource.
    pub resource: String,
}

impl Default for Target {
    fn default() -> Self {
        Target::new(params::SERVER_NAME, params::PORT, params::RESOURCE)
    }
}

impl Target {
    /// Create a target from its parts.
    pub fn new(host: impl Into<String>, port: u16, resource: impl Into<String>) -> Self {
        Target {
            host: host.into(),
            port,
            resource: resource.into(),
        }
    }

    /// Parse an `http://host[:port]/path` URL.
    pub fn from_url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)?;
        if url.scheme() != "http" {
            return Err(ProbeError::UnsupportedTarget(format!(
                "scheme '{}' is not supported, use http",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| ProbeError::UnsupportedTarget(format!("{raw} has no host")))?;
        let port = url.port_or_known_default().unwrap_or(params::PORT);

        let mut resource = url.path().to_string();
        if let Some(query) = url.query() {
            resource.push('?');
            resource.push_str(query);
        }

        Ok(Target::new(host, port, resource))
    }

    /// The request message sent at the start of every round.
    pub fn request(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(32 + self.resource.len() + self.host.len());
        buf.put_slice(b"GET ");
        buf.put_slice(self.resource.as_bytes());
        buf.put_slice(b" HTTP/1.1\r\nHost: ");
        buf.put_slice(self.host.as_bytes());
        buf.put_slice(b"\r\n\r\n");
        buf.freeze()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}:{}{}", self.host, self.port, self.resource)
    }
}
