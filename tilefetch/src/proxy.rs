//! HTTP proxy given as a `host:port` string.

use log::{debug, warn};

/// Address of an HTTP proxy all tile requests are sent through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    host: String,
    port: u16,
}

impl ProxySettings {
    /// Creates new settings.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses a `host:port` string.
    ///
    /// Returns `None` (meaning that the default transport configuration should be used) if the
    /// string doesn't consist of exactly two `:`-separated fields, the host is empty or the port
    /// is not a non-zero 16-bit number.
    pub fn parse(address: &str) -> Option<Self> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }

        let fields: Vec<&str> = address.split(':').collect();
        let [host, port] = fields.as_slice() else {
            warn!("Proxy {address:?} is not in host:port format, proxy disabled");
            return None;
        };

        if host.is_empty() {
            warn!("Proxy {address:?} has no host, proxy disabled");
            return None;
        }

        match port.parse::<u16>() {
            Ok(port) if port != 0 => {
                debug!("Proxy initialized to {host}:{port}");
                Some(Self::new(*host, port))
            }
            _ => {
                warn!("Proxy {address:?} has invalid port, proxy disabled");
                None
            }
        }
    }

    /// Proxy host name.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Proxy port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Proxy url in the form accepted by the HTTP client.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub(crate) fn to_reqwest(&self) -> reqwest::Result<reqwest::Proxy> {
        reqwest::Proxy::all(self.url())
    }
}
