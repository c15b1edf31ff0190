//! Request and response types exchanged with a UPnP event endpoint

use bytes::Bytes;
use serde::Serialize;
use std::fmt;

/// HTTP methods used by GENA eventing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GenaMethod {
    /// Create or renew a subscription
    Subscribe,
    /// Release a subscription
    Unsubscribe,
}

impl GenaMethod {
    /// The method token as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            GenaMethod::Subscribe => "SUBSCRIBE",
            GenaMethod::Unsubscribe => "UNSUBSCRIBE",
        }
    }
}

impl fmt::Display for GenaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered HTTP header list with case-insensitive lookup
///
/// UPnP devices are inconsistent about header casing (`SID` vs `sid`), so
/// lookups ignore case while iteration preserves what was received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any existing value with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
            first = false;
        }
        Ok(())
    }
}

/// A bodiless GENA request aimed at one device event endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenaRequest {
    pub method: GenaMethod,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub headers: Headers,
}

impl GenaRequest {
    pub fn new(method: GenaMethod, host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            port,
            path: path.into(),
            headers: Headers::new(),
        }
    }

    /// Builder-style header append
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Full request URL, e.g. `http://192.168.1.100:1400/MediaRenderer/AVTransport/Event`
    pub fn url(&self) -> String {
        let path = self.path.trim_start_matches('/');
        format!("http://{}:{}/{}", self.host, self.port, path)
    }
}

/// Status line, headers and body returned by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenaResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl GenaResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Builder-style header append
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}
