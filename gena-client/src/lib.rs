//! Private GENA client for UPnP event subscriptions
//!
//! This crate provides the transport seam used by the subscription manager:
//! a [`Transport`] capability that performs one bodiless `SUBSCRIBE` or
//! `UNSUBSCRIBE` exchange, and [`HttpTransport`], its implementation over an
//! async `reqwest` client. Status codes are returned untouched; deciding what
//! a non-200 means is left to the caller.

mod error;
mod message;

pub use error::TransportError;
pub use message::{GenaMethod, GenaRequest, GenaResponse, Headers};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A request/response exchange with a UPnP device
///
/// Implementations return `Ok` for any HTTP response, whatever its status,
/// and `Err` only when no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: GenaRequest) -> Result<GenaResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: GenaRequest) -> Result<GenaResponse, TransportError> {
        (**self).send(request).await
    }
}

/// HTTP transport for UPnP event endpoints
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a 5 second connect and 10 second request timeout
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    pub fn with_timeouts(connect: Duration, request: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect)
            .timeout(request)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: GenaRequest) -> Result<GenaResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let url = request.url();

        tracing::debug!(method = %request.method, url = %url, "Sending GENA request");

        let mut builder = self.client.request(method, &url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        tracing::debug!(status, url = %url, "Received GENA response");

        Ok(GenaResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTransport(u16);

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(&self, _request: GenaRequest) -> Result<GenaResponse, TransportError> {
            Ok(GenaResponse::new(self.0))
        }
    }

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new();
        assert!(transport.is_ok());

        let transport = HttpTransport::with_timeouts(Duration::from_millis(500), Duration::from_secs(1));
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_shared_transport_delegates() {
        let transport = Arc::new(FixedTransport(412));
        let request = GenaRequest::new(GenaMethod::Unsubscribe, "10.0.0.2", 1400, "/Event");

        let response = transport.send(request).await.unwrap();
        assert_eq!(response.status, 412);
    }
}
