//! Error types for the GENA client

use thiserror::Error;

/// Errors raised before any HTTP response was received from the device
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be built (bad method token, malformed URL)
    #[error("Invalid request: {0}")]
    Request(String),

    /// The device could not be reached
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The device did not answer in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other network or HTTP protocol failure
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The response head arrived but its body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if error.is_builder() {
            TransportError::Request(error.to_string())
        } else {
            TransportError::Network(error.to_string())
        }
    }
}
