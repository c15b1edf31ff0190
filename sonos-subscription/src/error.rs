//! Error types for the sonos-subscription crate.

use gena_client::{Headers, TransportError};

use crate::status::Rejection;

/// Errors returned by subscription operations.
///
/// `PreconditionFailed` is raised locally, before any request is sent. A
/// device answering `412` is reported as `DeviceRejected` with
/// [`Rejection::PreconditionFailed`] instead, so the two never collide.
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    /// A caller-supplied argument was missing or empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation needs an active subscription and there is none
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The device answered with a non-200 status
    #[error("Device rejected request: {rejection} (HTTP {status})")]
    DeviceRejected {
        /// Classified reason
        rejection: Rejection,
        /// Literal status code
        status: u16,
        /// Response headers, kept for diagnostics
        headers: Headers,
    },

    /// No HTTP response was received
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The device accepted the request but the response is unusable
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SubscriptionError {
    /// Local precondition failure for renew/unsubscribe without a SID
    pub fn no_active_subscription() -> Self {
        Self::PreconditionFailed("no active subscription".to_string())
    }

    /// The device's rejection reason, if the device rejected the request
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::DeviceRejected { rejection, .. } => Some(*rejection),
            _ => None,
        }
    }

    /// HTTP status of a device rejection
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::DeviceRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error was raised without talking to the device
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::PreconditionFailed(_) | Self::Configuration(_)
        )
    }
}

/// Convenience type alias for Results using SubscriptionError.
pub type Result<T> = std::result::Result<T, SubscriptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_error_display() {
        let error = SubscriptionError::InvalidArgument("callback URL must not be empty".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid argument: callback URL must not be empty"
        );

        let error = SubscriptionError::no_active_subscription();
        assert_eq!(error.to_string(), "Precondition failed: no active subscription");

        let error = SubscriptionError::DeviceRejected {
            rejection: Rejection::UnableToAcceptRenewal,
            status: 503,
            headers: Headers::new(),
        };
        assert_eq!(
            error.to_string(),
            "Device rejected request: Unable to accept renewal (HTTP 503)"
        );

        let error = SubscriptionError::MalformedResponse("missing SID header".to_string());
        assert_eq!(error.to_string(), "Malformed response: missing SID header");
    }

    #[test]
    fn test_error_conversion_from_transport_error() {
        let transport_error = TransportError::Connect("connection refused".to_string());
        let error: SubscriptionError = transport_error.into();

        match error {
            SubscriptionError::Transport(e) => {
                assert_eq!(e.to_string(), "Connection failed: connection refused");
            }
            _ => panic!("Expected Transport variant"),
        }
    }

    #[test]
    fn test_local_and_device_preconditions_are_distinct() {
        let local = SubscriptionError::no_active_subscription();
        let device = SubscriptionError::DeviceRejected {
            rejection: Rejection::PreconditionFailed,
            status: 412,
            headers: Headers::new(),
        };

        assert!(local.is_local());
        assert_eq!(local.rejection(), None);
        assert!(!device.is_local());
        assert_eq!(device.rejection(), Some(Rejection::PreconditionFailed));
        assert_eq!(device.status_code(), Some(412));
    }
}
