//! Classification of device HTTP status codes into GENA outcomes.

use gena_client::GenaResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, SubscriptionError};

/// Why a device refused a subscription request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// 400: the request mixed `SID` with `CALLBACK`/`NT`, or similar
    IncompatibleHeaderFields,
    /// 412: the device does not recognise the SID or callback
    PreconditionFailed,
    /// 5xx: the device cannot accept the subscription right now
    UnableToAcceptRenewal,
    /// Any other non-200 status
    HttpStatus(u16),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::IncompatibleHeaderFields => f.write_str("Incompatible header fields"),
            Rejection::PreconditionFailed => f.write_str("Precondition failed"),
            Rejection::UnableToAcceptRenewal => f.write_str("Unable to accept renewal"),
            Rejection::HttpStatus(code) => write!(f, "HTTP status code {}", code),
        }
    }
}

/// Maps HTTP status codes to [`Rejection`]s.
///
/// Only `200` is a success. Explicit mappings win; unmapped codes of 500 and
/// above fall back to [`Rejection::UnableToAcceptRenewal`], everything else
/// becomes [`Rejection::HttpStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusClassifier {
    mappings: BTreeMap<u16, Rejection>,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        let mappings = BTreeMap::from([
            (400, Rejection::IncompatibleHeaderFields),
            (412, Rejection::PreconditionFailed),
            (500, Rejection::UnableToAcceptRenewal),
        ]);
        Self { mappings }
    }
}

impl StatusClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override or add the rejection reported for `status`
    pub fn with_mapping(mut self, status: u16, rejection: Rejection) -> Self {
        self.mappings.insert(status, rejection);
        self
    }

    /// `None` for success, otherwise the rejection for `status`
    pub fn classify(&self, status: u16) -> Option<Rejection> {
        if status == 200 {
            return None;
        }

        let rejection = match self.mappings.get(&status) {
            Some(rejection) => *rejection,
            None if status >= 500 => Rejection::UnableToAcceptRenewal,
            None => Rejection::HttpStatus(status),
        };
        Some(rejection)
    }

    /// Turn a device response into `Ok(())` or a [`SubscriptionError::DeviceRejected`]
    /// carrying the status and headers for diagnostics.
    pub fn check(&self, response: &GenaResponse) -> Result<()> {
        match self.classify(response.status) {
            None => Ok(()),
            Some(rejection) => Err(SubscriptionError::DeviceRejected {
                rejection,
                status: response.status,
                headers: response.headers.clone(),
            }),
        }
    }
}
