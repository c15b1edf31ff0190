//! Configuration types for the sonos-subscription crate
//!
//! Values here are fixed when a [`SubscriptionManager`](crate::SubscriptionManager)
//! is constructed; nothing is read from process-wide state afterwards.

use serde::Deserialize;

use crate::error::{Result, SubscriptionError};
use crate::status::StatusClassifier;

/// Lease length proposed on the initial `SUBSCRIBE`, in seconds (12 hours)
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 43200;

/// Configuration for a SubscriptionManager
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Renew the lease in the background when it runs out
    /// Default: true
    pub auto_renew: bool,

    /// Lease proposed with the initial SUBSCRIBE, and with renewals when the
    /// device never granted one
    /// Default: 43200 seconds (12 hours)
    pub initial_timeout_seconds: u32,

    /// Status code table used to classify device responses
    #[serde(skip)]
    pub classifier: StatusClassifier,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            auto_renew: true,
            initial_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            classifier: StatusClassifier::default(),
        }
    }
}

impl SubscriptionConfig {
    /// Create a new SubscriptionConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.initial_timeout_seconds == 0 {
            return Err(SubscriptionError::Configuration(
                "Initial timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_auto_renew(mut self, enabled: bool) -> Self {
        self.auto_renew = enabled;
        self
    }

    pub fn with_initial_timeout(mut self, seconds: u32) -> Self {
        self.initial_timeout_seconds = seconds;
        self
    }

    pub fn with_classifier(mut self, classifier: StatusClassifier) -> Self {
        self.classifier = classifier;
        self
    }
}
