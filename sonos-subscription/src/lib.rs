//! # sonos-subscription
//!
//! UPnP (GENA) event subscription lifecycle management for Sonos speakers.
//!
//! A [`SubscriptionManager`] drives the subscribe / renew / unsubscribe
//! handshake against one device event endpoint and keeps the lease alive with
//! a cancellable renewal timer. Network I/O goes through the
//! [`gena_client::Transport`] capability, so tests can substitute a double.
//!
//! ```rust,ignore
//! use gena_client::HttpTransport;
//! use sonos_subscription::{DeviceTarget, EventSubscriber, SubscriptionManager};
//!
//! let manager = SubscriptionManager::new(
//!     HttpTransport::new()?,
//!     DeviceTarget::av_transport("192.168.1.100"),
//! );
//! let lease = manager.subscribe("http://192.168.1.50:3400/notify").await?;
//! println!("subscribed as {} for {:?}s", lease.sid, lease.lease_seconds);
//! ```

mod config;
mod error;
pub mod logging;
mod manager;
mod status;
mod subscription;
pub mod timeout;
pub mod timer;

pub use config::{SubscriptionConfig, DEFAULT_TIMEOUT_SECONDS};
pub use error::{Result, SubscriptionError};
pub use manager::{EventSubscriber, SubscriptionManager};
pub use status::{Rejection, StatusClassifier};
pub use subscription::{
    DeviceTarget, Lease, Released, Subscription, SubscriptionSnapshot, AV_TRANSPORT_EVENT_PATH,
    DEFAULT_SPEAKER_PORT,
};
pub use timer::{RenewalHandle, RenewalScheduler, RenewalTask, TokioScheduler};
