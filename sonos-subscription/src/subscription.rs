//! Subscription state for one device event endpoint.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::timer::RenewalHandle;

/// Standard Sonos UPnP port
pub const DEFAULT_SPEAKER_PORT: u16 = 1400;

/// Event endpoint of the AVTransport service, which carries playback state
pub const AV_TRANSPORT_EVENT_PATH: &str = "/MediaRenderer/AVTransport/Event";

/// Device address and event endpoint a subscription talks to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceTarget {
    pub host: String,
    pub port: u16,
    pub event_path: String,
}

impl DeviceTarget {
    pub fn new(host: impl Into<String>, port: u16, event_path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            event_path: event_path.into(),
        }
    }

    /// AVTransport events of a speaker on the standard port
    pub fn av_transport(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_SPEAKER_PORT, AV_TRANSPORT_EVENT_PATH)
    }
}

/// Lease granted by a successful subscribe or renew
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lease {
    pub sid: String,
    /// `None` when the device sent no usable `TIMEOUT` header
    pub lease_seconds: Option<u32>,
}

/// Outcome of an unsubscribe the device confirmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Released {
    pub sid: String,
    pub status: u16,
}

/// Read-only view of a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionSnapshot {
    pub target: DeviceTarget,
    pub callback_url: Option<String>,
    pub sid: Option<String>,
    pub lease_seconds: Option<u32>,
    pub auto_renew: bool,
    /// Delay of the armed renewal timer, if any
    pub renewal_delay: Option<Duration>,
}

impl SubscriptionSnapshot {
    pub fn is_active(&self) -> bool {
        self.sid.is_some()
    }
}

/// One lease with a device.
///
/// `sid` is present exactly while a lease is believed active, and a renewal
/// handle only exists alongside a `sid` with `auto_renew` enabled. Every arm
/// or clear bumps `epoch`; a fired timer may only act if its epoch is current.
#[derive(Debug)]
pub struct Subscription {
    target: DeviceTarget,
    callback_url: Option<String>,
    sid: Option<String>,
    lease_seconds: Option<u32>,
    auto_renew: bool,
    renewal: Option<RenewalHandle>,
    epoch: u64,
}

impl Subscription {
    pub fn new(target: DeviceTarget, auto_renew: bool) -> Self {
        Self {
            target,
            callback_url: None,
            sid: None,
            lease_seconds: None,
            auto_renew,
            renewal: None,
            epoch: 0,
        }
    }

    pub fn target(&self) -> &DeviceTarget {
        &self.target
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn lease_seconds(&self) -> Option<u32> {
        self.lease_seconds
    }

    pub fn auto_renew(&self) -> bool {
        self.auto_renew
    }

    pub fn is_active(&self) -> bool {
        self.sid.is_some()
    }

    pub fn renewal_delay(&self) -> Option<Duration> {
        self.renewal.as_ref().map(RenewalHandle::delay)
    }

    pub fn snapshot(&self) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            target: self.target.clone(),
            callback_url: self.callback_url.clone(),
            sid: self.sid.clone(),
            lease_seconds: self.lease_seconds,
            auto_renew: self.auto_renew,
            renewal_delay: self.renewal_delay(),
        }
    }

    /// Record a fresh lease from an initial subscribe, dropping any previous one
    pub(crate) fn activate(&mut self, callback_url: &str, sid: String, lease_seconds: Option<u32>) {
        self.cancel_renewal();
        self.callback_url = Some(callback_url.to_string());
        self.sid = Some(sid);
        self.lease_seconds = lease_seconds;
    }

    /// Update the lease after a successful renewal
    pub(crate) fn refresh(&mut self, sid: String, lease_seconds: Option<u32>) {
        self.cancel_renewal();
        self.sid = Some(sid);
        if lease_seconds.is_some() {
            self.lease_seconds = lease_seconds;
        }
    }

    /// Drop the lease and cancel any pending renewal. Returns the released SID.
    pub(crate) fn clear(&mut self) -> Option<String> {
        self.cancel_renewal();
        self.lease_seconds = None;
        self.sid.take()
    }

    /// Epoch the next armed renewal will carry
    pub(crate) fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Store the handle of a renewal armed with the current epoch
    pub(crate) fn arm(&mut self, handle: RenewalHandle) {
        debug_assert!(self.auto_renew && self.sid.is_some());
        self.renewal = Some(handle);
    }

    /// Called by a fired renewal task. Returns `false` if the timer was
    /// superseded or cancelled in the meantime.
    pub(crate) fn claim_renewal(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.sid.is_none() {
            return false;
        }
        match self.renewal.take() {
            Some(handle) => {
                handle.disarm();
                true
            }
            None => false,
        }
    }

    fn cancel_renewal(&mut self) {
        self.epoch += 1;
        if let Some(handle) = self.renewal.take() {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handle(counter: &Arc<AtomicUsize>, delay: u64) -> RenewalHandle {
        let counter = counter.clone();
        RenewalHandle::new(Duration::from_secs(delay), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_new_subscription_is_empty() {
        let subscription = Subscription::new(DeviceTarget::av_transport("192.168.1.100"), true);

        assert_eq!(subscription.sid(), None);
        assert_eq!(subscription.lease_seconds(), None);
        assert_eq!(subscription.renewal_delay(), None);
        assert!(!subscription.is_active());
        assert_eq!(subscription.target().port, 1400);
        assert_eq!(
            subscription.target().event_path,
            "/MediaRenderer/AVTransport/Event"
        );
    }

    #[test]
    fn test_activate_and_clear() {
        let cancels = Arc::new(AtomicUsize::new(0));
        let mut subscription = Subscription::new(DeviceTarget::av_transport("192.168.1.100"), true);

        subscription.activate("http://192.168.1.50:3400/notify", "uuid:1".to_string(), Some(1800));
        let epoch = subscription.next_epoch();
        subscription.arm(counting_handle(&cancels, 1800));

        assert!(subscription.is_active());
        assert_eq!(subscription.callback_url(), Some("http://192.168.1.50:3400/notify"));
        assert_eq!(subscription.renewal_delay(), Some(Duration::from_secs(1800)));

        assert_eq!(subscription.clear(), Some("uuid:1".to_string()));
        assert_eq!(subscription.sid(), None);
        assert_eq!(subscription.lease_seconds(), None);
        assert_eq!(subscription.renewal_delay(), None);
        assert_eq!(cancels.load(Ordering::SeqCst), 1);

        // A timer armed before the clear can no longer claim the renewal
        assert!(!subscription.claim_renewal(epoch));
    }

    #[test]
    fn test_refresh_keeps_previous_lease_when_none_granted() {
        let mut subscription = Subscription::new(DeviceTarget::av_transport("192.168.1.100"), true);
        subscription.activate("http://cb", "uuid:1".to_string(), Some(1800));

        subscription.refresh("uuid:2".to_string(), None);
        assert_eq!(subscription.sid(), Some("uuid:2"));
        assert_eq!(subscription.lease_seconds(), Some(1800));

        subscription.refresh("uuid:2".to_string(), Some(600));
        assert_eq!(subscription.lease_seconds(), Some(600));
    }

    #[test]
    fn test_claim_renewal_disarms_without_cancelling() {
        let cancels = Arc::new(AtomicUsize::new(0));
        let mut subscription = Subscription::new(DeviceTarget::av_transport("192.168.1.100"), true);
        subscription.activate("http://cb", "uuid:1".to_string(), Some(60));

        let epoch = subscription.next_epoch();
        subscription.arm(counting_handle(&cancels, 60));

        assert!(subscription.claim_renewal(epoch));
        assert_eq!(subscription.renewal_delay(), None);
        assert_eq!(cancels.load(Ordering::SeqCst), 0);

        // Second claim for the same firing is refused
        assert!(!subscription.claim_renewal(epoch));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut subscription = Subscription::new(DeviceTarget::new("10.0.0.5", 1400, "/Event"), false);
        subscription.activate("http://cb", "uuid:abc".to_string(), None);

        let snapshot = subscription.snapshot();
        assert!(snapshot.is_active());
        assert!(!snapshot.auto_renew);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["sid"], "uuid:abc");
        assert_eq!(json["target"]["host"], "10.0.0.5");
        assert!(json["lease_seconds"].is_null());
    }
}
