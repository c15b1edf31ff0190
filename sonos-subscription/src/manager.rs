//! Subscribe / renew / unsubscribe orchestration for a single device.
//!
//! The [`SubscriptionManager`] owns one [`Subscription`] and the renewal
//! timer armed for it. Subscribe and renew hold the state lock for the whole
//! exchange, so a timer-driven renewal never interleaves with a caller-driven
//! operation. Unsubscribe clears the state under the lock and releases it
//! before waiting on the device.

use async_trait::async_trait;
use futures::future::BoxFuture;
use gena_client::{GenaMethod, GenaRequest, GenaResponse, Transport};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::SubscriptionConfig;
use crate::error::{Result, SubscriptionError};
use crate::subscription::{DeviceTarget, Lease, Released, Subscription, SubscriptionSnapshot};
use crate::timeout::{format_timeout, parse_timeout};
use crate::timer::{RenewalScheduler, TokioScheduler};

/// The three-phase GENA subscription protocol
///
/// Implemented by [`SubscriptionManager`] for any [`Transport`], so code that
/// drives subscriptions can be exercised against a test double.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Open a subscription whose notifications go to `callback_url`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `callback_url` is empty (nothing is sent)
    /// - `DeviceRejected` / `Transport` if the exchange fails (state untouched)
    /// - `MalformedResponse` if the device accepted without a SID
    async fn subscribe(&self, callback_url: &str) -> Result<Lease>;

    /// Extend the active lease.
    ///
    /// # Errors
    ///
    /// - `PreconditionFailed` if there is no active subscription (nothing is sent)
    /// - `DeviceRejected` / `Transport` if the exchange fails (state untouched)
    async fn renew(&self) -> Result<Lease>;

    /// Release the active lease.
    ///
    /// Local state is cleared before the request goes out, so the subscription
    /// is gone whatever the device answers.
    ///
    /// # Errors
    ///
    /// - `PreconditionFailed` if there is no active subscription (nothing is sent)
    /// - `DeviceRejected` / `Transport` reporting the device's answer
    async fn unsubscribe(&self) -> Result<Released>;
}

/// Manages the subscription lifecycle against one device event endpoint
///
/// # Example
///
/// ```rust,ignore
/// use gena_client::HttpTransport;
/// use sonos_subscription::{DeviceTarget, EventSubscriber, SubscriptionManager};
///
/// let manager = SubscriptionManager::new(
///     HttpTransport::new()?,
///     DeviceTarget::av_transport("192.168.1.100"),
/// );
///
/// let lease = manager.subscribe("http://192.168.1.50:3400/notify").await?;
/// // ... renewals happen in the background ...
/// manager.unsubscribe().await?;
/// ```
pub struct SubscriptionManager<T: Transport + 'static> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    transport: T,
    scheduler: Arc<dyn RenewalScheduler>,
    config: SubscriptionConfig,
    state: Mutex<Subscription>,
}

impl<T: Transport + 'static> SubscriptionManager<T> {
    /// Create a manager with default configuration
    pub fn new(transport: T, target: DeviceTarget) -> Self {
        Self::build(
            transport,
            target,
            SubscriptionConfig::default(),
            Arc::new(TokioScheduler),
        )
    }

    /// Create a manager with custom configuration, renewing on the tokio timer
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `config` does not validate.
    pub fn with_config(
        transport: T,
        target: DeviceTarget,
        config: SubscriptionConfig,
    ) -> Result<Self> {
        Self::with_scheduler(transport, target, config, Arc::new(TokioScheduler))
    }

    /// Create a manager with a custom renewal scheduler
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `config` does not validate.
    pub fn with_scheduler(
        transport: T,
        target: DeviceTarget,
        config: SubscriptionConfig,
        scheduler: Arc<dyn RenewalScheduler>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(transport, target, config, scheduler))
    }

    fn build(
        transport: T,
        target: DeviceTarget,
        config: SubscriptionConfig,
        scheduler: Arc<dyn RenewalScheduler>,
    ) -> Self {
        let subscription = Subscription::new(target, config.auto_renew);
        Self {
            inner: Arc::new(Inner {
                transport,
                scheduler,
                config,
                state: Mutex::new(subscription),
            }),
        }
    }

    pub fn config(&self) -> &SubscriptionConfig {
        &self.inner.config
    }

    /// Current subscription state
    pub async fn state(&self) -> SubscriptionSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    /// Tear down locally: cancel the renewal timer and forget the lease
    /// without contacting the device. Dropping the manager does the same.
    pub async fn shutdown(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(sid) = state.clear() {
            debug!(host = %state.target().host, sid = %sid, "Dropped subscription on shutdown");
        }
    }
}

#[async_trait]
impl<T: Transport + 'static> EventSubscriber for SubscriptionManager<T> {
    async fn subscribe(&self, callback_url: &str) -> Result<Lease> {
        self.inner.subscribe(callback_url).await
    }

    async fn renew(&self) -> Result<Lease> {
        let mut state = self.inner.state.lock().await;
        self.inner.renew_locked(&mut state).await
    }

    async fn unsubscribe(&self) -> Result<Released> {
        self.inner.unsubscribe().await
    }
}

impl<T: Transport + 'static> Inner<T> {
    async fn subscribe(self: &Arc<Self>, callback_url: &str) -> Result<Lease> {
        if callback_url.trim().is_empty() {
            return Err(SubscriptionError::InvalidArgument(
                "Must specify a callback URL".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        let target = state.target().clone();

        info!(
            host = %target.host,
            callback_url,
            "Subscribing to speaker {} with callback URL {}",
            target.host,
            callback_url
        );

        let request = Self::request(GenaMethod::Subscribe, &target)
            .header("CALLBACK", format!("<{}>", callback_url))
            .header("NT", "upnp:event")
            .header("TIMEOUT", format_timeout(self.config.initial_timeout_seconds));

        let response = self.exchange(request).await?;

        let sid = response
            .headers
            .get("SID")
            .map(str::to_string)
            .ok_or_else(|| {
                SubscriptionError::MalformedResponse(
                    "Missing SID header in SUBSCRIBE response".to_string(),
                )
            })?;
        let lease_seconds = Self::granted_lease(&response);

        state.activate(callback_url, sid.clone(), lease_seconds);
        self.arm_renewal(&mut state);

        Ok(Lease { sid, lease_seconds })
    }

    async fn renew_locked(self: &Arc<Self>, state: &mut Subscription) -> Result<Lease> {
        let current_sid = state
            .sid()
            .map(str::to_string)
            .ok_or_else(SubscriptionError::no_active_subscription)?;
        let proposed = state
            .lease_seconds()
            .unwrap_or(self.config.initial_timeout_seconds);
        let target = state.target().clone();

        info!(
            host = %target.host,
            sid = %current_sid,
            timeout = proposed,
            "Renewing speaker {} with SID {} and timeout {}",
            target.host,
            current_sid,
            proposed
        );

        let request = Self::request(GenaMethod::Subscribe, &target)
            .header("SID", current_sid.clone())
            .header("TIMEOUT", format_timeout(proposed));

        let response = self.exchange(request).await?;

        // The device may rotate the SID; an absent header means it kept it
        let sid = response
            .headers
            .get("SID")
            .map(str::to_string)
            .unwrap_or(current_sid);
        let granted = Self::granted_lease(&response);

        state.refresh(sid.clone(), granted);
        self.arm_renewal(state);

        Ok(Lease {
            sid,
            lease_seconds: state.lease_seconds(),
        })
    }

    async fn unsubscribe(&self) -> Result<Released> {
        let (target, sid) = {
            let mut state = self.state.lock().await;
            let sid = state.clear().ok_or_else(SubscriptionError::no_active_subscription)?;
            (state.target().clone(), sid)
        };

        info!(
            host = %target.host,
            sid = %sid,
            "Unsubscribing speaker {} with SID {}",
            target.host,
            sid
        );

        let request = Self::request(GenaMethod::Unsubscribe, &target).header("SID", sid.clone());

        match self.exchange(request).await {
            Ok(response) => Ok(Released {
                sid,
                status: response.status,
            }),
            Err(e) => {
                warn!(host = %target.host, sid = %sid, error = %e, "Unsubscribe was not confirmed by device");
                Err(e)
            }
        }
    }

    /// Entry point of a fired renewal timer
    fn renew_on_timer(self: Arc<Self>, epoch: u64) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if !state.claim_renewal(epoch) {
                debug!("Ignoring superseded renewal timer");
                return;
            }

            let host = state.target().host.clone();
            match self.renew_locked(&mut state).await {
                Ok(lease) => info!(
                    host = %host,
                    sid = %lease.sid,
                    lease_seconds = ?lease.lease_seconds,
                    "Automatic renewal succeeded"
                ),
                Err(e) => error!(
                    host = %host,
                    error = %e,
                    "Automatic renewal failed; lease will not be renewed again"
                ),
            }
        })
    }

    /// Arm a renewal for the current lease if auto-renew is on and a
    /// non-zero lease is known
    fn arm_renewal(self: &Arc<Self>, state: &mut Subscription) {
        if !state.auto_renew() || !state.is_active() {
            return;
        }
        let lease_seconds = match state.lease_seconds() {
            Some(seconds) if seconds > 0 => seconds,
            _ => return,
        };

        let epoch = state.next_epoch();
        let weak: Weak<Self> = Arc::downgrade(self);
        let task = Box::pin(async move {
            if let Some(inner) = weak.upgrade() {
                inner.renew_on_timer(epoch).await;
            }
        });

        let delay = Duration::from_secs(u64::from(lease_seconds));
        let handle = self.scheduler.schedule_once(delay, task);
        state.arm(handle);

        debug!(
            host = %state.target().host,
            delay_seconds = lease_seconds,
            "Armed renewal timer"
        );
    }

    /// Send `request` and classify the response status
    async fn exchange(&self, request: GenaRequest) -> Result<GenaResponse> {
        let method = request.method;
        let host = request.host.clone();

        let response = self.transport.send(request).await.map_err(|e| {
            error!(host = %host, method = %method, error = %e, "GENA request failed");
            SubscriptionError::from(e)
        })?;

        self.config.classifier.check(&response)?;
        Ok(response)
    }

    fn request(method: GenaMethod, target: &DeviceTarget) -> GenaRequest {
        GenaRequest::new(method, target.host.clone(), target.port, target.event_path.clone())
    }

    /// Lease granted in the `TIMEOUT` header; unparseable values count as absent
    fn granted_lease(response: &GenaResponse) -> Option<u32> {
        let header = response.headers.get("TIMEOUT")?;
        let parsed = parse_timeout(header);
        if parsed.is_none() {
            warn!(timeout = header, "Ignoring unparseable TIMEOUT header");
        }
        parsed
    }
}
