//! Test doubles for driving a SubscriptionManager without a network.
//!
//! - `MockTransport` records every request and answers from a script
//! - `ManualScheduler` captures renewal tasks so tests decide when they fire

#![allow(dead_code)]

use async_trait::async_trait;
use gena_client::{GenaRequest, GenaResponse, Transport, TransportError};
use sonos_subscription::{DeviceTarget, RenewalHandle, RenewalScheduler, RenewalTask};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CALLBACK_URL: &str = "http://192.168.1.50:3400/notify";

pub fn speaker() -> DeviceTarget {
    DeviceTarget::new("192.168.1.100", 1400, "/MediaRenderer/AVTransport/Event")
}

/// 200 response granting `sid` for `seconds`
pub fn granted(sid: &str, seconds: u32) -> GenaResponse {
    GenaResponse::new(200)
        .with_header("SID", sid)
        .with_header("TIMEOUT", format!("Second-{}", seconds))
}

/// Transport that records requests and replays scripted outcomes.
///
/// When the script runs dry every request gets a bare `200 OK`.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<GenaResponse, TransportError>>>,
    requests: Mutex<Vec<GenaRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_response(&self, response: GenaResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<GenaRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: GenaRequest) -> Result<GenaResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenaResponse::new(200)))
    }
}

/// Scheduler whose tasks only run when the test fires them.
///
/// Cancelling a handle does nothing, which models a timer that has already
/// fired by the time the subscription is torn down.
#[derive(Default)]
pub struct ManualScheduler {
    pending: Mutex<Vec<(Duration, RenewalTask)>>,
}

impl ManualScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.pending.lock().unwrap().iter().map(|(d, _)| *d).collect()
    }

    /// Run every captured task to completion
    pub async fn fire_all(&self) {
        let tasks: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        for (_, task) in tasks {
            task.await;
        }
    }
}

impl RenewalScheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: RenewalTask) -> RenewalHandle {
        self.pending.lock().unwrap().push((delay, task));
        RenewalHandle::new(delay, || {})
    }
}
