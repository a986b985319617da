// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Minimum-spacing request pacing.
//!
//! Public explorers and RPC gateways throttle by request rate rather than by
//! burst size, so instead of a token bucket every outbound request waits until
//! at least `min_interval` has passed since the previous one started. The same
//! [`RequestPacer`] can be shared by the explorer client and the RPC transport
//! so that both count against one budget.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use tokio::sync::Mutex;
use tokio::time::Instant;
use tower::Layer;

/// Spaces request starts by at least `min_interval`.
///
/// Cloning is cheap and clones share the same schedule.
#[derive(Clone, Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// A pacer that never waits.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for this caller's slot.
    ///
    /// Slots are reserved under the lock and slept on outside it, so
    /// concurrent callers queue up one interval apart instead of all waking at
    /// the same instant.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next_slot = Some(slot + self.min_interval);
            slot
        };

        tokio::time::sleep_until(slot).await;
    }
}

/// A Tower layer that paces requests through a [`RequestPacer`].
///
/// # Example
///
/// ```rust,ignore
/// use holdscan::transport::{PaceLayer, RequestPacer};
/// use alloy_rpc_client::ClientBuilder;
/// use std::time::Duration;
///
/// let pacer = RequestPacer::new(Duration::from_millis(120));
/// let client = ClientBuilder::default()
///     .layer(PaceLayer::new(pacer.clone()))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct PaceLayer {
    pacer: RequestPacer,
}

impl PaceLayer {
    pub fn new(pacer: RequestPacer) -> Self {
        Self { pacer }
    }
}

impl<S> Layer<S> for PaceLayer {
    type Service = PaceService<S>;

    fn layer(&self, service: S) -> Self::Service {
        PaceService {
            service,
            pacer: self.pacer.clone(),
        }
    }
}

/// A Tower service that waits for a pacing slot before each request.
#[derive(Clone, Debug)]
pub struct PaceService<S> {
    service: S,
    pacer: RequestPacer,
}

impl<S, Request> tower::Service<Request> for PaceService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let pacer = self.pacer.clone();
        let mut service = self.service.clone();

        Box::pin(async move {
            pacer.wait().await;
            service.call(request).await
        })
    }
}
