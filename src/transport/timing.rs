//! Connect-time measurement for the reqwest connector stack.
//!
//! reqwest reports no per-request connection timings, so the client
//! installs [`ConnectTimerLayer`] around its connector. Every new
//! connection records how long it took to establish into a shared slot
//! that the client drains after the response arrives. A request served
//! from a pooled connection never reaches the connector, leaving the
//! slot empty, which reads as a zero connect time.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tower::{Layer, Service};

/// Shared slot holding the most recent connect duration.
#[derive(Debug, Clone, Default)]
pub struct ConnectSlot {
    inner: Arc<Mutex<Option<Duration>>>,
}

impl ConnectSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears any previously recorded duration.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    /// Records a connect duration, replacing any previous value.
    pub fn record(&self, elapsed: Duration) {
        *self.lock() = Some(elapsed);
    }

    /// Takes the recorded duration, or zero if nothing connected.
    #[must_use]
    pub fn take(&self) -> Duration {
        self.lock().take().unwrap_or(Duration::ZERO)
    }

    #[cfg(test)]
    pub(crate) fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Duration>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Layer that wraps a connector with [`ConnectTimer`].
#[derive(Debug, Clone)]
pub struct ConnectTimerLayer {
    slot: ConnectSlot,
}

impl ConnectTimerLayer {
    /// Creates a layer recording into `slot`.
    #[must_use]
    pub const fn new(slot: ConnectSlot) -> Self {
        Self { slot }
    }
}

impl<S> Layer<S> for ConnectTimerLayer {
    type Service = ConnectTimer<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ConnectTimer {
            inner,
            slot: self.slot.clone(),
        }
    }
}

/// Connector wrapper that times each connection attempt.
///
/// Failed attempts are not recorded.
#[derive(Debug, Clone)]
pub struct ConnectTimer<S> {
    inner: S,
    slot: ConnectSlot,
}

impl<S, R> Service<R> for ConnectTimer<S>
where
    S: Service<R>,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: R) -> Self::Future {
        let slot = self.slot.clone();
        let started = Instant::now();
        let connecting = self.inner.call(req);

        Box::pin(async move {
            let connection = connecting.await?;
            slot.record(started.elapsed());
            Ok(connection)
        })
    }
}
