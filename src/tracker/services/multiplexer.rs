//! Correlation of outbound requests with inbound responses.
//!
//! The transport channel is fire-and-forget in both directions. Every request
//! gets a fresh [`CorrelationId`] and a pending-table entry holding the
//! caller's single-settle sender and its timeout timer. Whichever of the
//! matching envelope, the timer, or [`RequestMultiplexer::shutdown`] removes
//! the entry first settles the request; the others find nothing and do
//! nothing.

use super::RequestError;
use crate::tracker::{
    domain::{ApiMethod, CorrelationId, RequestDescriptor, ResponseEnvelope},
    ports::{Notifier, ToastSeverity, TrackerTransport},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Settlement = Result<Value, RequestError>;

struct PendingRequest {
    api_method: ApiMethod,
    responder: oneshot::Sender<Settlement>,
    timer: JoinHandle<()>,
}

impl PendingRequest {
    fn settle(self, id: CorrelationId, result: Settlement) {
        if self.responder.send(result).is_err() {
            debug!(request_id = %id, method = %self.api_method, "caller stopped waiting for tracker response");
        }
    }
}

struct PendingTable {
    entries: Mutex<HashMap<CorrelationId, PendingRequest>>,
    notifier: Arc<dyn Notifier>,
}

impl PendingTable {
    fn lock(&self) -> MutexGuard<'_, HashMap<CorrelationId, PendingRequest>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take(&self, id: CorrelationId) -> Option<PendingRequest> {
        self.lock().remove(&id)
    }

    fn deliver(&self, envelope: ResponseEnvelope) -> bool {
        let (id, outcome) = envelope.into_outcome();
        let Some(pending) = self.take(id) else {
            debug!(request_id = %id, "dropping response for unknown or settled request");
            return false;
        };
        pending.timer.abort();

        let method = pending.api_method;
        let result = outcome.map_err(|cause| {
            warn!(request_id = %id, %method, %cause, "tracker request failed");
            self.notifier.toast(
                ToastSeverity::Error,
                &format!("Tracker request failed: {method}: {cause}"),
            );
            RequestError::Transport { method, cause }
        });
        pending.settle(id, result);
        true
    }

    fn expire(&self, id: CorrelationId) {
        let Some(pending) = self.take(id) else {
            return;
        };
        let method = pending.api_method;
        warn!(request_id = %id, %method, "tracker request timed out");
        self.notifier.toast(
            ToastSeverity::Error,
            &format!("Tracker request timed out for {method}"),
        );
        pending.settle(id, Err(RequestError::Timeout { method }));
    }
}

/// Turns the one-way transport channel into independent request futures.
pub struct RequestMultiplexer<T>
where
    T: TrackerTransport,
{
    transport: Arc<T>,
    table: Arc<PendingTable>,
    timeout: Duration,
}

impl<T> RequestMultiplexer<T>
where
    T: TrackerTransport,
{
    /// Creates a multiplexer with an empty pending table.
    #[must_use]
    pub fn new(transport: Arc<T>, notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            transport,
            table: Arc::new(PendingTable {
                entries: Mutex::new(HashMap::new()),
                notifier,
            }),
            timeout,
        }
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the number of requests awaiting a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.table.lock().len()
    }

    /// Sends a request and waits for its correlated response.
    ///
    /// Requests are never retried.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Transport`] for error envelopes,
    /// [`RequestError::Timeout`] when no response arrives in time,
    /// [`RequestError::Dispatch`] when the channel rejects the request and
    /// [`RequestError::Closed`] when the multiplexer shuts down first.
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Value, RequestError> {
        let method = descriptor.api_method();
        let (responder, settled) = oneshot::channel();
        let id = self.register(method, responder);

        debug!(request_id = %id, %method, "dispatching tracker request");
        if let Err(source) = self.transport.dispatch(descriptor.into_outbound(id)).await {
            if let Some(pending) = self.table.take(id) {
                pending.timer.abort();
            }
            warn!(request_id = %id, %method, error = %source, "tracker request dispatch failed");
            return Err(RequestError::Dispatch { method, source });
        }

        settled
            .await
            .unwrap_or(Err(RequestError::Closed { method }))
    }

    fn register(&self, api_method: ApiMethod, responder: oneshot::Sender<Settlement>) -> CorrelationId {
        let mut entries = self.table.lock();
        let mut id = CorrelationId::new();
        while entries.contains_key(&id) {
            id = CorrelationId::new();
        }
        let timer = tokio::spawn(expire_after(Arc::clone(&self.table), id, self.timeout));
        entries.insert(
            id,
            PendingRequest {
                api_method,
                responder,
                timer,
            },
        );
        id
    }

    /// Settles the pending request matching the envelope.
    ///
    /// Returns `false` when no request with that id is pending, which covers
    /// unknown ids, duplicates and responses arriving after a timeout.
    #[must_use]
    pub fn deliver(&self, envelope: ResponseEnvelope) -> bool {
        self.table.deliver(envelope)
    }

    /// Spawns a task delivering every envelope read from `inbound`.
    ///
    /// The task ends when the sending side is dropped.
    #[must_use]
    pub fn attach_inbound(&self, mut inbound: mpsc::UnboundedReceiver<ResponseEnvelope>) -> JoinHandle<()> {
        let table = Arc::clone(&self.table);
        tokio::spawn(async move {
            while let Some(envelope) = inbound.recv().await {
                table.deliver(envelope);
            }
            debug!("tracker inbound channel closed");
        })
    }

    /// Cancels every timer and fails every pending request with
    /// [`RequestError::Closed`].
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.table.lock().drain().collect();
        for (id, pending) in drained {
            pending.timer.abort();
            let method = pending.api_method;
            pending.settle(id, Err(RequestError::Closed { method }));
        }
    }
}

async fn expire_after(table: Arc<PendingTable>, id: CorrelationId, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    table.expire(id);
}
