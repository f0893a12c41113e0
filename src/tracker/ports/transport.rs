//! Outbound side of the tracker transport channel.

use crate::tracker::domain::OutboundRequest;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Fire-and-forget channel to the process that performs tracker calls.
///
/// Responses come back separately as
/// [`ResponseEnvelope`](crate::tracker::domain::ResponseEnvelope)s.
#[async_trait]
pub trait TrackerTransport: Send + Sync {
    /// Writes a request to the channel.
    ///
    /// # Errors
    ///
    /// Returns [`TransportDispatchError`] when the channel cannot accept the
    /// message.
    async fn dispatch(&self, request: OutboundRequest) -> Result<(), TransportDispatchError>;
}

/// Errors raised while writing to the transport channel.
#[derive(Debug, Clone, Error)]
pub enum TransportDispatchError {
    /// The receiving side of the channel has gone away.
    #[error("tracker transport channel is closed")]
    Closed,

    /// Adapter-specific failure.
    #[error("tracker transport error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportDispatchError {
    /// Wraps an adapter error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
