//! Transport adapter writing requests to a tokio channel.

use crate::tracker::{
    domain::OutboundRequest,
    ports::{TrackerTransport, TransportDispatchError},
};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// Writes outbound requests to an unbounded channel read by the process that
/// performs the tracker calls.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<OutboundRequest>,
}

impl ChannelTransport {
    /// Wraps an existing sender.
    #[must_use]
    pub const fn new(sender: mpsc::UnboundedSender<OutboundRequest>) -> Self {
        Self { sender }
    }

    /// Creates a transport together with the receiver for its requests.
    #[must_use]
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<OutboundRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl TrackerTransport for ChannelTransport {
    async fn dispatch(&self, request: OutboundRequest) -> Result<(), TransportDispatchError> {
        let request_id = request.request_id;
        self.sender
            .send(request)
            .map_err(|_| TransportDispatchError::Closed)?;
        debug!(%request_id, "queued tracker request");
        Ok(())
    }
}
