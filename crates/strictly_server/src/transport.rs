//! Outbound delivery to connected clients.

use crate::protocol::Outbound;
use derive_new::new;
use std::collections::HashMap;
use strictly_mastermind::ChannelId;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument};

/// Fire-and-forget delivery of outbound messages to a channel.
///
/// Implementations must not block; a message to a closed or unknown
/// channel is simply dropped.
pub trait Transport {
    /// Queues `message` for `channel`.
    fn send(&mut self, channel: ChannelId, message: Outbound);
}

/// Per-connection outbound queues drained by each socket's writer task.
#[derive(Debug, Default, new)]
pub struct Outboxes {
    #[new(default)]
    senders: HashMap<ChannelId, UnboundedSender<Outbound>>,
}

impl Outboxes {
    /// Starts routing messages for `channel` into `outbox`.
    #[instrument(skip(self, outbox))]
    pub fn open(&mut self, channel: ChannelId, outbox: UnboundedSender<Outbound>) {
        self.senders.insert(channel, outbox);
    }

    /// Stops routing messages for `channel`; its writer task then ends.
    #[instrument(skip(self))]
    pub fn close(&mut self, channel: ChannelId) {
        self.senders.remove(&channel);
    }

    /// Number of open channels.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// True when no channel is open.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl Transport for Outboxes {
    fn send(&mut self, channel: ChannelId, message: Outbound) {
        match self.senders.get(&channel) {
            Some(outbox) => {
                if outbox.send(message).is_err() {
                    debug!(%channel, "Outbox closed, dropping message");
                    self.senders.remove(&channel);
                }
            }
            None => debug!(%channel, "No outbox for channel, dropping message"),
        }
    }
}
