//! The single task that owns all session state.
//!
//! Socket tasks never touch the registry. They forward [`HubCommand`]s
//! over one channel, and the hub applies them strictly in arrival order.

use crate::config::DisconnectPolicy;
use crate::dispatcher::Dispatcher;
use crate::protocol::Outbound;
use crate::transport::Outboxes;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use strictly_mastermind::{ChannelId, Registry};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Queue depth between socket tasks and the hub.
const COMMAND_CAPACITY: usize = 1024;

/// Work submitted to the hub by socket tasks.
#[derive(Debug)]
pub enum HubCommand {
    /// A socket opened; its writer drains `outbox`.
    Connect {
        /// The socket's channel.
        channel: ChannelId,
        /// Queue feeding the socket's writer task.
        outbox: mpsc::UnboundedSender<Outbound>,
    },
    /// A text frame arrived.
    Message {
        /// The socket's channel.
        channel: ChannelId,
        /// Raw frame text.
        text: String,
    },
    /// The socket closed.
    Disconnect {
        /// The socket's channel.
        channel: ChannelId,
    },
}

/// Cloneable handle socket tasks use to reach the hub.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
    next_channel: Arc<AtomicU64>,
}

impl HubHandle {
    /// Allocates a channel id for a new socket.
    pub fn allocate_channel(&self) -> ChannelId {
        ChannelId(self.next_channel.fetch_add(1, Ordering::Relaxed))
    }

    /// Submits a command; returns false once the hub has stopped.
    pub async fn submit(&self, command: HubCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }
}

/// Owns the dispatcher and processes commands one at a time.
#[derive(Debug)]
pub struct Hub {
    dispatcher: Dispatcher<Outboxes>,
    commands: mpsc::Receiver<HubCommand>,
}

impl Hub {
    /// Creates a hub around `registry` and the handle used to feed it.
    #[instrument(skip(registry))]
    pub fn new(registry: Registry, disconnect_policy: DisconnectPolicy) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let hub = Self {
            dispatcher: Dispatcher::new(registry, Outboxes::new(), disconnect_policy),
            commands: rx,
        };
        let handle = HubHandle {
            commands: tx,
            next_channel: Arc::new(AtomicU64::new(1)),
        };
        (hub, handle)
    }

    /// Processes commands until every handle is dropped.
    pub async fn run(mut self) {
        info!("Hub running");
        while let Some(command) = self.commands.recv().await {
            self.apply(command);
        }
        info!("Hub stopped");
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Connect { channel, outbox } => {
                self.dispatcher.transport_mut().open(channel, outbox);
                if self.dispatcher.connect(channel).is_none() {
                    warn!(%channel, "Connection left without an id");
                }
            }
            HubCommand::Message { channel, text } => {
                self.dispatcher.handle(channel, &text);
            }
            HubCommand::Disconnect { channel } => {
                self.dispatcher.transport_mut().close(channel);
                self.dispatcher.disconnect(channel);
                debug!(open = self.dispatcher.transport().len(), "Channels open");
            }
        }
    }
}
