//! WebSocket front end.

use crate::config::ServerConfig;
use crate::hub::{Hub, HubCommand, HubHandle};
use crate::protocol::Outbound;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use strictly_mastermind::{Naming, Registry};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Builds the router: a WebSocket upgrade at `/`.
pub fn router(hub: HubHandle) -> Router {
    Router::new().route("/", get(upgrade)).with_state(hub)
}

async fn upgrade(ws: WebSocketUpgrade, State(hub): State<HubHandle>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

#[instrument(skip_all)]
async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let channel = hub.allocate_channel();
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut queued) = mpsc::unbounded_channel::<Outbound>();

    if !hub.submit(HubCommand::Connect { channel, outbox }).await {
        warn!(%channel, "Hub unavailable, closing socket");
        return;
    }

    let writer = tokio::spawn(async move {
        while let Some(message) = queued.recv().await {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    warn!(%channel, error = %e, "Failed to encode outbound message");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                debug!(%channel, "Socket closed while sending");
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let command = HubCommand::Message {
                    channel,
                    text: text.as_str().to_owned(),
                };
                if !hub.submit(command).await {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => debug!(%channel, "Ignoring non-text frame"),
            Err(e) => {
                warn!(%channel, error = %e, "Socket error");
                break;
            }
        }
    }

    hub.submit(HubCommand::Disconnect { channel }).await;
    if let Err(e) = writer.await {
        debug!(%channel, error = %e, "Writer task ended abnormally");
    }
}

/// A bound, not yet running, game server.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    hub: Hub,
    handle: HubHandle,
}

impl Server {
    /// Binds the listener described by `config`.
    ///
    /// This is the only fallible step of startup.
    #[instrument(skip(naming))]
    pub async fn bind(config: &ServerConfig, naming: Box<dyn Naming>) -> std::io::Result<Self> {
        let listener = TcpListener::bind((config.host().as_str(), *config.port())).await?;
        let registry = Registry::new(naming).with_name_attempts(*config.name_attempts());
        let (hub, handle) = Hub::new(registry, *config.disconnect_policy());
        info!(addr = ?listener.local_addr().ok(), "Listener bound");
        Ok(Self {
            listener,
            hub,
            handle,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the hub and serves connections until the listener fails.
    pub async fn run(self) -> std::io::Result<()> {
        let hub = tokio::spawn(self.hub.run());
        let result = axum::serve(self.listener, router(self.handle)).await;
        hub.abort();
        result
    }
}
