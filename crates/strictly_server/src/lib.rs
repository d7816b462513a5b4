//! Strictly Mastermind server library.
//!
//! Serves two-player number mastermind over WebSocket.
//!
//! # Architecture
//!
//! - **Protocol**: JSON envelopes in, `id`/`user`/`game` messages out
//! - **Dispatcher**: routes requests to the session registry
//! - **Hub**: single task owning all state, fed by socket tasks
//! - **Server**: axum WebSocket endpoint
//!
//! # Example
//!
//! ```no_run
//! use strictly_mastermind::RandomNaming;
//! use strictly_server::{Server, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = Server::bind(&ServerConfig::default(), Box::new(RandomNaming)).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod dispatcher;
mod hub;
mod protocol;
mod server;
mod transport;

pub use cli::Cli;
pub use config::{ConfigError, DisconnectPolicy, ServerConfig};
pub use dispatcher::Dispatcher;
pub use hub::{Hub, HubCommand, HubHandle};
pub use protocol::{
    Envelope, Inbound, JoinGame, NewGame, NumberInGame, Outbound, Request, SetUserName, decode,
};
pub use server::{Server, router};
pub use transport::{Outboxes, Transport};
