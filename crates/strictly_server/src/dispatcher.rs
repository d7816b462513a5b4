//! Routes decoded requests to the registry and pushes the resulting views.

use crate::config::DisconnectPolicy;
use crate::protocol::{self, Inbound, Outbound, Request};
use crate::transport::Transport;
use strictly_mastermind::{
    ChannelId, ConnectionId, Registry, SessionError, SessionErrorKind, Transition, project,
    project_all,
};
use tracing::{debug, info, instrument, warn};

/// Drives the registry from inbound messages.
///
/// Every message is handled to completion before the next one: at most one
/// state change, then the views it produced. Failures are logged and the
/// message dropped; nothing is ever reported back to the client.
#[derive(Debug)]
pub struct Dispatcher<T> {
    registry: Registry,
    transport: T,
    disconnect_policy: DisconnectPolicy,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher owning `registry` and pushing through `transport`.
    #[instrument(skip(registry, transport))]
    pub fn new(registry: Registry, transport: T, disconnect_policy: DisconnectPolicy) -> Self {
        info!("Creating dispatcher");
        Self {
            registry,
            transport,
            disconnect_policy,
        }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Registers a fresh player for a new connection and sends it its id.
    #[instrument(skip(self))]
    pub fn connect(&mut self, channel: ChannelId) -> Option<ConnectionId> {
        let id = match self.registry.issue_connection_id() {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Could not issue connection id");
                return None;
            }
        };
        self.registry.register_connection(id.clone(), channel);
        info!(connection_id = %id, "Connection opened");
        self.transport.send(channel, Outbound::Id { id: id.clone() });
        Some(id)
    }

    /// Handles a closed socket according to the disconnect policy.
    #[instrument(skip(self))]
    pub fn disconnect(&mut self, channel: ChannelId) {
        let players = self.registry.players_on_channel(channel);
        info!(players = players.len(), policy = %self.disconnect_policy, "Connection closed");
        if self.disconnect_policy != DisconnectPolicy::EndMatch {
            return;
        }
        for id in players {
            match self.registry.end_match(&id) {
                Ok(Some(ended)) => info!(connection_id = %id, match_name = %ended.name(), "Match ended on disconnect"),
                Ok(None) => {}
                Err(e) => warn!(connection_id = %id, error = %e, "Failed to end match on disconnect"),
            }
        }
    }

    /// Handles one text frame received on `channel`. Never fails.
    #[instrument(skip(self, text))]
    pub fn handle(&mut self, channel: ChannelId, text: &str) {
        match protocol::decode(text) {
            Ok(Inbound::Request { id, request }) => {
                debug!(connection_id = %id, ?request, "Dispatching request");
                if let Err(e) = self.apply(channel, &id, request) {
                    warn!(connection_id = %id, error = %e, "Dropping request");
                }
            }
            Ok(Inbound::Unrecognized(kind)) => {
                debug!(kind = %kind, "Ignoring unrecognized message type");
            }
            Err(e) => warn!(error = %e, "Dropping malformed message"),
        }
    }

    fn apply(
        &mut self,
        channel: ChannelId,
        id: &ConnectionId,
        request: Request,
    ) -> Result<(), SessionError> {
        match request {
            Request::GetUser => {
                self.registry.rebind_channel(id, channel)?;
                self.registry.clear_stale_match(id);
                self.send_view(id)?;
                self.send_user(id)
            }
            Request::Info => {
                self.log_diagnostics();
                self.send_user(id)
            }
            Request::SetUserName(payload) => {
                self.registry.set_display_name(id, payload.name);
                Ok(())
            }
            Request::CreateGame => {
                let name = self.registry.create_match(id)?.name().clone();
                info!(connection_id = %id, match_name = %name, "Match created");
                self.send_view(id)
            }
            Request::JoinGame(payload) => {
                self.registry.join_match(id, &payload.name)?;
                info!(connection_id = %id, match_name = %payload.name, "Match joined");
                self.broadcast(&payload.name);
                Ok(())
            }
            Request::SetNumber(payload) => {
                let transition = self
                    .registry
                    .commit_secret(id, &payload.game_name, payload.number)?;
                self.after(transition, &payload.game_name);
                Ok(())
            }
            Request::GuessNumber(payload) => {
                let transition = self
                    .registry
                    .submit_guess(id, &payload.game_name, payload.number)?;
                self.after(transition, &payload.game_name);
                Ok(())
            }
            Request::NewGame(payload) => {
                let transition = self.registry.start_new_round(id, &payload.game_name)?;
                self.after(transition, &payload.game_name);
                Ok(())
            }
            Request::EndGame => {
                if let Some(ended) = self.registry.end_match(id)? {
                    info!(connection_id = %id, match_name = %ended.name(), "Match ended");
                }
                Ok(())
            }
        }
    }

    fn after(&mut self, transition: Transition, match_name: &str) {
        match transition {
            Transition::Applied => self.broadcast(match_name),
            Transition::Ignored(reason) => {
                debug!(match_name, %reason, "Request left match unchanged");
            }
        }
    }

    /// Pushes an independently redacted view to each seated player.
    fn broadcast(&mut self, match_name: &str) {
        let Some(game) = self.registry.lookup_match(match_name) else {
            debug!(match_name, "Nothing to broadcast");
            return;
        };
        for (player, view) in project_all(game, &self.registry) {
            match self.registry.lookup(&player) {
                Some(p) => self
                    .transport
                    .send(*p.channel(), Outbound::Game(Box::new(view))),
                None => debug!(connection_id = %player, "Seated player not registered"),
            }
        }
    }

    /// Pushes `id`'s own view of its current match, if it has one.
    fn send_view(&mut self, id: &ConnectionId) -> Result<(), SessionError> {
        let player = self
            .registry
            .lookup(id)
            .ok_or_else(|| SessionError::new(SessionErrorKind::UnknownConnection(id.to_string())))?;
        let Some(game) = player
            .current_match()
            .as_deref()
            .and_then(|name| self.registry.lookup_match(name))
        else {
            return Ok(());
        };
        let view = project(game, &self.registry, game.seat_of(id)?);
        self.transport
            .send(*player.channel(), Outbound::Game(Box::new(view)));
        Ok(())
    }

    fn send_user(&mut self, id: &ConnectionId) -> Result<(), SessionError> {
        let player = self
            .registry
            .lookup(id)
            .ok_or_else(|| SessionError::new(SessionErrorKind::UnknownConnection(id.to_string())))?;
        self.transport
            .send(*player.channel(), Outbound::User(player.snapshot()));
        Ok(())
    }

    fn log_diagnostics(&self) {
        info!(
            players = self.registry.player_count(),
            matches = self.registry.matches().count(),
            "Registry summary"
        );
        for game in self.registry.matches() {
            info!(
                match_name = %game.name(),
                phase = %game.phase(),
                round = game.match_counter(),
                seated = game.players().count(),
                "Live match"
            );
        }
    }
}
