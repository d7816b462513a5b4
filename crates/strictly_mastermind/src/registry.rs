//! Connection and match registry.

use crate::digits::Digits;
use crate::error::{SessionError, SessionErrorKind};
use crate::game::{Match, NoOp, Side, Transition};
use crate::naming::Naming;
use crate::player::{ChannelId, ConnectionId, Player};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Default number of match names tried before giving up.
pub const DEFAULT_NAME_ATTEMPTS: usize = 16;

/// Read access to registered players, used when rendering views.
pub trait Roster {
    /// Looks up a player by connection id.
    fn player(&self, id: &ConnectionId) -> Option<&Player>;
}

/// Single source of truth for players and matches.
///
/// Owns both mappings; every pairing rule is enforced here so that a
/// player's `current_match` and the match's seats never disagree.
///
/// Players are never evicted, so a client can resume with `get-user` after
/// reconnecting; the player map grows with every connection.
pub struct Registry {
    players: HashMap<ConnectionId, Player>,
    matches: HashMap<String, Match>,
    naming: Box<dyn Naming>,
    name_attempts: usize,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("players", &self.players.len())
            .field("matches", &self.matches.len())
            .field("name_attempts", &self.name_attempts)
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry drawing ids and names from `naming`.
    #[instrument(skip(naming))]
    pub fn new(naming: Box<dyn Naming>) -> Self {
        info!("Creating session registry");
        Self {
            players: HashMap::new(),
            matches: HashMap::new(),
            naming,
            name_attempts: DEFAULT_NAME_ATTEMPTS,
        }
    }

    /// Sets how many candidate names `create_match` tries (at least one).
    pub fn with_name_attempts(mut self, attempts: usize) -> Self {
        self.name_attempts = attempts.max(1);
        self
    }

    /// Draws a connection id not yet used by any player.
    #[instrument(skip(self))]
    pub fn issue_connection_id(&mut self) -> Result<ConnectionId, SessionError> {
        for _ in 0..self.name_attempts {
            let id = self.naming.next_connection_id();
            if !self.players.contains_key(&id) {
                return Ok(id);
            }
            debug!(connection_id = %id, "Connection id collision, retrying");
        }
        Err(SessionErrorKind::NameExhausted(self.name_attempts).into())
    }

    /// Registers a player for `id` if absent. Idempotent per id.
    #[instrument(skip(self))]
    pub fn register_connection(&mut self, id: ConnectionId, channel: ChannelId) -> &Player {
        self.players.entry(id).or_insert_with_key(|id| {
            info!(connection_id = %id, "Registered connection");
            Player::new(id.clone(), channel)
        })
    }

    /// Points `id`'s outbound traffic at `channel`.
    #[instrument(skip(self))]
    pub fn rebind_channel(
        &mut self,
        id: &ConnectionId,
        channel: ChannelId,
    ) -> Result<&Player, SessionError> {
        let player = self.player_mut(id)?;
        if *player.channel() != channel {
            debug!(from = %player.channel(), to = %channel, "Rebinding player channel");
            player.set_channel(channel);
        }
        Ok(&*player)
    }

    /// Overwrites the display name; unknown connections are ignored.
    #[instrument(skip(self))]
    pub fn set_display_name(&mut self, id: &ConnectionId, name: String) {
        match self.players.get_mut(id) {
            Some(player) => player.set_display_name(name),
            None => debug!(connection_id = %id, "Ignoring name for unknown connection"),
        }
    }

    /// Creates a match with `id` on side A.
    #[instrument(skip(self))]
    pub fn create_match(&mut self, id: &ConnectionId) -> Result<&Match, SessionError> {
        self.ensure_unbound(id)?;

        let mut chosen = None;
        for attempt in 0..self.name_attempts {
            let candidate = self.naming.next_match_name(attempt);
            if !self.matches.contains_key(&candidate) {
                chosen = Some(candidate);
                break;
            }
            debug!(match_name = %candidate, "Match name taken, retrying");
        }
        let Some(name) = chosen else {
            warn!(attempts = self.name_attempts, "Match names exhausted");
            return Err(SessionErrorKind::NameExhausted(self.name_attempts).into());
        };

        self.player_mut(id)?.bind_match(&name);
        let created = Match::new(name.clone(), id.clone());
        let stored = self.matches.entry(name).or_insert(created);
        Ok(&*stored)
    }

    /// Binds `id` to side B of `match_name`.
    #[instrument(skip(self))]
    pub fn join_match(
        &mut self,
        id: &ConnectionId,
        match_name: &str,
    ) -> Result<&Match, SessionError> {
        self.ensure_unbound(id)?;

        let game = self
            .matches
            .get_mut(match_name)
            .ok_or_else(|| SessionError::from(SessionErrorKind::MatchNotFound(match_name.to_string())))?;
        game.join(id.clone())?;

        if let Some(player) = self.players.get_mut(id) {
            player.bind_match(match_name);
        }
        self.lookup_match(match_name)
            .ok_or_else(|| SessionErrorKind::MatchNotFound(match_name.to_string()).into())
    }

    /// Resolves the caller's side and the opposing side of `match_name`.
    pub fn player_and_opponent(
        &self,
        match_name: &str,
        id: &ConnectionId,
    ) -> Result<(&Side, Option<&Side>), SessionError> {
        self.require_match(match_name)?.player_and_opponent(id)
    }

    /// Commits `id`'s secret in `match_name`.
    #[instrument(skip(self, secret))]
    pub fn commit_secret(
        &mut self,
        id: &ConnectionId,
        match_name: &str,
        secret: Digits,
    ) -> Result<Transition, SessionError> {
        self.require_player(id)?;
        self.require_match_mut(match_name)?.commit_secret(id, secret)
    }

    /// Submits `id`'s guess in `match_name`.
    #[instrument(skip(self, guess))]
    pub fn submit_guess(
        &mut self,
        id: &ConnectionId,
        match_name: &str,
        guess: Digits,
    ) -> Result<Transition, SessionError> {
        let guesser_name = self.require_player(id)?.display_name().clone();
        self.require_match_mut(match_name)?
            .submit_guess(id, guess, &guesser_name)
    }

    /// Starts a new round of `match_name` on behalf of `id`.
    ///
    /// A missing match is a no-op rather than an error.
    #[instrument(skip(self))]
    pub fn start_new_round(
        &mut self,
        id: &ConnectionId,
        match_name: &str,
    ) -> Result<Transition, SessionError> {
        let Some(game) = self.matches.get_mut(match_name) else {
            return Ok(Transition::Ignored(NoOp::NoSuchMatch));
        };
        game.seat_of(id)?;
        Ok(game.start_new_round())
    }

    /// Tears down `id`'s match, unbinding both players.
    ///
    /// Returns the removed match, or `None` when the player had none (its
    /// stray match name is cleared either way).
    #[instrument(skip(self))]
    pub fn end_match(&mut self, id: &ConnectionId) -> Result<Option<Match>, SessionError> {
        let Some(match_name) = self.require_player(id)?.current_match().clone() else {
            return Ok(None);
        };
        let Some(game) = self.matches.remove(&match_name) else {
            debug!(match_name = %match_name, "Clearing stale match name");
            self.player_mut(id)?.clear_match();
            return Ok(None);
        };

        for (_, seated) in game.players() {
            if let Some(p) = self.players.get_mut(seated) {
                p.clear_match();
            }
        }
        info!(match_name = %match_name, "Match ended");
        Ok(Some(game))
    }

    /// Clears `id`'s match name when the match no longer exists.
    #[instrument(skip(self))]
    pub fn clear_stale_match(&mut self, id: &ConnectionId) {
        let live = |name: &String| self.matches.contains_key(name);
        let stale = self
            .players
            .get(id)
            .and_then(|p| p.current_match().as_ref())
            .is_some_and(|name| !live(name));
        if stale && let Some(player) = self.players.get_mut(id) {
            debug!("Clearing stale match name");
            player.clear_match();
        }
    }

    /// Players whose views are routed to `channel`.
    pub fn players_on_channel(&self, channel: ChannelId) -> Vec<ConnectionId> {
        self.players
            .values()
            .filter(|p| *p.channel() == channel)
            .map(|p| p.id().clone())
            .collect()
    }

    /// Looks up a player.
    pub fn lookup(&self, id: &ConnectionId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Looks up a match by name.
    pub fn lookup_match(&self, match_name: &str) -> Option<&Match> {
        self.matches.get(match_name)
    }

    /// Iterates over live matches in no particular order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// Number of registered players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    fn ensure_unbound(&self, id: &ConnectionId) -> Result<(), SessionError> {
        let player = self.require_player(id)?;
        match player.current_match() {
            Some(existing) if self.matches.contains_key(existing) => Err(
                SessionErrorKind::AlreadyInMatch(id.to_string(), existing.clone()).into(),
            ),
            _ => Ok(()),
        }
    }

    fn require_player(&self, id: &ConnectionId) -> Result<&Player, SessionError> {
        self.players
            .get(id)
            .ok_or_else(|| SessionErrorKind::UnknownConnection(id.to_string()).into())
    }

    fn player_mut(&mut self, id: &ConnectionId) -> Result<&mut Player, SessionError> {
        self.players
            .get_mut(id)
            .ok_or_else(|| SessionErrorKind::UnknownConnection(id.to_string()).into())
    }

    fn require_match(&self, match_name: &str) -> Result<&Match, SessionError> {
        self.matches
            .get(match_name)
            .ok_or_else(|| SessionErrorKind::MatchNotFound(match_name.to_string()).into())
    }

    fn require_match_mut(&mut self, match_name: &str) -> Result<&mut Match, SessionError> {
        self.matches
            .get_mut(match_name)
            .ok_or_else(|| SessionErrorKind::MatchNotFound(match_name.to_string()).into())
    }
}

impl Roster for Registry {
    fn player(&self, id: &ConnectionId) -> Option<&Player> {
        self.players.get(id)
    }
}
