//! The match state machine.
//!
//! A [`Match`] owns both sides of one paired session and advances through
//! [`Phase`]s as secrets are committed and guesses are scored. Guarded
//! actions that do not apply in the current state return
//! [`Transition::Ignored`] instead of an error so callers can drop them
//! without telling the client.

use crate::digits::{Digits, score};
use crate::error::{SessionError, SessionErrorKind};
use crate::player::ConnectionId;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Where a match is within the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    /// Only the creator is bound.
    AwaitingSecondPlayer,
    /// Both sides bound, secrets not yet both committed.
    ChoosingSecrets,
    /// Sides alternate guessing each other's secret.
    Guessing,
    /// A side guessed exactly; secrets are revealed.
    Finished,
}

/// One of the two seats in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SideTag {
    /// The creator's side.
    A,
    /// The joiner's side.
    B,
}

impl SideTag {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            SideTag::A => SideTag::B,
            SideTag::B => SideTag::A,
        }
    }
}

/// A scored guess, recorded in the history of the side that was guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResult {
    /// What the opponent guessed.
    pub guessed_sequence: Digits,
    /// Exact matches (0-4).
    pub exact_matches: u8,
    /// Partial matches (0-4).
    pub partial_matches: u8,
}

/// One participant's state within a match.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Side {
    /// The bound player.
    player: ConnectionId,
    /// Whether this side may guess now.
    turn: bool,
    /// Rounds won in this match.
    wins: u32,
    /// This side's secret for the current round.
    secret: Option<Digits>,
    /// Guesses made against this side this round.
    guess_history: Vec<GuessResult>,
}

impl Side {
    fn new(player: ConnectionId, turn: bool) -> Self {
        Self {
            player,
            turn,
            wins: 0,
            secret: None,
            guess_history: Vec::new(),
        }
    }

    fn reset_round(&mut self, turn: bool) {
        self.turn = turn;
        self.secret = None;
        self.guess_history.clear();
    }
}

/// Why a guarded action left the match unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum NoOp {
    /// The second side has not joined yet.
    #[display("opponent has not joined")]
    OpponentMissing,
    /// The action does not apply in this phase.
    #[display("not allowed in phase {}", _0)]
    WrongPhase(Phase),
    /// The side already committed a secret this round.
    #[display("secret already committed")]
    SecretAlreadySet,
    /// The side tried to guess out of turn.
    #[display("not this side's turn")]
    NotYourTurn,
    /// The named match does not exist.
    #[display("no such match")]
    NoSuchMatch,
}

/// Result of a guarded state-machine action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// State changed; views should be broadcast.
    Applied,
    /// Nothing changed.
    Ignored(NoOp),
}

impl Transition {
    /// True when the action changed the match.
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Authoritative state of one two-player session.
#[derive(Debug, Clone, Getters)]
pub struct Match {
    /// Unique match name.
    name: String,
    /// Current phase.
    phase: Phase,
    /// Round counter, starting at 1.
    match_counter: u32,
    /// Display name of the last round's winner.
    winner_display_name: Option<String>,
    /// The creator's side.
    side_a: Side,
    /// The joiner's side, once bound.
    side_b: Option<Side>,
    #[getter(skip)]
    seats: HashMap<ConnectionId, SideTag>,
}

impl Match {
    /// Creates a match awaiting its second player, with the creator to move first.
    #[instrument(skip(name), fields(match_name = %name))]
    pub fn new(name: String, creator: ConnectionId) -> Self {
        info!(creator = %creator, "Creating match");
        let mut seats = HashMap::new();
        seats.insert(creator.clone(), SideTag::A);
        Self {
            name,
            phase: Phase::AwaitingSecondPlayer,
            match_counter: 1,
            winner_display_name: None,
            side_a: Side::new(creator, true),
            side_b: None,
            seats,
        }
    }

    /// Returns the side bound to `tag`, if any.
    pub fn side(&self, tag: SideTag) -> Option<&Side> {
        match tag {
            SideTag::A => Some(&self.side_a),
            SideTag::B => self.side_b.as_ref(),
        }
    }

    fn side_mut(&mut self, tag: SideTag) -> Option<&mut Side> {
        match tag {
            SideTag::A => Some(&mut self.side_a),
            SideTag::B => self.side_b.as_mut(),
        }
    }

    /// Players currently seated, side A first.
    pub fn players(&self) -> impl Iterator<Item = (SideTag, &ConnectionId)> {
        std::iter::once((SideTag::A, &self.side_a.player))
            .chain(self.side_b.iter().map(|side| (SideTag::B, &side.player)))
    }

    /// Resolves which side `id` occupies.
    pub fn seat_of(&self, id: &ConnectionId) -> Result<SideTag, SessionError> {
        self.seats.get(id).copied().ok_or_else(|| {
            SessionErrorKind::NotAParticipant(id.to_string(), self.name.clone()).into()
        })
    }

    /// Returns the caller's side and the opposing side (absent before a join).
    pub fn player_and_opponent(
        &self,
        id: &ConnectionId,
    ) -> Result<(&Side, Option<&Side>), SessionError> {
        let tag = self.seat_of(id)?;
        let player = match tag {
            SideTag::A => &self.side_a,
            SideTag::B => self.side_b.as_ref().ok_or_else(|| {
                SessionError::from(SessionErrorKind::NotAParticipant(
                    id.to_string(),
                    self.name.clone(),
                ))
            })?,
        };
        Ok((player, self.side(tag.opponent())))
    }

    /// Binds `player` to side B and moves to secret selection.
    #[instrument(skip(self), fields(match_name = %self.name))]
    pub(crate) fn join(&mut self, player: ConnectionId) -> Result<(), SessionError> {
        if self.side_b.is_some() {
            return Err(SessionErrorKind::MatchFull(self.name.clone()).into());
        }
        info!(player = %player, "Second player joined");
        self.seats.insert(player.clone(), SideTag::B);
        self.side_b = Some(Side::new(player, false));
        self.phase = Phase::ChoosingSecrets;
        Ok(())
    }

    /// Records the caller's secret; the second commit starts guessing.
    #[instrument(skip(self, secret), fields(match_name = %self.name, phase = %self.phase))]
    pub fn commit_secret(
        &mut self,
        id: &ConnectionId,
        secret: Digits,
    ) -> Result<Transition, SessionError> {
        let tag = self.seat_of(id)?;
        if self.side_b.is_none() {
            return Ok(Transition::Ignored(NoOp::OpponentMissing));
        }
        if self.phase != Phase::ChoosingSecrets {
            return Ok(Transition::Ignored(NoOp::WrongPhase(self.phase)));
        }

        let Some(side) = self.side_mut(tag) else {
            return Ok(Transition::Ignored(NoOp::OpponentMissing));
        };
        if side.secret.is_some() {
            return Ok(Transition::Ignored(NoOp::SecretAlreadySet));
        }
        side.secret = Some(secret);
        debug!(side = %tag, "Secret committed");

        let both_set = self.side_a.secret.is_some()
            && self.side_b.as_ref().is_some_and(|b| b.secret.is_some());
        if both_set {
            info!("Both secrets committed, guessing begins");
            self.phase = Phase::Guessing;
        }
        Ok(Transition::Applied)
    }

    /// Scores the caller's guess against the opponent's secret.
    ///
    /// The result is appended to the opponent's history and the turn passes
    /// over. An exact guess finishes the round, naming `guesser_name` as
    /// winner.
    #[instrument(skip(self, guess, guesser_name), fields(match_name = %self.name, phase = %self.phase))]
    pub fn submit_guess(
        &mut self,
        id: &ConnectionId,
        guess: Digits,
        guesser_name: &str,
    ) -> Result<Transition, SessionError> {
        let tag = self.seat_of(id)?;
        if self.side_b.is_none() {
            return Ok(Transition::Ignored(NoOp::OpponentMissing));
        }
        if self.phase != Phase::Guessing {
            return Ok(Transition::Ignored(NoOp::WrongPhase(self.phase)));
        }

        let (player, opponent) = match (tag, self.side_b.as_mut()) {
            (SideTag::A, Some(b)) => (&mut self.side_a, b),
            (SideTag::B, Some(b)) => (b, &mut self.side_a),
            (_, None) => return Ok(Transition::Ignored(NoOp::OpponentMissing)),
        };
        if !player.turn {
            return Ok(Transition::Ignored(NoOp::NotYourTurn));
        }
        let Some(secret) = opponent.secret else {
            return Ok(Transition::Ignored(NoOp::WrongPhase(self.phase)));
        };

        player.turn = false;
        opponent.turn = true;

        let result = score(&secret, &guess);
        opponent.guess_history.push(GuessResult {
            guessed_sequence: guess,
            exact_matches: result.exact,
            partial_matches: result.partial,
        });
        debug!(side = %tag, exact = result.exact, partial = result.partial, "Guess scored");

        if result.is_solved() {
            player.wins += 1;
            self.winner_display_name = Some(guesser_name.to_string());
            self.phase = Phase::Finished;
            info!(winner = %tag, "Round finished");
        }
        debug_assert!(self.turn_is_exclusive());
        Ok(Transition::Applied)
    }

    /// Starts the next round: clears secrets, histories and the winner.
    ///
    /// Odd rounds open with side A, even rounds with side B.
    #[instrument(skip(self), fields(match_name = %self.name, phase = %self.phase))]
    pub fn start_new_round(&mut self) -> Transition {
        let Some(side_b) = self.side_b.as_mut() else {
            return Transition::Ignored(NoOp::OpponentMissing);
        };

        self.match_counter += 1;
        let a_starts = self.match_counter % 2 == 1;
        self.side_a.reset_round(a_starts);
        side_b.reset_round(!a_starts);
        self.winner_display_name = None;
        self.phase = Phase::ChoosingSecrets;

        info!(round = self.match_counter, "New round started");
        Transition::Applied
    }

    /// True when at most one side holds the turn.
    pub fn turn_is_exclusive(&self) -> bool {
        let b_turn = self.side_b.as_ref().is_some_and(|b| b.turn);
        !(self.side_a.turn && b_turn)
    }
}
