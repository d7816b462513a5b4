//! Wire messages exchanged with clients.
//!
//! Inbound messages are `{ "type", "id", "payload" }` objects. They are
//! decoded in two steps so that an unknown `type` can be told apart from a
//! known one with a bad payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strictly_mastermind::{
    ConnectionId, Digits, MatchView, PlayerView, SessionError, SessionErrorKind,
};
use tracing::instrument;

/// Raw inbound envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Declared operation.
    #[serde(rename = "type")]
    pub kind: String,
    /// Connection id of the sender.
    pub id: Option<ConnectionId>,
    /// Operation arguments.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Payload of `set-user-name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetUserName {
    /// New display name.
    pub name: String,
}

/// Payload of `join-game`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinGame {
    /// Name of the match to join.
    pub name: String,
}

/// Payload of `set-number` and `guess-number`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberInGame {
    /// Target match.
    pub game_name: String,
    /// Four-digit sequence.
    pub number: Digits,
}

/// Payload of `new-game`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    /// Target match.
    pub game_name: String,
}

/// A decoded inbound operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Re-bind the sender's channel and send its snapshot.
    GetUser,
    /// Log registry diagnostics and send the sender's snapshot.
    Info,
    /// Change display name.
    SetUserName(SetUserName),
    /// Create a match.
    CreateGame,
    /// Join a match.
    JoinGame(JoinGame),
    /// Commit a secret.
    SetNumber(NumberInGame),
    /// Guess the opponent's secret.
    GuessNumber(NumberInGame),
    /// Start the next round.
    NewGame(NewGame),
    /// Tear down the sender's match.
    EndGame,
}

/// An inbound message after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A recognized operation from `id`.
    Request {
        /// Sender.
        id: ConnectionId,
        /// Operation.
        request: Request,
    },
    /// A `type` this server does not handle.
    Unrecognized(String),
}

/// Decodes one text frame.
#[instrument(skip(text), fields(len = text.len()))]
pub fn decode(text: &str) -> Result<Inbound, SessionError> {
    let envelope: Envelope = serde_json::from_str(text).map_err(malformed)?;

    let request = match envelope.kind.as_str() {
        "get-user" => Request::GetUser,
        "info" => Request::Info,
        "set-user-name" => Request::SetUserName(payload(envelope.payload)?),
        "create-game" => Request::CreateGame,
        "join-game" => Request::JoinGame(payload(envelope.payload)?),
        "set-number" => Request::SetNumber(payload(envelope.payload)?),
        "guess-number" => Request::GuessNumber(payload(envelope.payload)?),
        "new-game" => Request::NewGame(payload(envelope.payload)?),
        "end-game" => Request::EndGame,
        _ => return Ok(Inbound::Unrecognized(envelope.kind)),
    };

    let id = envelope
        .id
        .ok_or_else(|| SessionError::new(SessionErrorKind::MalformedMessage("missing id".into())))?;
    Ok(Inbound::Request { id, request })
}

fn payload<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, SessionError> {
    serde_json::from_value(value).map_err(malformed)
}

#[track_caller]
fn malformed(err: serde_json::Error) -> SessionError {
    SessionError::new(SessionErrorKind::MalformedMessage(err.to_string()))
}

/// A message pushed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum Outbound {
    /// Identifier assigned at connect time.
    Id {
        /// The new connection id.
        id: ConnectionId,
    },
    /// Player snapshot.
    User(PlayerView),
    /// Redacted match view.
    Game(Box<MatchView>),
}

impl Outbound {
    /// Encodes this message as JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
