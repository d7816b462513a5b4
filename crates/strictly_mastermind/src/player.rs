//! Per-connection player records.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Opaque identifier handed to a connection when it is first observed.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Handle of the transport channel a player's views are pushed to.
///
/// Never serialized; the registry only stores it so the dispatcher knows
/// where to route outbound views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("channel-{}", _0)]
pub struct ChannelId(pub u64);

/// A player known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Player {
    /// Identifier assigned at connect time.
    id: ConnectionId,
    /// Current display name (empty until set).
    display_name: String,
    /// Name of the match this player is bound to, if any.
    current_match: Option<String>,
    /// Where this player's outbound messages go.
    channel: ChannelId,
}

impl Player {
    /// Creates a player with an empty name, bound to no match.
    pub fn new(id: ConnectionId, channel: ChannelId) -> Self {
        Self {
            id,
            display_name: String::new(),
            current_match: None,
            channel,
        }
    }

    pub(crate) fn set_display_name(&mut self, name: String) {
        self.display_name = name;
    }

    pub(crate) fn bind_match(&mut self, name: &str) {
        self.current_match = Some(name.to_string());
    }

    pub(crate) fn clear_match(&mut self) {
        self.current_match = None;
    }

    pub(crate) fn set_channel(&mut self, channel: ChannelId) {
        self.channel = channel;
    }

    /// Public snapshot of this player, without the transport handle.
    pub fn snapshot(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            name: self.display_name.clone(),
            game_name: self.current_match.clone().unwrap_or_default(),
        }
    }
}

/// What clients see of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Connection identifier.
    pub id: ConnectionId,
    /// Display name (may be empty).
    pub name: String,
    /// Current match name, empty when unbound.
    pub game_name: String,
}
