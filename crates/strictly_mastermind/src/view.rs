//! Per-recipient match views.
//!
//! While a round is in progress each recipient sees its own secret but
//! never the opponent's; once the round is finished both secrets are
//! revealed. Views are owned values built fresh for every recipient.

use crate::digits::Digits;
use crate::game::{GuessResult, Match, Phase, Side, SideTag};
use crate::player::{ConnectionId, PlayerView};
use crate::registry::Roster;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// What one recipient sees of a side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideView {
    /// The seated player.
    pub player: PlayerView,
    /// Whether this side may guess now.
    pub turn: bool,
    /// Rounds won.
    pub wins: u32,
    /// The secret, when visible to the recipient.
    pub secret: Option<Digits>,
    /// Guesses made against this side.
    pub guess_history: Vec<GuessResult>,
}

/// What one recipient sees of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    /// Match name.
    pub name: String,
    /// Current phase.
    pub phase: Phase,
    /// Round counter.
    pub match_counter: u32,
    /// Winner of the finished round.
    pub winner_display_name: Option<String>,
    /// The recipient's own side.
    pub seat: SideTag,
    /// Side A.
    pub side_a: SideView,
    /// Side B, once joined.
    pub side_b: Option<SideView>,
}

/// Projects `game` for the recipient seated at `perspective`.
#[instrument(skip(game, roster), fields(match_name = %game.name()))]
pub fn project(game: &Match, roster: &impl Roster, perspective: SideTag) -> MatchView {
    let reveal = *game.phase() == Phase::Finished;
    let side_view = |tag: SideTag, side: &Side| SideView {
        player: player_view(roster, side.player()),
        turn: *side.turn(),
        wins: *side.wins(),
        secret: if reveal || tag == perspective {
            *side.secret()
        } else {
            None
        },
        guess_history: side.guess_history().clone(),
    };

    MatchView {
        name: game.name().clone(),
        phase: *game.phase(),
        match_counter: *game.match_counter(),
        winner_display_name: game.winner_display_name().clone(),
        seat: perspective,
        side_a: side_view(SideTag::A, game.side_a()),
        side_b: game.side_b().as_ref().map(|b| side_view(SideTag::B, b)),
    }
}

/// Projects `game` once per seated player, side A first.
pub fn project_all(game: &Match, roster: &impl Roster) -> Vec<(ConnectionId, MatchView)> {
    game.players()
        .map(|(tag, id)| (id.clone(), project(game, roster, tag)))
        .collect()
}

fn player_view(roster: &impl Roster, id: &ConnectionId) -> PlayerView {
    roster
        .player(id)
        .map(|p| p.snapshot())
        .unwrap_or_else(|| PlayerView {
            id: id.clone(),
            name: String::new(),
            game_name: String::new(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::ScriptedNaming;
    use crate::player::ChannelId;
    use crate::registry::Registry;

    fn guessing_registry() -> Registry {
        let mut registry = Registry::new(Box::new(ScriptedNaming::new(
            Vec::<String>::new(),
            ["ember"],
        )));
        registry.register_connection("alice".into(), ChannelId(1));
        registry.register_connection("bob".into(), ChannelId(2));
        registry.create_match(&"alice".into()).unwrap();
        registry.join_match(&"bob".into(), "ember").unwrap();
        let _ = registry
            .commit_secret(&"alice".into(), "ember", "5042".parse().unwrap())
            .unwrap();
        let _ = registry
            .commit_secret(&"bob".into(), "ember", "1245".parse().unwrap())
            .unwrap();
        registry
    }

    #[test]
    fn test_opponent_secret_hidden_in_progress() {
        let registry = guessing_registry();
        let game = registry.lookup_match("ember").unwrap();

        let for_a = project(game, &registry, SideTag::A);
        assert_eq!(for_a.side_a.secret, Some("5042".parse().unwrap()));
        assert_eq!(for_a.side_b.as_ref().unwrap().secret, None);

        let for_b = project(game, &registry, SideTag::B);
        assert_eq!(for_b.side_a.secret, None);
        assert_eq!(for_b.side_b.as_ref().unwrap().secret, Some("1245".parse().unwrap()));
    }

    #[test]
    fn test_secrets_revealed_when_finished() {
        let mut registry = guessing_registry();
        let t = registry
            .submit_guess(&"alice".into(), "ember", "1245".parse().unwrap())
            .unwrap();
        assert!(t.is_applied());
        let game = registry.lookup_match("ember").unwrap();
        assert_eq!(*game.phase(), Phase::Finished);

        for (_, view) in project_all(game, &registry) {
            assert!(view.side_a.secret.is_some());
            assert!(view.side_b.as_ref().unwrap().secret.is_some());
        }
    }

    #[test]
    fn test_project_all_yields_independent_views() {
        let registry = guessing_registry();
        let game = registry.lookup_match("ember").unwrap();
        let views = project_all(game, &registry);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].0.as_str(), "alice");
        assert_eq!(views[0].1.seat, SideTag::A);
        assert_eq!(views[1].1.seat, SideTag::B);
        assert_ne!(views[0].1, views[1].1);
    }

    #[test]
    fn test_view_json_has_no_channel() {
        let registry = guessing_registry();
        let game = registry.lookup_match("ember").unwrap();
        let json = serde_json::to_value(project(game, &registry, SideTag::A)).unwrap();
        assert_eq!(json["phase"], "guessing");
        assert_eq!(json["seat"], "a");
        assert_eq!(json["sideA"]["player"]["gameName"], "ember");
        assert!(json["sideB"]["secret"].is_null());
        assert!(!json.to_string().contains("channel"));
    }
}
