//! Tests for pairing connections into matches.

use strictly_mastermind::{
    ChannelId, ConnectionId, NoOp, Phase, RandomNaming, Registry, ScriptedNaming,
    SessionErrorKind, SideTag, Transition,
};

fn id(s: &str) -> ConnectionId {
    ConnectionId::from(s)
}

/// Registry with `alice`, `bob` and `carol` registered and names scripted.
fn setup_registry(names: &[&str]) -> Registry {
    let naming = ScriptedNaming::new(Vec::<String>::new(), names.iter().copied());
    let mut registry = Registry::new(Box::new(naming));
    registry.register_connection(id("alice"), ChannelId(1));
    registry.register_connection(id("bob"), ChannelId(2));
    registry.register_connection(id("carol"), ChannelId(3));
    registry
}

#[test]
fn test_register_connection_is_idempotent() {
    let mut registry = setup_registry(&[]);
    registry.set_display_name(&id("alice"), "Alice".to_string());

    let again = registry.register_connection(id("alice"), ChannelId(9));
    assert_eq!(again.display_name(), "Alice");
    assert_eq!(*again.channel(), ChannelId(1));
    assert_eq!(registry.player_count(), 3);
}

#[test]
fn test_set_display_name_unknown_is_noop() {
    let mut registry = setup_registry(&[]);
    registry.set_display_name(&id("nobody"), "Ghost".to_string());
    assert!(registry.lookup(&id("nobody")).is_none());
}

#[test]
fn test_create_match_binds_creator() {
    let mut registry = setup_registry(&["ember"]);
    let game = registry.create_match(&id("alice")).expect("Create failed");

    assert_eq!(game.name(), "ember");
    assert_eq!(*game.phase(), Phase::AwaitingSecondPlayer);
    assert_eq!(*game.match_counter(), 1);
    assert!(*game.side_a().turn());
    assert_eq!(*game.side_a().wins(), 0);
    assert!(game.side_b().is_none());

    let alice = registry.lookup(&id("alice")).unwrap();
    assert_eq!(alice.current_match().as_deref(), Some("ember"));
}

#[test]
fn test_create_match_twice_fails() {
    let mut registry = setup_registry(&["ember", "harbor"]);
    registry.create_match(&id("alice")).expect("Create failed");
    let err = registry.create_match(&id("alice")).unwrap_err();
    assert!(matches!(err.kind(), SessionErrorKind::AlreadyInMatch(_, _)));
}

#[test]
fn test_create_match_unknown_connection() {
    let mut registry = setup_registry(&["ember"]);
    let err = registry.create_match(&id("nobody")).unwrap_err();
    assert!(matches!(err.kind(), SessionErrorKind::UnknownConnection(_)));
}

#[test]
fn test_create_match_retries_taken_names() {
    let mut registry = setup_registry(&["ember", "ember", "harbor"]);
    registry.create_match(&id("alice")).expect("Create failed");
    let game = registry.create_match(&id("bob")).expect("Create failed");
    assert_eq!(game.name(), "harbor");
}

#[test]
fn test_create_match_name_exhausted() {
    let naming = ScriptedNaming::new(Vec::<String>::new(), ["ember", "ember", "ember"]);
    let mut registry = Registry::new(Box::new(naming)).with_name_attempts(2);
    registry.register_connection(id("alice"), ChannelId(1));
    registry.register_connection(id("bob"), ChannelId(2));
    registry.create_match(&id("alice")).expect("Create failed");

    let err = registry.create_match(&id("bob")).unwrap_err();
    assert_eq!(err.kind(), &SessionErrorKind::NameExhausted(2));
    assert!(registry.lookup(&id("bob")).unwrap().current_match().is_none());
}

#[test]
fn test_random_names_scale_past_noun_pool() {
    let mut registry = Registry::new(Box::new(RandomNaming));
    for n in 0..500u64 {
        let player = id(&format!("player-{n}"));
        registry.register_connection(player.clone(), ChannelId(n));
        registry.create_match(&player).expect("Create failed");
    }
    assert_eq!(registry.matches().count(), 500);

    for game in registry.matches() {
        let base = game.name().split('-').next().expect("Empty name");
        assert!((5..=8).contains(&base.len()), "{}", game.name());
    }
}

#[test]
fn test_join_match_advances_phase() {
    let mut registry = setup_registry(&["ember"]);
    registry.create_match(&id("alice")).expect("Create failed");
    let game = registry.join_match(&id("bob"), "ember").expect("Join failed");

    assert_eq!(*game.phase(), Phase::ChoosingSecrets);
    let side_b = game.side_b().as_ref().unwrap();
    assert_eq!(side_b.player(), &id("bob"));
    assert!(!*side_b.turn());
    assert_eq!(
        registry.lookup(&id("bob")).unwrap().current_match().as_deref(),
        Some("ember")
    );
}

#[test]
fn test_join_missing_match() {
    let mut registry = setup_registry(&[]);
    let err = registry.join_match(&id("bob"), "nowhere").unwrap_err();
    assert_eq!(err.kind(), &SessionErrorKind::MatchNotFound("nowhere".to_string()));
}

#[test]
fn test_join_full_match_leaves_state_unchanged() {
    let mut registry = setup_registry(&["ember"]);
    registry.create_match(&id("alice")).expect("Create failed");
    registry.join_match(&id("bob"), "ember").expect("Join failed");
    let before = registry.lookup_match("ember").unwrap().clone();

    let err = registry.join_match(&id("carol"), "ember").unwrap_err();
    assert_eq!(err.kind(), &SessionErrorKind::MatchFull("ember".to_string()));

    let after = registry.lookup_match("ember").unwrap();
    assert_eq!(after.side_b(), before.side_b());
    assert_eq!(after.phase(), before.phase());
    assert!(registry.lookup(&id("carol")).unwrap().current_match().is_none());
    assert!(after.seat_of(&id("carol")).is_err());
}

#[test]
fn test_creator_cannot_join_own_match() {
    let mut registry = setup_registry(&["ember"]);
    registry.create_match(&id("alice")).expect("Create failed");
    let err = registry.join_match(&id("alice"), "ember").unwrap_err();
    assert!(matches!(err.kind(), SessionErrorKind::AlreadyInMatch(_, _)));
}

#[test]
fn test_player_and_opponent() {
    let mut registry = setup_registry(&["ember"]);
    registry.create_match(&id("alice")).expect("Create failed");

    let (me, opponent) = registry.player_and_opponent("ember", &id("alice")).unwrap();
    assert_eq!(me.player(), &id("alice"));
    assert!(opponent.is_none());

    registry.join_match(&id("bob"), "ember").expect("Join failed");
    let (me, opponent) = registry.player_and_opponent("ember", &id("bob")).unwrap();
    assert_eq!(me.player(), &id("bob"));
    assert_eq!(opponent.unwrap().player(), &id("alice"));

    let err = registry.player_and_opponent("ember", &id("carol")).unwrap_err();
    assert!(matches!(err.kind(), SessionErrorKind::NotAParticipant(_, _)));
}

#[test]
fn test_end_match_unbinds_both() {
    let mut registry = setup_registry(&["ember"]);
    registry.create_match(&id("alice")).expect("Create failed");
    registry.join_match(&id("bob"), "ember").expect("Join failed");

    let removed = registry.end_match(&id("bob")).expect("End failed");
    assert_eq!(removed.unwrap().name(), "ember");
    assert!(registry.lookup_match("ember").is_none());
    assert!(registry.lookup(&id("alice")).unwrap().current_match().is_none());
    assert!(registry.lookup(&id("bob")).unwrap().current_match().is_none());

    // both are free to pair again
    registry.create_match(&id("alice")).expect("Create failed");
}

#[test]
fn test_end_match_without_match_is_noop() {
    let mut registry = setup_registry(&[]);
    assert!(registry.end_match(&id("alice")).unwrap().is_none());
    assert!(registry.end_match(&id("nobody")).is_err());
}

#[test]
fn test_new_round_on_missing_match_is_noop() {
    let mut registry = setup_registry(&[]);
    let t = registry.start_new_round(&id("alice"), "nowhere").unwrap();
    assert_eq!(t, Transition::Ignored(NoOp::NoSuchMatch));
}

#[test]
fn test_new_round_requires_participant() {
    let mut registry = setup_registry(&["ember"]);
    registry.create_match(&id("alice")).expect("Create failed");
    registry.join_match(&id("bob"), "ember").expect("Join failed");
    let err = registry.start_new_round(&id("carol"), "ember").unwrap_err();
    assert!(matches!(err.kind(), SessionErrorKind::NotAParticipant(_, _)));
}

#[test]
fn test_rebind_and_players_on_channel() {
    let mut registry = setup_registry(&[]);
    registry.rebind_channel(&id("alice"), ChannelId(2)).expect("Rebind failed");

    let mut on_two = registry.players_on_channel(ChannelId(2));
    on_two.sort();
    assert_eq!(on_two, vec![id("alice"), id("bob")]);
    assert!(registry.players_on_channel(ChannelId(1)).is_empty());
}

#[test]
fn test_issue_connection_id_skips_taken() {
    let naming = ScriptedNaming::new(["alice", "dave"], Vec::<String>::new());
    let mut registry = Registry::new(Box::new(naming));
    registry.register_connection(id("alice"), ChannelId(1));
    assert_eq!(registry.issue_connection_id().unwrap(), id("dave"));
}

#[test]
fn test_seats_resolve_by_tag() {
    let mut registry = setup_registry(&["ember"]);
    registry.create_match(&id("alice")).expect("Create failed");
    registry.join_match(&id("bob"), "ember").expect("Join failed");
    let game = registry.lookup_match("ember").unwrap();
    assert_eq!(game.seat_of(&id("alice")).unwrap(), SideTag::A);
    assert_eq!(game.seat_of(&id("bob")).unwrap(), SideTag::B);
}
