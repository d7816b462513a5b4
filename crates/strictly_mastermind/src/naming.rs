//! Connection id and match name generation.

use crate::ConnectionId;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::VecDeque;
use tracing::instrument;

/// Supplies fresh connection ids and candidate match names.
///
/// Match names need not be unique; the registry retries on collision,
/// passing the zero-based `attempt` so later candidates can widen the pool.
pub trait Naming: Send {
    /// Returns a new connection identifier.
    fn next_connection_id(&mut self) -> ConnectionId;

    /// Returns a candidate match name for the given retry `attempt`.
    fn next_match_name(&mut self, attempt: usize) -> String;
}

/// Nouns of five to eight letters used for match names.
const NOUNS: &[&str] = &[
    "ember", "harbor", "lantern", "meadow", "pebble", "willow", "falcon", "canyon", "thistle",
    "orchard", "beacon", "cobalt", "quarry", "saddle", "tundra", "walnut", "glacier", "marble",
    "anchor", "bramble", "cinder", "dagger", "engine", "furnace", "garden", "hammock", "island",
    "jasper", "kettle", "ladder", "mitten", "nectar", "oyster", "parcel", "quiver", "riddle",
    "sparrow", "timber", "usher", "velvet", "wagon", "yarrow", "zephyr", "almond", "basket",
    "candle", "donkey", "feather", "goblet", "helmet", "insect", "jungle", "kitten", "lemon",
    "magnet", "needle", "outpost", "pepper", "rocket", "shadow", "turtle", "valley", "whisker",
];

/// Range of the numeric suffix appended to retried match names.
const SUFFIX_RANGE: u32 = 10_000;

/// Default naming: random UUIDs for connections, random nouns for matches.
///
/// The first candidate is a bare noun. Retries append a four-digit suffix
/// (`ember-0417`), so the pool only runs dry after hundreds of thousands of
/// live matches.
#[derive(Debug, Default)]
pub struct RandomNaming;

impl Naming for RandomNaming {
    #[instrument(skip(self))]
    fn next_connection_id(&mut self) -> ConnectionId {
        ConnectionId::from(uuid::Uuid::new_v4().to_string())
    }

    #[instrument(skip(self))]
    fn next_match_name(&mut self, attempt: usize) -> String {
        let mut rng = rand::rng();
        let noun = NOUNS.choose(&mut rng).copied().unwrap_or("match");
        if attempt == 0 {
            noun.to_string()
        } else {
            format!("{}-{:04}", noun, rng.random_range(0..SUFFIX_RANGE))
        }
    }
}

/// Test double that replays fixed sequences, for deterministic sessions.
///
/// Once a sequence runs dry, ids fall back to `conn-N` and names to
/// `match-N`.
#[derive(Debug, Default)]
pub struct ScriptedNaming {
    ids: VecDeque<String>,
    names: VecDeque<String>,
    issued: usize,
}

impl ScriptedNaming {
    /// Creates naming that hands out `ids` and `names` in order.
    pub fn new<I, N>(ids: I, names: N) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            names: names.into_iter().map(Into::into).collect(),
            issued: 0,
        }
    }
}

impl Naming for ScriptedNaming {
    fn next_connection_id(&mut self) -> ConnectionId {
        self.issued += 1;
        let id = self
            .ids
            .pop_front()
            .unwrap_or_else(|| format!("conn-{}", self.issued));
        ConnectionId::from(id)
    }

    fn next_match_name(&mut self, _attempt: usize) -> String {
        self.issued += 1;
        self.names
            .pop_front()
            .unwrap_or_else(|| format!("match-{}", self.issued))
    }
}
