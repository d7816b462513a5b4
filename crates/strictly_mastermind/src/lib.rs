//! Strictly Mastermind - two-player number mastermind session logic.
//!
//! Players each choose a secret four-digit sequence, then take turns
//! guessing the opponent's. This crate holds everything that has real
//! invariants and no I/O:
//!
//! - **Digits**: sequences and the guess scorer
//! - **Player**: per-connection records
//! - **Game**: the [`Match`] state machine
//! - **Registry**: pairing connections into matches
//! - **View**: redacted per-recipient projections
//!
//! [`RandomNaming`] is the production id and name source.
//! [`ScriptedNaming`] is a test double that replays fixed ids and names so
//! sessions can be asserted on exactly; servers should not use it.
//!
//! # Example
//!
//! ```
//! use strictly_mastermind::{ChannelId, Phase, Registry, ScriptedNaming};
//!
//! # fn main() -> Result<(), strictly_mastermind::SessionError> {
//! let mut registry = Registry::new(Box::new(ScriptedNaming::new(["a", "b"], ["ember"])));
//! let alice = registry.issue_connection_id()?;
//! registry.register_connection(alice.clone(), ChannelId(1));
//! let game = registry.create_match(&alice)?;
//! assert_eq!(game.name(), "ember");
//! assert_eq!(*game.phase(), Phase::AwaitingSecondPlayer);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod digits;
mod error;
mod game;
mod naming;
mod player;
mod registry;
mod view;

pub use digits::{Digits, DigitsError, SEQUENCE_LEN, Score, score};
pub use error::{SessionError, SessionErrorKind};
pub use game::{GuessResult, Match, NoOp, Phase, Side, SideTag, Transition};
pub use naming::{Naming, RandomNaming, ScriptedNaming};
pub use player::{ChannelId, ConnectionId, Player, PlayerView};
pub use registry::{DEFAULT_NAME_ATTEMPTS, Registry, Roster};
pub use view::{MatchView, SideView, project, project_all};
