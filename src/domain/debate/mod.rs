//! Debate domain - rooms, participants, turns, results, and scoring math.

mod errors;
mod participant;
mod reaction;
mod result;
mod room;
pub mod scoring;
mod turn;

pub use errors::DebateError;
pub use participant::{Participant, Role, ScoreCard};
pub use reaction::SpectatorReaction;
pub use result::{DebateResult, ParticipantFeedback, ParticipantScore};
pub use room::{DebateFormat, DebateStatus, Room, DEFAULT_ROUNDS};
pub use turn::{Turn, TurnFeedback};
