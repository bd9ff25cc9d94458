//! Error types for debate orchestration.

use thiserror::Error;

use crate::domain::debate::DebateStatus;
use crate::domain::foundation::{DomainError, RoomId};

/// Errors surfaced by the orchestrator's operations.
///
/// Validation variants are rejections reported synchronously to the
/// submitter and never retried automatically; `Storage` wraps collaborator
/// failures from the entity store.
#[derive(Debug, Clone, Error)]
pub enum DebateError {
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("Debate has ended or was cancelled (status: {status})")]
    DebateNotOngoing { status: DebateStatus },

    #[error("Invalid round number {requested}. Debate has only {rounds} rounds.")]
    InvalidRound { requested: u32, rounds: u32 },

    #[error("Round {round} already has {capacity} turns. Wait for next round.")]
    RoundFull { round: u32, capacity: usize },

    #[error("Turn content cannot be empty")]
    EmptyContent,

    #[error("You cannot submit consecutive turns. Please wait for another participant to respond.")]
    ConsecutiveTurn,

    #[error("Your team cannot submit consecutive turns. Please wait for the other team to respond.")]
    ConsecutiveTeamTurn,

    #[error("Not a participant in this debate")]
    NotAParticipant,

    #[error("Only the host can end the debate")]
    NotHost,

    #[error("A result already exists for room {0}")]
    ResultAlreadyExists(RoomId),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

impl DebateError {
    /// True for rejections caused by the caller's request rather than by
    /// infrastructure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, DebateError::Storage(_))
    }
}
