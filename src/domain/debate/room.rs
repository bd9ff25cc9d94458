//! Room aggregate - the debate itself and its lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    RoomCode, RoomId, StateMachine, Timestamp, UserId, ValidationError,
};

/// Default number of rounds when a room is created without one.
pub const DEFAULT_ROUNDS: u32 = 3;

/// Lifecycle status of a debate room.
///
/// `Completed` and `Cancelled` are terminal; turns may only be created
/// while the room is `Ongoing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl StateMachine for DebateStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DebateStatus::*;
        matches!(
            (self, target),
            (Upcoming, Ongoing)
                | (Upcoming, Cancelled)
                | (Ongoing, Completed)
                | (Ongoing, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DebateStatus::*;
        match self {
            Upcoming => vec![Ongoing, Cancelled],
            Ongoing => vec![Completed, Cancelled],
            Completed | Cancelled => vec![],
        }
    }
}

impl fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebateStatus::Upcoming => "upcoming",
            DebateStatus::Ongoing => "ongoing",
            DebateStatus::Completed => "completed",
            DebateStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Whether participants debate individually or as two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateFormat {
    Individual,
    Team,
}

/// A debate room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub topic: String,
    pub description: Option<String>,
    pub code: RoomCode,
    pub host: UserId,
    /// Configured number of rounds; each debater submits one turn per round.
    pub rounds: u32,
    pub format: DebateFormat,
    pub status: DebateStatus,
    pub created_at: Timestamp,
}

impl Room {
    /// Creates a new upcoming room.
    pub fn new(
        topic: impl Into<String>,
        code: RoomCode,
        host: UserId,
        rounds: u32,
        format: DebateFormat,
    ) -> Result<Self, ValidationError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(ValidationError::empty_field("topic"));
        }
        if rounds == 0 {
            return Err(ValidationError::out_of_range("rounds", 1, i64::MAX, 0));
        }
        Ok(Self {
            id: RoomId::new(),
            topic,
            description: None,
            code,
            host,
            rounds,
            format,
            status: DebateStatus::Upcoming,
            created_at: Timestamp::now(),
        })
    }

    /// Creates a new upcoming room with the default round count.
    pub fn with_default_rounds(
        topic: impl Into<String>,
        code: RoomCode,
        host: UserId,
        format: DebateFormat,
    ) -> Result<Self, ValidationError> {
        Self::new(topic, code, host, DEFAULT_ROUNDS, format)
    }

    /// Sets the optional free-text description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True while turns may be accepted.
    pub fn is_ongoing(&self) -> bool {
        self.status == DebateStatus::Ongoing
    }

    /// True for team-format debates.
    pub fn is_team_format(&self) -> bool {
        self.format == DebateFormat::Team
    }

    /// Total turns this debate holds when every round is full.
    pub fn expected_turns(&self, debater_count: usize) -> usize {
        self.rounds as usize * debater_count
    }
}
