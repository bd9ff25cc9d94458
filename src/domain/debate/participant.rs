//! Participant entity and its mutable aggregate score.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ParticipantId, RoomId, Timestamp, UserId};

/// Role a participant plays within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Debater,
    Spectator,
}

/// The three LCR sub-scores carried by each debater.
///
/// Written only by the score aggregator after a debate completes; all zeros
/// until then.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreCard {
    pub logic: f64,
    pub credibility: f64,
    pub rhetoric: f64,
}

impl ScoreCard {
    pub fn new(logic: f64, credibility: f64, rhetoric: f64) -> Self {
        Self {
            logic,
            credibility,
            rhetoric,
        }
    }
}

/// A user's membership in a single room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub role: Role,
    /// Team label in team-format debates ("A", "B", or a custom name).
    pub team: Option<String>,
    pub score: ScoreCard,
    pub joined_at: Timestamp,
}

impl Participant {
    /// Creates a new participant with a zeroed score card.
    pub fn new(room_id: RoomId, user_id: UserId, role: Role) -> Self {
        Self {
            id: ParticipantId::new(),
            room_id,
            user_id,
            role,
            team: None,
            score: ScoreCard::default(),
            joined_at: Timestamp::now(),
        }
    }

    /// Assigns a team label.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn is_debater(&self) -> bool {
        self.role == Role::Debater
    }

    /// True if this participant carries the given team label.
    pub fn on_team(&self, team: &str) -> bool {
        self.team.as_deref() == Some(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_participant_has_zero_scores() {
        let p = Participant::new(RoomId::new(), UserId::new(), Role::Debater);
        assert_eq!(p.score, ScoreCard::default());
        assert!(p.is_debater());
        assert!(p.team.is_none());
    }

    #[test]
    fn on_team_matches_label() {
        let p = Participant::new(RoomId::new(), UserId::new(), Role::Debater).with_team("A");
        assert!(p.on_team("A"));
        assert!(!p.on_team("B"));
    }

    #[test]
    fn spectators_are_not_debaters() {
        let p = Participant::new(RoomId::new(), UserId::new(), Role::Spectator);
        assert!(!p.is_debater());
    }
}
