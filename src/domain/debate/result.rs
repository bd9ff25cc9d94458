//! Debate result - the immutable terminal record of a room.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{ParticipantId, ResultId, RoomId, Timestamp};

/// Aggregated scores for one debater in the final result.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticipantScore {
    pub logic: f64,
    pub credibility: f64,
    pub rhetoric: f64,
    pub weighted_total: f64,
}

/// Qualitative feedback for one debater in the final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantFeedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<String>,
    /// Personalized text merged in from the judge's final verdict, if any.
    pub ai_insights: Option<String>,
}

impl ParticipantFeedback {
    /// Placeholder feedback for a debater who never submitted a turn.
    pub fn placeholder() -> Self {
        Self {
            strengths: vec!["Participated in the debate".to_string()],
            weaknesses: vec!["Submit more turns to get detailed feedback".to_string()],
            improvements: vec!["Engage more actively in future debates".to_string()],
            ai_insights: None,
        }
    }
}

/// The terminal record of a completed debate.
///
/// Created exactly once per room by the result pipeline, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateResult {
    pub id: ResultId,
    pub room_id: RoomId,
    pub winner_id: Option<ParticipantId>,
    pub scores: HashMap<ParticipantId, ParticipantScore>,
    pub feedback: HashMap<ParticipantId, ParticipantFeedback>,
    pub summary: String,
    /// Flat spectator reaction count per target debater.
    pub spectator_influence: HashMap<ParticipantId, u32>,
    pub created_at: Timestamp,
}

impl DebateResult {
    pub fn new(room_id: RoomId, summary: impl Into<String>) -> Self {
        Self {
            id: ResultId::new(),
            room_id,
            winner_id: None,
            scores: HashMap::new(),
            feedback: HashMap::new(),
            summary: summary.into(),
            spectator_influence: HashMap::new(),
            created_at: Timestamp::now(),
        }
    }
}
