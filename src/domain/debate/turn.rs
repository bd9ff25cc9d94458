//! Turn entity - a single contribution within a round.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ParticipantId, RoomId, Timestamp, TurnId};

/// Structured judge feedback for one turn.
///
/// Scores are on a 0-10 scale. Set at most once per turn, never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnFeedback {
    pub logic: f64,
    pub credibility: f64,
    pub rhetoric: f64,
    pub commentary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

/// One participant's contribution within a round.
///
/// Ordered by `(round_number, turn_number)` for transcripts and by
/// `submitted_at` for alternation checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub room_id: RoomId,
    pub speaker_id: ParticipantId,
    pub content: String,
    /// Reference to the raw audio this turn was transcribed from, if any.
    pub audio_url: Option<String>,
    pub round_number: u32,
    pub turn_number: u32,
    pub feedback: Option<TurnFeedback>,
    pub submitted_at: Timestamp,
}

impl Turn {
    /// Creates a new unanalyzed turn stamped with the current time.
    pub fn new(
        room_id: RoomId,
        speaker_id: ParticipantId,
        content: impl Into<String>,
        round_number: u32,
        turn_number: u32,
    ) -> Self {
        Self {
            id: TurnId::new(),
            room_id,
            speaker_id,
            content: content.into(),
            audio_url: None,
            round_number,
            turn_number,
            feedback: None,
            submitted_at: Timestamp::now(),
        }
    }

    /// Attaches the audio reference the content was transcribed from.
    pub fn with_audio(mut self, audio_url: impl Into<String>) -> Self {
        self.audio_url = Some(audio_url.into());
        self
    }

    /// True once judge feedback has been recorded.
    pub fn is_analyzed(&self) -> bool {
        self.feedback.is_some()
    }
}
