//! Debate judge port - interface for the external AI scoring service.
//!
//! The judge scores individual turns with the LCR model (logic,
//! credibility, rhetoric), produces the final verdict for a completed
//! debate, and transcribes audio submissions. All methods are safe to call
//! concurrently; adapters degrade gracefully when the backing service is
//! unavailable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::debate::{ParticipantScore, Room, Turn, TurnFeedback};
use crate::domain::foundation::ParticipantId;

/// Port for AI debate judging.
#[async_trait]
pub trait DebateJudge: Send + Sync {
    /// Scores a single turn against the debate topic.
    async fn analyze_turn(&self, content: &str, topic: &str)
        -> Result<TurnFeedback, JudgeError>;

    /// Produces the final verdict for a completed debate.
    async fn final_verdict(
        &self,
        room: &Room,
        turns: &[Turn],
        scores: &HashMap<ParticipantId, ParticipantScore>,
    ) -> Result<Verdict, JudgeError>;

    /// Transcribes an audio submission into text.
    async fn transcribe_audio(&self, audio_url: &str) -> Result<String, JudgeError>;
}

/// The judge's final verdict for a debate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Verdict {
    /// The judge's pick; advisory only - the pipeline computes the winner
    /// from weighted totals.
    pub winner_id: Option<ParticipantId>,
    pub summary: String,
    /// Personalized feedback keyed by participant.
    #[serde(default)]
    pub feedback: HashMap<ParticipantId, String>,
}

/// Errors from the judge collaborator.
///
/// These never reach the submitter: failover selects the fallback judge,
/// and the analysis fan-out isolates per-turn failures.
#[derive(Debug, Clone, Error)]
pub enum JudgeError {
    #[error("Judge unavailable: {message}")]
    Unavailable { message: String },

    #[error("Judge request timed out")]
    Timeout,

    #[error("Judge returned a malformed response: {reason}")]
    Malformed { reason: String },
}

impl JudgeError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        JudgeError::Unavailable {
            message: message.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        JudgeError::Malformed {
            reason: reason.into(),
        }
    }
}
