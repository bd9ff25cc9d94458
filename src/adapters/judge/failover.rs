//! Failover judge - tries the primary judge and degrades to a fallback on
//! any error, so a flaky or unconfigured AI backend never blocks a debate.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::domain::debate::{ParticipantScore, Room, Turn, TurnFeedback};
use crate::domain::foundation::ParticipantId;
use crate::ports::{DebateJudge, JudgeError, Verdict};

/// Wraps a primary judge with a fallback used whenever the primary errors.
pub struct FailoverJudge {
    primary: Arc<dyn DebateJudge>,
    fallback: Arc<dyn DebateJudge>,
}

impl FailoverJudge {
    pub fn new(primary: Arc<dyn DebateJudge>, fallback: Arc<dyn DebateJudge>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl DebateJudge for FailoverJudge {
    async fn analyze_turn(&self, content: &str, topic: &str) -> Result<TurnFeedback, JudgeError> {
        match self.primary.analyze_turn(content, topic).await {
            Ok(feedback) => Ok(feedback),
            Err(error) => {
                warn!(%error, "primary judge failed to analyze turn, using fallback");
                self.fallback.analyze_turn(content, topic).await
            }
        }
    }

    async fn final_verdict(
        &self,
        room: &Room,
        turns: &[Turn],
        scores: &HashMap<ParticipantId, ParticipantScore>,
    ) -> Result<Verdict, JudgeError> {
        match self.primary.final_verdict(room, turns, scores).await {
            Ok(verdict) => Ok(verdict),
            Err(error) => {
                warn!(%error, "primary judge failed to produce verdict, using fallback");
                self.fallback.final_verdict(room, turns, scores).await
            }
        }
    }

    async fn transcribe_audio(&self, audio_url: &str) -> Result<String, JudgeError> {
        match self.primary.transcribe_audio(audio_url).await {
            Ok(transcript) => Ok(transcript),
            Err(error) => {
                warn!(%error, "primary judge failed to transcribe audio, using fallback");
                self.fallback.transcribe_audio(audio_url).await
            }
        }
    }
}
