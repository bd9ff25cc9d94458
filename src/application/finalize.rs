//! Result pipeline - aggregates scores, decides the winner, and persists
//! the single terminal result of a debate.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::judge::FallbackJudge;
use crate::application::invalidate_quietly;
use crate::domain::debate::{
    scoring, DebateError, DebateResult, ParticipantFeedback, ParticipantScore, Role, Room, Turn,
};
use crate::domain::foundation::{ErrorCode, ParticipantId};
use crate::ports::{
    status_key, DebateJudge, ParticipantRepository, ReactionRepository, ResultRepository,
    RoomCache, TurnRepository,
};

/// Builds and persists the final result of a completed debate.
///
/// Runs exactly once per room: the caller fires it from the single
/// `Ongoing` to `Completed` transition, and the result store refuses a
/// second result as a backstop.
pub struct FinalizeDebateHandler {
    participants: Arc<dyn ParticipantRepository>,
    turns: Arc<dyn TurnRepository>,
    results: Arc<dyn ResultRepository>,
    reactions: Arc<dyn ReactionRepository>,
    judge: Arc<dyn DebateJudge>,
    cache: Arc<dyn RoomCache>,
}

impl FinalizeDebateHandler {
    pub fn new(
        participants: Arc<dyn ParticipantRepository>,
        turns: Arc<dyn TurnRepository>,
        results: Arc<dyn ResultRepository>,
        reactions: Arc<dyn ReactionRepository>,
        judge: Arc<dyn DebateJudge>,
        cache: Arc<dyn RoomCache>,
    ) -> Self {
        Self {
            participants,
            turns,
            results,
            reactions,
            judge,
            cache,
        }
    }

    /// Aggregates scores and persists the result for `room`.
    ///
    /// The judge verdict is advisory and best-effort; scores, winner, and
    /// feedback are computed locally and a verdict failure only costs the
    /// personalized summary.
    pub async fn finalize(&self, room: &Room) -> Result<DebateResult, DebateError> {
        let debaters = self
            .participants
            .find_by_room(&room.id, Some(Role::Debater))
            .await?;
        let turns = self.turns.find_by_room(&room.id).await?;

        let mut scores: HashMap<ParticipantId, ParticipantScore> = HashMap::new();
        let mut feedback: HashMap<ParticipantId, ParticipantFeedback> = HashMap::new();

        for debater in &debaters {
            let own_turns: Vec<&Turn> =
                turns.iter().filter(|t| t.speaker_id == debater.id).collect();
            let card = scoring::aggregate(&own_turns);
            self.participants.update_score(&debater.id, card).await?;
            scores.insert(debater.id, scoring::participant_score(&card));

            if own_turns.is_empty() {
                feedback.insert(debater.id, ParticipantFeedback::placeholder());
            } else {
                let (strengths, weaknesses) = scoring::pooled_feedback(&own_turns);
                feedback.insert(
                    debater.id,
                    ParticipantFeedback {
                        strengths,
                        weaknesses,
                        improvements: scoring::improvements(),
                        ai_insights: None,
                    },
                );
            }
        }

        let winner_id = pick_winner(&turns, &scores);

        let summary = match self.judge.final_verdict(room, &turns, &scores).await {
            Ok(verdict) => {
                for (id, insight) in verdict.feedback {
                    if let Some(entry) = feedback.get_mut(&id) {
                        entry.ai_insights = Some(insight);
                    }
                }
                verdict.summary
            }
            Err(error) => {
                warn!(room_id = %room.id, %error, "verdict generation failed, using generic summary");
                FallbackJudge::fallback_summary(&room.topic)
            }
        };

        let mut spectator_influence: HashMap<ParticipantId, u32> = HashMap::new();
        for reaction in self.reactions.find_by_room(&room.id).await? {
            *spectator_influence.entry(reaction.target_id).or_insert(0) += 1;
        }

        let mut result = DebateResult::new(room.id, summary);
        result.winner_id = winner_id;
        result.scores = scores;
        result.feedback = feedback;
        result.spectator_influence = spectator_influence;

        self.results.create(&result).await.map_err(|e| {
            if e.code == ErrorCode::ResultAlreadyExists {
                DebateError::ResultAlreadyExists(room.id)
            } else {
                DebateError::from(e)
            }
        })?;

        invalidate_quietly(self.cache.as_ref(), &[status_key(&room.id)]).await;

        info!(
            room_id = %room.id,
            result_id = %result.id,
            winner = ?result.winner_id,
            "debate result persisted"
        );
        Ok(result)
    }
}

/// Highest weighted total among debaters with at least one analyzed turn.
///
/// Ties break to the lowest participant id so reruns over the same data
/// pick the same winner. Debaters whose turns all failed analysis are
/// excluded rather than winning on a zero-filled card.
fn pick_winner(
    turns: &[Turn],
    scores: &HashMap<ParticipantId, ParticipantScore>,
) -> Option<ParticipantId> {
    let mut best: Option<(ParticipantId, f64)> = None;
    for (id, score) in scores {
        let has_analyzed = turns
            .iter()
            .any(|t| t.speaker_id == *id && t.is_analyzed());
        if !has_analyzed {
            continue;
        }
        best = match best {
            None => Some((*id, score.weighted_total)),
            Some((best_id, best_total)) => {
                if score.weighted_total > best_total
                    || (score.weighted_total == best_total && *id < best_id)
                {
                    Some((*id, score.weighted_total))
                } else {
                    Some((best_id, best_total))
                }
            }
        };
    }
    best.map(|(id, _)| id)
}
