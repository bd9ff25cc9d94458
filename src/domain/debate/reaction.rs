//! Spectator reactions - audience support signals consumed by the
//! result pipeline as a flat tally.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ParticipantId, RoomId, Timestamp, UserId};

/// One spectator's reaction aimed at a debater.
///
/// Reaction kind is free-form (emoji label); the pipeline counts reactions
/// per target without weighting by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectatorReaction {
    pub room_id: RoomId,
    pub spectator_id: UserId,
    pub target_id: ParticipantId,
    pub kind: String,
    pub reacted_at: Timestamp,
}

impl SpectatorReaction {
    pub fn new(room_id: RoomId, spectator_id: UserId, target_id: ParticipantId, kind: impl Into<String>) -> Self {
        Self {
            room_id,
            spectator_id,
            target_id,
            kind: kind.into(),
            reacted_at: Timestamp::now(),
        }
    }
}
