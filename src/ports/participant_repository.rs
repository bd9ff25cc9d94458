//! Participant repository port.

use async_trait::async_trait;

use crate::domain::debate::{Participant, Role, ScoreCard};
use crate::domain::foundation::{DomainError, ParticipantId, RoomId, UserId};

/// Durable storage for room participants.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Fetches a participant by id.
    async fn get(&self, id: &ParticipantId) -> Result<Option<Participant>, DomainError>;

    /// Lists participants in a room, optionally filtered by role.
    async fn find_by_room(
        &self,
        room_id: &RoomId,
        role: Option<Role>,
    ) -> Result<Vec<Participant>, DomainError>;

    /// Resolves a user's participation in a room, if any.
    async fn find_by_user_and_room(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> Result<Option<Participant>, DomainError>;

    /// Persists a new participant.
    async fn create(&self, participant: &Participant) -> Result<(), DomainError>;

    /// Writes a participant's aggregate score card.
    ///
    /// Called only by the score aggregation step of the result pipeline.
    async fn update_score(&self, id: &ParticipantId, score: ScoreCard) -> Result<(), DomainError>;
}
