//! In-memory implementation of every entity store port.
//!
//! Backs the orchestrator in tests and single-process deployments. Writes
//! go through a single `RwLock`, so individual operations are atomic, but
//! the orchestrator's read-validate-write sequences still rely on the
//! per-room exclusive section for correctness.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::debate::{
    DebateResult, DebateStatus, Participant, Role, Room, ScoreCard, SpectatorReaction, Turn,
    TurnFeedback,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, ParticipantId, RoomCode, RoomId, TurnId, UserId,
};
use crate::ports::{
    ParticipantRepository, ReactionRepository, ResultRepository, RoomRepository, TurnRepository,
};

#[derive(Debug, Default)]
struct State {
    rooms: HashMap<RoomId, Room>,
    participants: HashMap<ParticipantId, Participant>,
    turns: Vec<Turn>,
    results: HashMap<RoomId, DebateResult>,
    reactions: Vec<SpectatorReaction>,
}

/// In-memory entity store implementing all repository ports.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a participant directly; test setup helper.
    pub async fn add_participant(&self, participant: Participant) {
        let mut state = self.state.write().await;
        state
            .participants
            .insert(participant.id, participant);
    }

    /// Seeds a spectator reaction directly; test setup helper.
    pub async fn add_reaction(&self, reaction: SpectatorReaction) {
        self.state.write().await.reactions.push(reaction);
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn get(&self, id: &RoomId) -> Result<Option<Room>, DomainError> {
        Ok(self.state.read().await.rooms.get(id).cloned())
    }

    async fn get_by_code(&self, code: &RoomCode) -> Result<Option<Room>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .rooms
            .values()
            .find(|r| r.code == *code)
            .cloned())
    }

    async fn create(&self, room: &Room) -> Result<(), DomainError> {
        self.state.write().await.rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn update_status(&self, id: &RoomId, status: DebateStatus) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let room = state
            .rooms
            .get_mut(id)
            .ok_or_else(|| DomainError::new(ErrorCode::RoomNotFound, format!("Room not found: {}", id)))?;
        room.status = status;
        Ok(())
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryStore {
    async fn get(&self, id: &ParticipantId) -> Result<Option<Participant>, DomainError> {
        Ok(self.state.read().await.participants.get(id).cloned())
    }

    async fn find_by_room(
        &self,
        room_id: &RoomId,
        role: Option<Role>,
    ) -> Result<Vec<Participant>, DomainError> {
        let state = self.state.read().await;
        let mut found: Vec<Participant> = state
            .participants
            .values()
            .filter(|p| p.room_id == *room_id && role.map_or(true, |r| p.role == r))
            .cloned()
            .collect();
        found.sort_by_key(|p| p.joined_at);
        Ok(found)
    }

    async fn find_by_user_and_room(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> Result<Option<Participant>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .participants
            .values()
            .find(|p| p.user_id == *user_id && p.room_id == *room_id)
            .cloned())
    }

    async fn create(&self, participant: &Participant) -> Result<(), DomainError> {
        self.state
            .write()
            .await
            .participants
            .insert(participant.id, participant.clone());
        Ok(())
    }

    async fn update_score(&self, id: &ParticipantId, score: ScoreCard) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let participant = state.participants.get_mut(id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ParticipantNotFound,
                format!("Participant not found: {}", id),
            )
        })?;
        participant.score = score;
        Ok(())
    }
}

#[async_trait]
impl TurnRepository for InMemoryStore {
    async fn create(&self, turn: &Turn) -> Result<(), DomainError> {
        self.state.write().await.turns.push(turn.clone());
        Ok(())
    }

    async fn find_by_room(&self, room_id: &RoomId) -> Result<Vec<Turn>, DomainError> {
        let state = self.state.read().await;
        let mut turns: Vec<Turn> = state
            .turns
            .iter()
            .filter(|t| t.room_id == *room_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for identical timestamps.
        turns.sort_by_key(|t| t.submitted_at);
        Ok(turns)
    }

    async fn set_feedback(&self, id: &TurnId, feedback: TurnFeedback) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let turn = state
            .turns
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| DomainError::new(ErrorCode::TurnNotFound, format!("Turn not found: {}", id)))?;
        // Write-once: the first feedback wins.
        if turn.feedback.is_none() {
            turn.feedback = Some(feedback);
        }
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for InMemoryStore {
    async fn create(&self, result: &DebateResult) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.results.contains_key(&result.room_id) {
            return Err(DomainError::new(
                ErrorCode::ResultAlreadyExists,
                format!("Result already exists for room {}", result.room_id),
            ));
        }
        state.results.insert(result.room_id, result.clone());
        Ok(())
    }

    async fn get_by_room(&self, room_id: &RoomId) -> Result<Option<DebateResult>, DomainError> {
        Ok(self.state.read().await.results.get(room_id).cloned())
    }
}

#[async_trait]
impl ReactionRepository for InMemoryStore {
    async fn find_by_room(&self, room_id: &RoomId) -> Result<Vec<SpectatorReaction>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .reactions
            .iter()
            .filter(|r| r.room_id == *room_id)
            .cloned()
            .collect())
    }
}
