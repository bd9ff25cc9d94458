//! Room repository port.

use async_trait::async_trait;

use crate::domain::debate::{DebateStatus, Room};
use crate::domain::foundation::{DomainError, RoomCode, RoomId};

/// Durable storage for rooms.
///
/// The orchestrator never mutates a room other than its status; everything
/// else is owned by the room-management collaborator.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Fetches a room by id.
    async fn get(&self, id: &RoomId) -> Result<Option<Room>, DomainError>;

    /// Fetches a room by its join code.
    async fn get_by_code(&self, code: &RoomCode) -> Result<Option<Room>, DomainError>;

    /// Persists a new room.
    async fn create(&self, room: &Room) -> Result<(), DomainError>;

    /// Updates a room's lifecycle status.
    async fn update_status(&self, id: &RoomId, status: DebateStatus) -> Result<(), DomainError>;
}
