//! Result repository port.

use async_trait::async_trait;

use crate::domain::debate::DebateResult;
use crate::domain::foundation::{DomainError, RoomId};

/// Durable storage for debate results.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Persists a result.
    ///
    /// Fails with `ErrorCode::ResultAlreadyExists` if the room already has
    /// one; results are immutable and unique per room.
    async fn create(&self, result: &DebateResult) -> Result<(), DomainError>;

    /// Fetches the result for a room, if any.
    async fn get_by_room(&self, room_id: &RoomId) -> Result<Option<DebateResult>, DomainError>;
}
