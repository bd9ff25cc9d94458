//! Turn repository port.

use async_trait::async_trait;

use crate::domain::debate::{Turn, TurnFeedback};
use crate::domain::foundation::{DomainError, RoomId, TurnId};

/// Durable storage for debate turns.
#[async_trait]
pub trait TurnRepository: Send + Sync {
    /// Persists a new turn.
    async fn create(&self, turn: &Turn) -> Result<(), DomainError>;

    /// Lists all turns of a room ordered by submission time ascending.
    async fn find_by_room(&self, room_id: &RoomId) -> Result<Vec<Turn>, DomainError>;

    /// Records judge feedback on a turn.
    ///
    /// Feedback is write-once: if the turn already carries feedback the
    /// first value is kept and this call is a no-op, so concurrent
    /// analyses cannot overwrite each other.
    async fn set_feedback(&self, id: &TurnId, feedback: TurnFeedback) -> Result<(), DomainError>;
}
