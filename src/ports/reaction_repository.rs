//! Spectator reaction repository port.

use async_trait::async_trait;

use crate::domain::debate::SpectatorReaction;
use crate::domain::foundation::{DomainError, RoomId};

/// Read access to spectator reactions.
///
/// Reactions are written by the spectator-facing collaborator; the result
/// pipeline only tallies them.
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Lists all reactions recorded for a room.
    async fn find_by_room(&self, room_id: &RoomId) -> Result<Vec<SpectatorReaction>, DomainError>;
}
