//! Host-initiated debate end.
//!
//! Ends an ongoing debate before its rounds run out and produces the
//! result synchronously. Races the round monitor's automatic completion
//! for the same transition; whichever fires it first finalizes.

use std::sync::Arc;
use tracing::info;

use crate::application::{invalidate_quietly, FinalizeDebateHandler, RoomLocks};
use crate::domain::debate::{DebateError, DebateResult, DebateStatus};
use crate::domain::foundation::{RoomId, UserId};
use crate::ports::{code_key, status_key, transcript_key, RoomCache, RoomRepository};

/// A host's request to end a debate early.
#[derive(Debug, Clone)]
pub struct EndDebateCommand {
    pub room_id: RoomId,
    pub user_id: UserId,
}

/// Handler for ending a debate on the host's request.
pub struct EndDebateHandler {
    rooms: Arc<dyn RoomRepository>,
    cache: Arc<dyn RoomCache>,
    locks: Arc<RoomLocks>,
    finalizer: Arc<FinalizeDebateHandler>,
}

impl EndDebateHandler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        cache: Arc<dyn RoomCache>,
        locks: Arc<RoomLocks>,
        finalizer: Arc<FinalizeDebateHandler>,
    ) -> Self {
        Self {
            rooms,
            cache,
            locks,
            finalizer,
        }
    }

    pub async fn handle(&self, cmd: EndDebateCommand) -> Result<DebateResult, DebateError> {
        let room = {
            let lock = self.locks.lock_for(&cmd.room_id);
            let _guard = lock.lock().await;

            let room = self
                .rooms
                .get(&cmd.room_id)
                .await?
                .ok_or(DebateError::RoomNotFound(cmd.room_id))?;
            if room.host != cmd.user_id {
                return Err(DebateError::NotHost);
            }
            if room.status != DebateStatus::Ongoing {
                return Err(DebateError::DebateNotOngoing {
                    status: room.status,
                });
            }
            self.rooms
                .update_status(&room.id, DebateStatus::Completed)
                .await?;
            room
        };

        invalidate_quietly(
            self.cache.as_ref(),
            &[
                status_key(&room.id),
                transcript_key(&room.id),
                code_key(&room.code),
            ],
        )
        .await;
        info!(room_id = %room.id, "debate ended by host");

        let mut completed = room;
        completed.status = DebateStatus::Completed;
        self.finalizer.finalize(&completed).await
    }
}
