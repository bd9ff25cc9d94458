//! Per-room exclusive sections.
//!
//! Each room gets one async mutex, created lazily on first use and kept for
//! the life of the process. Holding a room's guard serializes the
//! validate-then-persist window of turn submission and the completion
//! transition against each other. The registry lock itself is a std mutex
//! held only for the map lookup, never across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::RoomId;

/// Registry of per-room async mutexes.
#[derive(Debug, Default)]
pub struct RoomLocks {
    locks: Mutex<HashMap<RoomId, Arc<tokio::sync::Mutex<()>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room's mutex, creating it on first use.
    ///
    /// All callers asking for the same room get the same mutex, so locking
    /// the returned handle is mutual exclusion per room.
    pub fn lock_for(&self, room_id: &RoomId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(*room_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
