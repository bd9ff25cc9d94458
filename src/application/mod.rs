//! Application layer - orchestration handlers over the ports.
//!
//! Each handler owns one operation: turn submission, round monitoring,
//! result finalization, host-initiated end, and the cached read queries.
//! `DebateOrchestrator` wires them together from a set of adapters.

mod end_debate;
mod finalize;
mod queries;
mod room_locks;
mod round_monitor;
mod submit_turn;

pub use end_debate::{EndDebateCommand, EndDebateHandler};
pub use finalize::FinalizeDebateHandler;
pub use queries::{DebateQueries, ParticipantView, StatusView, DEFAULT_CACHE_TTL};
pub use room_locks::RoomLocks;
pub use round_monitor::RoundMonitor;
pub use submit_turn::{SubmitTurnCommand, SubmitTurnHandler, SubmitTurnOutcome};

use std::sync::Arc;
use tracing::warn;

use crate::ports::{
    DebateJudge, ParticipantRepository, ReactionRepository, ResultRepository, RoomCache,
    RoomRepository, TurnRepository,
};

/// Drops cache entries, logging failures instead of surfacing them.
///
/// Invalidation is best effort: a failed delete leaves a stale entry that
/// expires with its TTL.
pub(crate) async fn invalidate_quietly(cache: &dyn RoomCache, keys: &[String]) {
    for key in keys {
        if let Err(error) = cache.invalidate(key).await {
            warn!(key, %error, "cache invalidation failed");
        }
    }
}

/// The full set of handlers wired over one adapter stack.
pub struct DebateOrchestrator {
    pub submit_turn: SubmitTurnHandler,
    pub end_debate: EndDebateHandler,
    pub queries: DebateQueries,
}

impl DebateOrchestrator {
    /// Wires every handler from the given adapters. The lock registry and
    /// finalizer are shared so submission, monitoring, and host end all
    /// serialize on the same per-room mutexes and result pipeline.
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        participants: Arc<dyn ParticipantRepository>,
        turns: Arc<dyn TurnRepository>,
        results: Arc<dyn ResultRepository>,
        reactions: Arc<dyn ReactionRepository>,
        judge: Arc<dyn DebateJudge>,
        cache: Arc<dyn RoomCache>,
    ) -> Self {
        let locks = Arc::new(RoomLocks::new());
        let finalizer = Arc::new(FinalizeDebateHandler::new(
            participants.clone(),
            turns.clone(),
            results,
            reactions,
            judge.clone(),
            cache.clone(),
        ));
        let monitor = RoundMonitor::new(
            rooms.clone(),
            turns.clone(),
            judge.clone(),
            cache.clone(),
            locks.clone(),
            finalizer.clone(),
        );
        Self {
            submit_turn: SubmitTurnHandler::new(
                rooms.clone(),
                participants.clone(),
                turns.clone(),
                judge,
                cache.clone(),
                locks.clone(),
                monitor,
            ),
            end_debate: EndDebateHandler::new(rooms.clone(), cache.clone(), locks, finalizer),
            queries: DebateQueries::new(rooms, participants, turns, cache),
        }
    }
}
