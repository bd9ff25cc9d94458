//! Round monitor - detects completed rounds, fans analysis out to the
//! judge, and fires the completion transition when the last round closes.
//!
//! Everything here runs off the submitter's critical path: the accepted
//! turn is already durable, and analysis plus completion happen in a
//! detached task that survives the request.

use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::{invalidate_quietly, FinalizeDebateHandler, RoomLocks};
use crate::domain::debate::{DebateStatus, Room, Turn};
use crate::ports::{
    status_key, transcript_key, DebateJudge, RoomCache, RoomRepository, TurnRepository,
};

/// Watches accepted turns for round and debate completion.
#[derive(Clone)]
pub struct RoundMonitor {
    rooms: Arc<dyn RoomRepository>,
    turns: Arc<dyn TurnRepository>,
    judge: Arc<dyn DebateJudge>,
    cache: Arc<dyn RoomCache>,
    locks: Arc<RoomLocks>,
    finalizer: Arc<FinalizeDebateHandler>,
}

impl RoundMonitor {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        turns: Arc<dyn TurnRepository>,
        judge: Arc<dyn DebateJudge>,
        cache: Arc<dyn RoomCache>,
        locks: Arc<RoomLocks>,
        finalizer: Arc<FinalizeDebateHandler>,
    ) -> Self {
        Self {
            rooms,
            turns,
            judge,
            cache,
            locks,
            finalizer,
        }
    }

    /// Called after a turn is persisted. If the turn closed its round,
    /// spawns the detached analysis task and returns its handle; tests
    /// await the handle, production callers drop it.
    ///
    /// Never fails the submission: storage hiccups here are logged and the
    /// next accepted turn retries the check.
    pub async fn on_turn_accepted(
        &self,
        room: &Room,
        debater_count: usize,
        round_number: u32,
    ) -> Option<JoinHandle<()>> {
        // Rooms seeded without debaters still run as a two-person debate.
        let debater_count = if debater_count == 0 { 2 } else { debater_count };

        let turns = match self.turns.find_by_room(&room.id).await {
            Ok(turns) => turns,
            Err(error) => {
                warn!(room_id = %room.id, %error, "round check skipped, turn listing failed");
                return None;
            }
        };

        let in_round = turns
            .iter()
            .filter(|t| t.round_number == round_number)
            .count();
        if in_round < debater_count {
            debug!(
                room_id = %room.id,
                round = round_number,
                turns = in_round,
                needed = debater_count,
                "round still open"
            );
            return None;
        }

        info!(room_id = %room.id, round = round_number, "round complete, starting analysis");
        let monitor = self.clone();
        let room = room.clone();
        Some(tokio::spawn(async move {
            monitor
                .analyze_round(room, debater_count, round_number, turns)
                .await;
        }))
    }

    /// Analyzes every unanalyzed turn of the round, then checks whether the
    /// debate itself is complete.
    async fn analyze_round(
        &self,
        room: Room,
        debater_count: usize,
        round_number: u32,
        turns: Vec<Turn>,
    ) {
        let pending: Vec<&Turn> = turns
            .iter()
            .filter(|t| t.round_number == round_number && !t.is_analyzed())
            .collect();

        // One judge call per turn, concurrently. A failed analysis leaves
        // its turn unanalyzed and never blocks the siblings.
        let analyses = pending.iter().map(|turn| async {
            match self.judge.analyze_turn(&turn.content, &room.topic).await {
                Ok(feedback) => {
                    if let Err(error) = self.turns.set_feedback(&turn.id, feedback).await {
                        warn!(turn_id = %turn.id, %error, "failed to store turn feedback");
                    }
                }
                Err(error) => {
                    warn!(turn_id = %turn.id, %error, "turn analysis failed");
                }
            }
        });
        join_all(analyses).await;

        if turns.len() >= room.expected_turns(debater_count) {
            self.complete_debate(&room).await;
        }
    }

    /// Transitions the room to `Completed` and runs the result pipeline.
    ///
    /// Re-reads the room under its lock so racing monitors (or an explicit
    /// host end) fire the transition, and therefore finalization, once.
    async fn complete_debate(&self, room: &Room) {
        let lock = self.locks.lock_for(&room.id);
        let _guard = lock.lock().await;

        let current = match self.rooms.get(&room.id).await {
            Ok(Some(current)) => current,
            Ok(None) => {
                warn!(room_id = %room.id, "room vanished before completion");
                return;
            }
            Err(error) => {
                error!(room_id = %room.id, %error, "completion check failed to load room");
                return;
            }
        };
        if current.status != DebateStatus::Ongoing {
            debug!(room_id = %room.id, status = %current.status, "debate already settled");
            return;
        }

        if let Err(error) = self
            .rooms
            .update_status(&room.id, DebateStatus::Completed)
            .await
        {
            error!(room_id = %room.id, %error, "failed to mark debate completed");
            return;
        }
        drop(_guard);

        invalidate_quietly(
            self.cache.as_ref(),
            &[status_key(&room.id), transcript_key(&room.id)],
        )
        .await;

        let mut completed = current;
        completed.status = DebateStatus::Completed;
        info!(room_id = %room.id, "all rounds complete, generating result");
        if let Err(error) = self.finalizer.finalize(&completed).await {
            error!(room_id = %room.id, %error, "result generation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryRoomCache;
    use crate::adapters::judge::MockJudge;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::debate::{DebateFormat, Participant, Role};
    use crate::domain::foundation::{RoomCode, UserId};
    use crate::ports::ResultRepository;

    struct Fixture {
        store: InMemoryStore,
        judge: Arc<MockJudge>,
        monitor: RoundMonitor,
        room: Room,
        a: Participant,
        b: Participant,
    }

    async fn fixture(rounds: u32, judge: MockJudge) -> Fixture {
        let store = InMemoryStore::new();
        let judge = Arc::new(judge);
        let cache: Arc<dyn RoomCache> = Arc::new(InMemoryRoomCache::new());
        let locks = Arc::new(RoomLocks::new());

        let mut room = Room::new(
            "Space tourism",
            RoomCode::new("MON001").unwrap(),
            UserId::new(),
            rounds,
            DebateFormat::Individual,
        )
        .unwrap();
        room.status = DebateStatus::Ongoing;
        RoomRepository::create(&store, &room).await.unwrap();

        let a = Participant::new(room.id, UserId::new(), Role::Debater);
        let b = Participant::new(room.id, UserId::new(), Role::Debater);
        store.add_participant(a.clone()).await;
        store.add_participant(b.clone()).await;

        let finalizer = Arc::new(FinalizeDebateHandler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            judge.clone(),
            cache.clone(),
        ));
        let monitor = RoundMonitor::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            judge.clone(),
            cache,
            locks,
            finalizer,
        );
        Fixture {
            store,
            judge,
            monitor,
            room,
            a,
            b,
        }
    }

    async fn submit(f: &Fixture, speaker: &Participant, round: u32, turn: u32) {
        let t = Turn::new(f.room.id, speaker.id, format!("r{}t{}", round, turn), round, turn);
        TurnRepository::create(&f.store, &t).await.unwrap();
    }

    #[tokio::test]
    async fn open_round_does_not_trigger_analysis() {
        let f = fixture(2, MockJudge::new()).await;
        submit(&f, &f.a, 1, 1).await;
        let handle = f.monitor.on_turn_accepted(&f.room, 2, 1).await;
        assert!(handle.is_none());
        assert_eq!(f.judge.analyze_calls(), 0);
    }

    #[tokio::test]
    async fn full_round_analyzes_every_turn_once() {
        let f = fixture(2, MockJudge::new()).await;
        submit(&f, &f.a, 1, 1).await;
        submit(&f, &f.b, 1, 2).await;

        let handle = f.monitor.on_turn_accepted(&f.room, 2, 1).await.unwrap();
        handle.await.unwrap();

        assert_eq!(f.judge.analyze_calls(), 2);
        let turns = TurnRepository::find_by_room(&f.store, &f.room.id)
            .await
            .unwrap();
        assert!(turns.iter().all(Turn::is_analyzed));
        // Debate has another round, so no result yet.
        assert!(ResultRepository::get_by_room(&f.store, &f.room.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn failed_analysis_is_isolated_per_turn() {
        let f = fixture(1, MockJudge::new().fail_when_contains("r1t2")).await;
        submit(&f, &f.a, 1, 1).await;
        submit(&f, &f.b, 1, 2).await;

        let handle = f.monitor.on_turn_accepted(&f.room, 2, 1).await.unwrap();
        handle.await.unwrap();

        let turns = TurnRepository::find_by_room(&f.store, &f.room.id)
            .await
            .unwrap();
        let analyzed: Vec<bool> = turns.iter().map(Turn::is_analyzed).collect();
        assert_eq!(analyzed, vec![true, false]);
    }

    #[tokio::test]
    async fn last_round_completes_debate_and_persists_result() {
        let f = fixture(1, MockJudge::new()).await;
        submit(&f, &f.a, 1, 1).await;
        submit(&f, &f.b, 1, 2).await;

        let handle = f.monitor.on_turn_accepted(&f.room, 2, 1).await.unwrap();
        handle.await.unwrap();

        let room = RoomRepository::get(&f.store, &f.room.id).await.unwrap().unwrap();
        assert_eq!(room.status, DebateStatus::Completed);
        let result = ResultRepository::get_by_room(&f.store, &f.room.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.scores.len(), 2);
        assert_eq!(f.judge.verdict_calls(), 1);
    }

    #[tokio::test]
    async fn completion_does_not_refire_on_settled_room() {
        let f = fixture(1, MockJudge::new()).await;
        submit(&f, &f.a, 1, 1).await;
        submit(&f, &f.b, 1, 2).await;

        let handle = f.monitor.on_turn_accepted(&f.room, 2, 1).await.unwrap();
        handle.await.unwrap();
        // A stale duplicate of the same check finds the room settled.
        let handle = f.monitor.on_turn_accepted(&f.room, 2, 1).await.unwrap();
        handle.await.unwrap();

        assert_eq!(f.judge.verdict_calls(), 1);
    }

    #[tokio::test]
    async fn analysis_failure_still_completes_debate() {
        let f = fixture(1, MockJudge::failing()).await;
        submit(&f, &f.a, 1, 1).await;
        submit(&f, &f.b, 1, 2).await;

        let handle = f.monitor.on_turn_accepted(&f.room, 2, 1).await.unwrap();
        handle.await.unwrap();

        let room = RoomRepository::get(&f.store, &f.room.id).await.unwrap().unwrap();
        assert_eq!(room.status, DebateStatus::Completed);
        let result = ResultRepository::get_by_room(&f.store, &f.room.id)
            .await
            .unwrap()
            .unwrap();
        // Nobody was analyzed, so nobody wins and scores are zero-filled.
        assert!(result.winner_id.is_none());
        assert!(result
            .scores
            .values()
            .all(|s| s.weighted_total == 0.0));
    }
}
