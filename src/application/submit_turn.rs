//! Turn submission guard.
//!
//! Validates a submission twice: once optimistically against a fresh read,
//! and again under the room's exclusive section right before persisting,
//! so two racing submitters can both pass the first check but only one
//! survives the second. Audio transcription, the one slow collaborator
//! call, happens strictly outside the lock.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapters::judge::TRANSCRIPTION_UNAVAILABLE;
use crate::application::{invalidate_quietly, RoomLocks, RoundMonitor};
use crate::domain::debate::{DebateError, DebateStatus, Participant, Role, Room, Turn};
use crate::domain::foundation::{DomainError, ErrorCode, RoomId, StateMachine, UserId};
use crate::ports::{
    code_key, status_key, transcript_key, DebateJudge, ParticipantRepository, RoomCache,
    RoomRepository, TurnRepository,
};

/// A request to submit one turn.
#[derive(Debug, Clone)]
pub struct SubmitTurnCommand {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub round_number: u32,
    pub turn_number: u32,
    /// Typed argument text; may be empty when audio is supplied.
    pub content: String,
    /// Reference to an uploaded audio recording to transcribe.
    pub audio_reference: Option<String>,
}

/// The accepted turn plus the analysis task it may have triggered.
#[derive(Debug)]
pub struct SubmitTurnOutcome {
    pub turn: Turn,
    /// Present when this turn closed its round. Production drops it; tests
    /// await it to observe analysis and completion.
    pub analysis: Option<JoinHandle<()>>,
}

/// Handler for turn submission.
pub struct SubmitTurnHandler {
    rooms: Arc<dyn RoomRepository>,
    participants: Arc<dyn ParticipantRepository>,
    turns: Arc<dyn TurnRepository>,
    judge: Arc<dyn DebateJudge>,
    cache: Arc<dyn RoomCache>,
    locks: Arc<RoomLocks>,
    monitor: RoundMonitor,
}

impl SubmitTurnHandler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        participants: Arc<dyn ParticipantRepository>,
        turns: Arc<dyn TurnRepository>,
        judge: Arc<dyn DebateJudge>,
        cache: Arc<dyn RoomCache>,
        locks: Arc<RoomLocks>,
        monitor: RoundMonitor,
    ) -> Self {
        Self {
            rooms,
            participants,
            turns,
            judge,
            cache,
            locks,
            monitor,
        }
    }

    pub async fn handle(&self, cmd: SubmitTurnCommand) -> Result<SubmitTurnOutcome, DebateError> {
        let mut room = self
            .rooms
            .get(&cmd.room_id)
            .await?
            .ok_or(DebateError::RoomNotFound(cmd.room_id))?;

        // The first submitted turn starts an upcoming debate.
        if room.status == DebateStatus::Upcoming {
            let next = room
                .status
                .transition_to(DebateStatus::Ongoing)
                .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
            self.rooms.update_status(&room.id, next).await?;
            room.status = next;
            invalidate_quietly(
                self.cache.as_ref(),
                &[status_key(&room.id), code_key(&room.code)],
            )
            .await;
            info!(room_id = %room.id, "debate started by first turn");
        }
        if !room.is_ongoing() {
            return Err(DebateError::DebateNotOngoing {
                status: room.status,
            });
        }

        if cmd.round_number == 0 || cmd.round_number > room.rounds {
            return Err(DebateError::InvalidRound {
                requested: cmd.round_number,
                rounds: room.rounds,
            });
        }

        let participant = self
            .participants
            .find_by_user_and_room(&cmd.user_id, &room.id)
            .await?
            .filter(Participant::is_debater)
            .ok_or(DebateError::NotAParticipant)?;

        let debaters = self
            .participants
            .find_by_room(&room.id, Some(Role::Debater))
            .await?;
        let capacity = if debaters.is_empty() { 2 } else { debaters.len() };

        // Optimistic pass. Catches most rejections before paying for the
        // lock or transcription.
        let snapshot = self.turns.find_by_room(&room.id).await?;
        validate_submission(&room, &participant, &debaters, capacity, &snapshot, cmd.round_number)?;

        let content = self.resolve_content(&cmd).await?;

        let (turn, capacity) = {
            let lock = self.locks.lock_for(&room.id);
            let _guard = lock.lock().await;

            // Authoritative pass over fresh state; a racing submitter may
            // have won the gap since the optimistic check, or the debate
            // may have been completed while this call waited on the lock.
            let room = self
                .rooms
                .get(&cmd.room_id)
                .await?
                .ok_or(DebateError::RoomNotFound(cmd.room_id))?;
            if !room.is_ongoing() {
                return Err(DebateError::DebateNotOngoing {
                    status: room.status,
                });
            }
            let debaters = self
                .participants
                .find_by_room(&room.id, Some(Role::Debater))
                .await?;
            let capacity = if debaters.is_empty() { 2 } else { debaters.len() };
            let current = self.turns.find_by_room(&room.id).await?;
            validate_submission(
                &room,
                &participant,
                &debaters,
                capacity,
                &current,
                cmd.round_number,
            )?;

            let mut turn = Turn::new(
                room.id,
                participant.id,
                content,
                cmd.round_number,
                cmd.turn_number,
            );
            if let Some(audio) = &cmd.audio_reference {
                turn = turn.with_audio(audio.clone());
            }
            self.turns.create(&turn).await?;
            (turn, capacity)
        };

        invalidate_quietly(
            self.cache.as_ref(),
            &[status_key(&room.id), transcript_key(&room.id)],
        )
        .await;
        debug!(
            room_id = %room.id,
            turn_id = %turn.id,
            round = turn.round_number,
            "turn accepted"
        );

        let analysis = self
            .monitor
            .on_turn_accepted(&room, capacity, cmd.round_number)
            .await;
        Ok(SubmitTurnOutcome { turn, analysis })
    }

    /// Resolves the turn text from typed content and optional audio.
    ///
    /// Runs before the room lock is taken; transcription can take seconds.
    async fn resolve_content(&self, cmd: &SubmitTurnCommand) -> Result<String, DebateError> {
        let typed = cmd.content.trim();
        let transcript = match &cmd.audio_reference {
            Some(audio) => match self.judge.transcribe_audio(audio).await {
                Ok(text) => Some(text),
                Err(error) => {
                    warn!(room_id = %cmd.room_id, %error, "audio transcription failed");
                    Some(TRANSCRIPTION_UNAVAILABLE.to_string())
                }
            },
            None => None,
        };
        let content = match (typed.is_empty(), transcript) {
            (true, Some(transcript)) => transcript,
            (false, Some(transcript)) if transcript != TRANSCRIPTION_UNAVAILABLE => {
                format!("{}\n\n[Transcription]: {}", typed, transcript)
            }
            _ => typed.to_string(),
        };
        if content.trim().is_empty() {
            return Err(DebateError::EmptyContent);
        }
        Ok(content)
    }
}

/// The shared validation pass, run both optimistically and under the lock.
fn validate_submission(
    room: &Room,
    participant: &Participant,
    debaters: &[Participant],
    capacity: usize,
    turns: &[Turn],
    round_number: u32,
) -> Result<(), DebateError> {
    let in_round = turns
        .iter()
        .filter(|t| t.round_number == round_number)
        .count();
    if in_round >= capacity {
        return Err(DebateError::RoundFull {
            round: round_number,
            capacity,
        });
    }

    if let Some(last) = turns.last() {
        if last.speaker_id == participant.id {
            return Err(DebateError::ConsecutiveTurn);
        }
        if room.is_team_format() {
            let last_team = debaters
                .iter()
                .find(|d| d.id == last.speaker_id)
                .and_then(|d| d.team.as_deref());
            if last_team.is_some_and(|team| participant.on_team(team)) {
                return Err(DebateError::ConsecutiveTeamTurn);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryRoomCache;
    use crate::adapters::judge::MockJudge;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::FinalizeDebateHandler;
    use crate::domain::debate::DebateFormat;
    use crate::domain::foundation::RoomCode;

    struct Fixture {
        store: InMemoryStore,
        judge: Arc<MockJudge>,
        handler: SubmitTurnHandler,
        locks: Arc<RoomLocks>,
        room: Room,
        a: Participant,
        b: Participant,
    }

    async fn fixture(format: DebateFormat, judge: MockJudge) -> Fixture {
        let store = InMemoryStore::new();
        let judge = Arc::new(judge);
        let cache: Arc<dyn RoomCache> = Arc::new(InMemoryRoomCache::new());
        let locks = Arc::new(RoomLocks::new());

        let room = Room::new(
            "Universal basic income",
            RoomCode::new("SUB001").unwrap(),
            UserId::new(),
            2,
            format,
        )
        .unwrap();
        RoomRepository::create(&store, &room).await.unwrap();

        let mut a = Participant::new(room.id, UserId::new(), Role::Debater);
        let mut b = Participant::new(room.id, UserId::new(), Role::Debater);
        if format == DebateFormat::Team {
            a = a.with_team("A");
            b = b.with_team("B");
        }
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
            cache.clone(),
            locks.clone(),
            finalizer,
        );
        let handler = SubmitTurnHandler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            judge.clone(),
            cache,
            locks.clone(),
            monitor,
        );
        Fixture {
            store,
            judge,
            handler,
            locks,
            room,
            a,
            b,
        }
    }

    fn cmd(f: &Fixture, p: &Participant, round: u32, turn: u32, content: &str) -> SubmitTurnCommand {
        SubmitTurnCommand {
            room_id: f.room.id,
            user_id: p.user_id,
            round_number: round,
            turn_number: turn,
            content: content.to_string(),
            audio_reference: None,
        }
    }

    #[tokio::test]
    async fn first_turn_starts_an_upcoming_debate() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        f.handler
            .handle(cmd(&f, &f.a, 1, 1, "Opening"))
            .await
            .unwrap();
        let room = RoomRepository::get(&f.store, &f.room.id).await.unwrap().unwrap();
        assert_eq!(room.status, DebateStatus::Ongoing);
    }

    #[tokio::test]
    async fn rejects_unknown_room() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        let mut c = cmd(&f, &f.a, 1, 1, "Opening");
        c.room_id = RoomId::new();
        assert!(matches!(
            f.handler.handle(c).await.unwrap_err(),
            DebateError::RoomNotFound(_)
        ));
    }

    #[tokio::test]
    async fn rejects_completed_debate() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        f.store
            .update_status(&f.room.id, DebateStatus::Completed)
            .await
            .unwrap();
        assert!(matches!(
            f.handler.handle(cmd(&f, &f.a, 1, 1, "Too late")).await.unwrap_err(),
            DebateError::DebateNotOngoing {
                status: DebateStatus::Completed
            }
        ));
    }

    #[tokio::test]
    async fn submission_parked_on_lock_is_rejected_after_completion() {
        let f = Arc::new(fixture(DebateFormat::Individual, MockJudge::new()).await);
        f.handler
            .handle(cmd(&f, &f.a, 1, 1, "Opening"))
            .await
            .unwrap();

        // Hold the room lock so the next submission passes its optimistic
        // checks and parks on the exclusive section.
        let mutex = f.locks.lock_for(&f.room.id);
        let guard = mutex.lock().await;
        let parked = {
            let f = f.clone();
            tokio::spawn(async move {
                let c = cmd(&f, &f.b, 1, 2, "Parked reply");
                f.handler.handle(c).await
            })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // The debate completes while the submission waits.
        f.store
            .update_status(&f.room.id, DebateStatus::Completed)
            .await
            .unwrap();
        drop(guard);

        let err = parked.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            DebateError::DebateNotOngoing {
                status: DebateStatus::Completed
            }
        ));
        let turns = TurnRepository::find_by_room(&f.store, &f.room.id)
            .await
            .unwrap();
        assert_eq!(turns.len(), 1);
    }

    #[tokio::test]
    async fn rejects_round_beyond_configuration() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        let err = f.handler.handle(cmd(&f, &f.a, 3, 1, "Extra")).await.unwrap_err();
        assert!(matches!(
            err,
            DebateError::InvalidRound {
                requested: 3,
                rounds: 2
            }
        ));
        assert!(matches!(
            f.handler.handle(cmd(&f, &f.a, 0, 1, "Zero")).await.unwrap_err(),
            DebateError::InvalidRound { .. }
        ));
    }

    #[tokio::test]
    async fn rejects_spectators_and_strangers() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        let spectator = Participant::new(f.room.id, UserId::new(), Role::Spectator);
        f.store.add_participant(spectator.clone()).await;

        assert!(matches!(
            f.handler
                .handle(cmd(&f, &spectator, 1, 1, "From the stands"))
                .await
                .unwrap_err(),
            DebateError::NotAParticipant
        ));

        let mut stranger = cmd(&f, &f.a, 1, 1, "Hello");
        stranger.user_id = UserId::new();
        assert!(matches!(
            f.handler.handle(stranger).await.unwrap_err(),
            DebateError::NotAParticipant
        ));
    }

    #[tokio::test]
    async fn rejects_consecutive_turns_by_same_speaker() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        f.handler.handle(cmd(&f, &f.a, 1, 1, "First")).await.unwrap();
        assert!(matches!(
            f.handler.handle(cmd(&f, &f.a, 1, 2, "Again")).await.unwrap_err(),
            DebateError::ConsecutiveTurn
        ));
        // The other debater may respond.
        f.handler.handle(cmd(&f, &f.b, 1, 2, "Reply")).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_full_round() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        f.handler.handle(cmd(&f, &f.a, 1, 1, "A1")).await.unwrap();
        let outcome = f.handler.handle(cmd(&f, &f.b, 1, 2, "B1")).await.unwrap();
        if let Some(handle) = outcome.analysis {
            handle.await.unwrap();
        }
        assert!(matches!(
            f.handler.handle(cmd(&f, &f.a, 1, 3, "A extra")).await.unwrap_err(),
            DebateError::RoundFull {
                round: 1,
                capacity: 2
            }
        ));
    }

    #[tokio::test]
    async fn team_format_rejects_consecutive_team_turns() {
        let f = fixture(DebateFormat::Team, MockJudge::new()).await;
        let teammate = Participant::new(f.room.id, UserId::new(), Role::Debater).with_team("A");
        f.store.add_participant(teammate.clone()).await;

        f.handler.handle(cmd(&f, &f.a, 1, 1, "Team A opens")).await.unwrap();
        assert!(matches!(
            f.handler
                .handle(cmd(&f, &teammate, 1, 2, "A again"))
                .await
                .unwrap_err(),
            DebateError::ConsecutiveTeamTurn
        ));
        f.handler.handle(cmd(&f, &f.b, 1, 2, "Team B replies")).await.unwrap();
    }

    #[tokio::test]
    async fn audio_only_turn_uses_transcription() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        let mut c = cmd(&f, &f.a, 1, 1, "");
        c.audio_reference = Some("s3://turns/a1.ogg".to_string());
        let outcome = f.handler.handle(c).await.unwrap();
        assert_eq!(outcome.turn.content, "Transcript of s3://turns/a1.ogg");
        assert_eq!(outcome.turn.audio_url.as_deref(), Some("s3://turns/a1.ogg"));
        assert_eq!(f.judge.transcribe_calls(), 1);
    }

    #[tokio::test]
    async fn typed_and_audio_content_are_merged() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        let mut c = cmd(&f, &f.a, 1, 1, "Typed notes");
        c.audio_reference = Some("s3://turns/a1.ogg".to_string());
        let outcome = f.handler.handle(c).await.unwrap();
        assert_eq!(
            outcome.turn.content,
            "Typed notes\n\n[Transcription]: Transcript of s3://turns/a1.ogg"
        );
    }

    #[tokio::test]
    async fn failed_transcription_keeps_typed_content() {
        let f = fixture(DebateFormat::Individual, MockJudge::failing()).await;
        let mut c = cmd(&f, &f.a, 1, 1, "Typed notes");
        c.audio_reference = Some("s3://turns/a1.ogg".to_string());
        let outcome = f.handler.handle(c).await.unwrap();
        assert_eq!(outcome.turn.content, "Typed notes");
    }

    #[tokio::test]
    async fn failed_transcription_of_audio_only_turn_carries_marker() {
        let f = fixture(DebateFormat::Individual, MockJudge::failing()).await;
        let mut c = cmd(&f, &f.a, 1, 1, "");
        c.audio_reference = Some("s3://turns/a1.ogg".to_string());
        let outcome = f.handler.handle(c).await.unwrap();
        assert_eq!(outcome.turn.content, TRANSCRIPTION_UNAVAILABLE);
    }

    #[tokio::test]
    async fn rejects_empty_submission() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        assert!(matches!(
            f.handler.handle(cmd(&f, &f.a, 1, 1, "   ")).await.unwrap_err(),
            DebateError::EmptyContent
        ));
    }

    #[tokio::test]
    async fn closing_turn_returns_analysis_handle() {
        let f = fixture(DebateFormat::Individual, MockJudge::new()).await;
        let first = f.handler.handle(cmd(&f, &f.a, 1, 1, "A1")).await.unwrap();
        assert!(first.analysis.is_none());
        let second = f.handler.handle(cmd(&f, &f.b, 1, 2, "B1")).await.unwrap();
        let handle = second.analysis.expect("round-closing turn spawns analysis");
        handle.await.unwrap();
        assert_eq!(f.judge.analyze_calls(), 2);
    }
}
