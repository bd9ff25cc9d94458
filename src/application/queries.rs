//! Cached read queries - status, transcript, and code lookup.
//!
//! Reads go through the TTL cache; a miss rebuilds the projection from the
//! store and repopulates the cache. Cache failures and corrupt entries are
//! treated as misses, so the cache can disappear without breaking reads.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::debate::{DebateError, DebateFormat, DebateStatus, Role, Room, ScoreCard, Turn};
use crate::domain::foundation::{ParticipantId, RoomCode, RoomId, UserId};
use crate::ports::{
    code_key, status_key, transcript_key, ParticipantRepository, RoomCache, RoomRepository,
    TurnRepository,
};

/// Default lifetime of cached projections.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(120);

/// The live status projection of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusView {
    pub room_id: RoomId,
    pub topic: String,
    pub description: Option<String>,
    pub code: RoomCode,
    pub status: DebateStatus,
    pub rounds: u32,
    pub format: DebateFormat,
    pub participants: Vec<ParticipantView>,
    pub turn_count: usize,
}

/// One participant inside the status projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub user_id: UserId,
    pub role: Role,
    pub team: Option<String>,
    pub score: ScoreCard,
}

/// Read-side queries over rooms.
pub struct DebateQueries {
    rooms: Arc<dyn RoomRepository>,
    participants: Arc<dyn ParticipantRepository>,
    turns: Arc<dyn TurnRepository>,
    cache: Arc<dyn RoomCache>,
    ttl: Duration,
}

impl DebateQueries {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        participants: Arc<dyn ParticipantRepository>,
        turns: Arc<dyn TurnRepository>,
        cache: Arc<dyn RoomCache>,
    ) -> Self {
        Self {
            rooms,
            participants,
            turns,
            cache,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Overrides the projection TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The room's live status, participants, and turn count.
    pub async fn get_status(&self, room_id: &RoomId) -> Result<StatusView, DebateError> {
        let key = status_key(room_id);
        if let Some(view) = self.cached(&key).await {
            return Ok(view);
        }

        let room = self
            .rooms
            .get(room_id)
            .await?
            .ok_or(DebateError::RoomNotFound(*room_id))?;
        let participants = self.participants.find_by_room(room_id, None).await?;
        let turns = self.turns.find_by_room(room_id).await?;

        let view = StatusView {
            room_id: room.id,
            topic: room.topic,
            description: room.description,
            code: room.code,
            status: room.status,
            rounds: room.rounds,
            format: room.format,
            participants: participants
                .into_iter()
                .map(|p| ParticipantView {
                    id: p.id,
                    user_id: p.user_id,
                    role: p.role,
                    team: p.team,
                    score: p.score,
                })
                .collect(),
            turn_count: turns.len(),
        };
        self.store(&key, &view).await;
        Ok(view)
    }

    /// All turns of a room ordered by round then position for display.
    pub async fn get_transcript(&self, room_id: &RoomId) -> Result<Vec<Turn>, DebateError> {
        let key = transcript_key(room_id);
        if let Some(turns) = self.cached(&key).await {
            return Ok(turns);
        }

        if self.rooms.get(room_id).await?.is_none() {
            return Err(DebateError::RoomNotFound(*room_id));
        }
        let mut turns = self.turns.find_by_room(room_id).await?;
        turns.sort_by_key(|t| (t.round_number, t.turn_number));
        self.store(&key, &turns).await;
        Ok(turns)
    }

    /// Resolves a room by its join code.
    pub async fn find_room_by_code(&self, code: &RoomCode) -> Result<Option<Room>, DebateError> {
        let key = code_key(code);
        if let Some(room) = self.cached(&key).await {
            return Ok(Some(room));
        }

        let room = self.rooms.get_by_code(code).await?;
        if let Some(room) = &room {
            self.store(&key, room).await;
        }
        Ok(room)
    }

    /// Fetches and decodes a cached projection; anything unusable is a miss.
    async fn cached<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(error) => {
                    warn!(key, %error, "corrupt cache entry treated as miss");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                warn!(key, %error, "cache read failed, falling back to store");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(error) => {
                warn!(key, %error, "projection not cacheable");
                return;
            }
        };
        if let Err(error) = self.cache.put(key, value, self.ttl).await {
            warn!(key, %error, "cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryRoomCache;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::debate::Participant;
    use serde_json::Value;

    async fn setup() -> (InMemoryStore, Arc<InMemoryRoomCache>, DebateQueries, Room) {
        let store = InMemoryStore::new();
        let cache = Arc::new(InMemoryRoomCache::new());
        let room = Room::new(
            "Four-day work week",
            RoomCode::new("QRY001").unwrap(),
            UserId::new(),
            2,
            DebateFormat::Individual,
        )
        .unwrap();
        RoomRepository::create(&store, &room).await.unwrap();
        let queries = DebateQueries::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            cache.clone(),
        );
        (store, cache, queries, room)
    }

    #[tokio::test]
    async fn status_includes_participants_and_turn_count() {
        let (store, _cache, queries, room) = setup().await;
        let p = Participant::new(room.id, UserId::new(), Role::Debater);
        store.add_participant(p.clone()).await;
        TurnRepository::create(&store, &Turn::new(room.id, p.id, "Opening", 1, 1))
            .await
            .unwrap();

        let view = queries.get_status(&room.id).await.unwrap();
        assert_eq!(view.topic, "Four-day work week");
        assert_eq!(view.participants.len(), 1);
        assert_eq!(view.turn_count, 1);
    }

    #[tokio::test]
    async fn status_miss_populates_cache() {
        let (_store, cache, queries, room) = setup().await;
        queries.get_status(&room.id).await.unwrap();
        assert!(cache
            .get(&status_key(&room.id))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn status_of_unknown_room_fails() {
        let (_store, _cache, queries, _room) = setup().await;
        assert!(matches!(
            queries.get_status(&RoomId::new()).await.unwrap_err(),
            DebateError::RoomNotFound(_)
        ));
    }

    #[tokio::test]
    async fn corrupt_cache_entry_is_treated_as_miss() {
        let (_store, cache, queries, room) = setup().await;
        cache
            .put(
                &status_key(&room.id),
                Value::String("not a status view".to_string()),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let view = queries.get_status(&room.id).await.unwrap();
        assert_eq!(view.room_id, room.id);
    }

    #[tokio::test]
    async fn transcript_is_ordered_by_round_then_position() {
        let (store, _cache, queries, room) = setup().await;
        let p = Participant::new(room.id, UserId::new(), Role::Debater);
        store.add_participant(p.clone()).await;
        for (round, number) in [(2u32, 1u32), (1, 2), (1, 1), (2, 2)] {
            TurnRepository::create(
                &store,
                &Turn::new(room.id, p.id, format!("r{}t{}", round, number), round, number),
            )
            .await
            .unwrap();
        }

        let transcript = queries.get_transcript(&room.id).await.unwrap();
        let order: Vec<(u32, u32)> = transcript
            .iter()
            .map(|t| (t.round_number, t.turn_number))
            .collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    }

    #[tokio::test]
    async fn code_lookup_round_trips_through_cache() {
        let (_store, cache, queries, room) = setup().await;
        let found = queries.find_room_by_code(&room.code).await.unwrap().unwrap();
        assert_eq!(found.id, room.id);
        assert!(cache.get(&code_key(&room.code)).await.unwrap().is_some());

        let missing = RoomCode::new("NOPE99").unwrap();
        assert!(queries.find_room_by_code(&missing).await.unwrap().is_none());
    }
}
