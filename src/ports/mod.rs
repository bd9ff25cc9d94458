//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the orchestrator and the outside world. Adapters implement these ports.
//!
//! ## Entity store ports
//!
//! Typed repositories over the durable store, exact-match filters only:
//! `RoomRepository`, `ParticipantRepository`, `TurnRepository`,
//! `ResultRepository`, `ReactionRepository`.
//!
//! ## Collaborator ports
//!
//! - `DebateJudge` - external AI scoring and verdict generation
//! - `RoomCache` - best-effort TTL cache for hot read paths

mod cache;
mod judge;
mod participant_repository;
mod reaction_repository;
mod result_repository;
mod room_repository;
mod turn_repository;

pub use cache::{code_key, status_key, transcript_key, CacheError, RoomCache};
pub use judge::{DebateJudge, JudgeError, Verdict};
pub use participant_repository::ParticipantRepository;
pub use reaction_repository::ReactionRepository;
pub use result_repository::ResultRepository;
pub use room_repository::RoomRepository;
pub use turn_repository::TurnRepository;
