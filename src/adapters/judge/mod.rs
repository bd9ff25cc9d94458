//! Judge adapters - HTTP-backed AI judge, deterministic fallback,
//! availability-based failover wrapper, and a scripted mock for tests.

mod failover;
mod fallback;
mod http;
mod mock;

pub use failover::FailoverJudge;
pub use fallback::{FallbackJudge, TRANSCRIPTION_UNAVAILABLE};
pub use http::{HttpJudge, HttpJudgeConfig};
pub use mock::MockJudge;
