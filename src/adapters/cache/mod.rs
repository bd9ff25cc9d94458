//! Cache adapters - in-memory for tests and single-server deployments,
//! Redis for production.

mod in_memory;
mod redis;

pub use in_memory::InMemoryRoomCache;
pub use redis::RedisRoomCache;
