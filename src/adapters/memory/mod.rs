//! In-memory entity store for tests and single-process deployments.

mod store;

pub use store::InMemoryStore;
