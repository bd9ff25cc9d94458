//! Adapters - implementations of ports against concrete backends.

pub mod cache;
pub mod judge;
pub mod memory;
