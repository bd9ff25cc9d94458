//! Domain layer - entities, value objects, and pure debate logic.

pub mod debate;
pub mod foundation;
