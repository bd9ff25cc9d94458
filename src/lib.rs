//! Oratio - Live Debate Orchestration Backend
//!
//! This crate implements the debate round orchestrator: serialized turn
//! submission per room, round-completion detection with parallel AI analysis
//! fan-out, score aggregation, and final verdict generation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
