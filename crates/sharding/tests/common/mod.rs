//! Test infrastructure for the sharding engine.
//!
//! Provides the shared rule and schema fixtures plus helpers that locate
//! byte spans in SQL text, standing in for the external parser.

#![allow(dead_code)]

pub mod fixtures;
pub mod statements;

// Re-export commonly used items
pub use fixtures::*;
pub use statements::*;
