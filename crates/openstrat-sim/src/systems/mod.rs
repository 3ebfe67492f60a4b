//! ECS systems that operate on the game context each tick.
//!
//! Systems are plain functions over `&mut GameContext` (or `&GameContext`
//! for read-only passes). They do not own state.

pub mod abilities;
pub mod cleanup;
pub mod movement;
pub mod selection;
pub mod snapshot;
pub mod vision;
