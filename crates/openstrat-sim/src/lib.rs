//! Simulation engine for OpenStrat.
//!
//! Owns the hecs ECS world through a game context, runs systems once per
//! tick, and produces FrameSnapshots for the frontend.

pub mod context;
pub mod engine;
pub mod systems;
pub mod world_setup;

pub use context::GameContext;
pub use engine::{SimConfig, SimulationEngine};
pub use openstrat_core as core;
