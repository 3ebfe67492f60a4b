//! Core types and definitions for the OpenStrat tactical simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, frame snapshots, events, template records,
//! errors and constants. It has no dependency on any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod templates;
pub mod types;

#[cfg(test)]
mod tests;
