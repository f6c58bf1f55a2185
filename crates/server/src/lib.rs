//! Server crate for the billboard decision engine.
//!
//! This crate contains the engine that coordinates inventory, context
//! normalization, the stage pipeline and delivery selection.

pub mod orchestrator;

pub use orchestrator::{Decision, DecisionEngine};
