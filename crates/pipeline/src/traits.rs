//! Core traits for the decision pipeline.
//!
//! This module defines the Stage trait that every filter implements so the
//! pipeline can apply them in a fixed order.

use inventory::Candidate;
use targeting::PlacementContext;

/// One pure narrowing step of the decision pipeline.
///
/// ## Contract
/// - The output is always a subset of the input, in input order
/// - A stage never fails: well-formedness is checked when inventory is
///   loaded, so an empty output is just an empty `Vec`
/// - `Send + Sync` so one pipeline can serve concurrent decisions
pub trait Stage: Send + Sync {
    /// Returns the name of this stage (for logging/debugging)
    fn name(&self) -> &str;

    /// Narrow `candidates` for `context`.
    fn apply(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Vec<Candidate>;
}
