//! Filter to keep only approved, published candidates.
//!
//! This is always the first stage, and the only one that ignores the
//! context: later stages never reason about drafts or unpublished work.

use crate::traits::Stage;
use inventory::Candidate;
use targeting::PlacementContext;

/// Keeps candidates that are approved AND published.
pub struct EligibilityFilter;

impl Stage for EligibilityFilter {
    fn name(&self) -> &str {
        "EligibilityFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, _context: &PlacementContext) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(Candidate::is_eligible)
            .collect()
    }
}
