//! Filter to keep candidates booked for the requested slot.

use crate::traits::Stage;
use inventory::Candidate;
use targeting::PlacementContext;

/// Exact placement-area match. No hierarchy, no wildcards.
pub struct PlacementFilter;

impl Stage for PlacementFilter {
    fn name(&self) -> &str {
        "PlacementFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|candidate| &candidate.placement_area == context.placement_area())
            .collect()
    }
}
