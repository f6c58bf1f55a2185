//! Filter candidates by the viewer's sign-in state.

use crate::traits::Stage;
use inventory::Candidate;
use targeting::PlacementContext;

/// Keeps `all` candidates plus `logged_in` or `logged_out` ones to match
/// the viewer.
pub struct AuthenticationAudienceFilter;

impl Stage for AuthenticationAudienceFilter {
    fn name(&self) -> &str {
        "AuthenticationAudienceFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Vec<Candidate> {
        let signed_in = context.signed_in();
        candidates
            .into_iter()
            .filter(|candidate| candidate.display_audience.admits(signed_in))
            .collect()
    }
}
