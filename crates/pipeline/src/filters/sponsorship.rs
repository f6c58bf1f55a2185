//! Filter by sponsorship type and organization policy.
//!
//! Two phases:
//! 1. Inside an organization's content, that organization's own community
//!    candidates win outright if any survived the earlier stages.
//! 2. Otherwise only `in_house` is allowed, plus `external` when the content
//!    is not organization-owned and permits adjacent sponsors.
//!
//! Phase 1 inspects the already-narrowed set, so this stage must run last.

use crate::traits::Stage;
use inventory::{Candidate, CandidateType, OrganizationId};
use targeting::PlacementContext;
use tracing::debug;

pub struct SponsorshipFilter;

impl SponsorshipFilter {
    /// Types allowed when no organization-hosted community inventory exists.
    pub fn allowed_types(context: &PlacementContext) -> Vec<CandidateType> {
        let mut allowed = vec![CandidateType::InHouse];
        if context.content_organization_id().is_none() && context.permit_adjacent_sponsors() {
            allowed.push(CandidateType::External);
        }
        allowed
    }
}

fn is_hosted_community(candidate: &Candidate, organization_id: OrganizationId) -> bool {
    candidate.candidate_type == CandidateType::Community
        && candidate.organization_id == Some(organization_id)
}

impl Stage for SponsorshipFilter {
    fn name(&self) -> &str {
        "SponsorshipFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Vec<Candidate> {
        let candidates = match context.content_organization_id() {
            Some(organization_id) => {
                let (hosted, others): (Vec<Candidate>, Vec<Candidate>) = candidates
                    .into_iter()
                    .partition(|candidate| is_hosted_community(candidate, organization_id));
                if !hosted.is_empty() {
                    debug!(
                        "Organization {} has {} community candidates, using them exclusively",
                        organization_id,
                        hosted.len()
                    );
                    return hosted;
                }
                // hosted is empty, so `others` is the whole working set
                others
            }
            None => candidates,
        };

        let allowed = Self::allowed_types(context);
        candidates
            .into_iter()
            .filter(|candidate| allowed.contains(&candidate.candidate_type))
            .collect()
    }
}
