//! Filter to enforce audience segment targeting.
//!
//! Segment targeting is opt-in inclusion: a segmented candidate is invisible
//! to everyone who is not explicitly a member, including every anonymous
//! viewer.

use crate::traits::Stage;
use inventory::{Candidate, SegmentResolver};
use std::sync::Arc;
use targeting::PlacementContext;
use tracing::debug;

/// Keeps untargeted candidates plus those aimed at one of the viewer's segments.
pub struct AudienceSegmentFilter {
    resolver: Arc<dyn SegmentResolver>,
}

impl AudienceSegmentFilter {
    /// Create a new AudienceSegmentFilter.
    ///
    /// # Arguments
    /// * `resolver` - Shared lookup of viewer segment memberships
    pub fn new(resolver: Arc<dyn SegmentResolver>) -> Self {
        Self { resolver }
    }
}

impl Stage for AudienceSegmentFilter {
    fn name(&self) -> &str {
        "AudienceSegmentFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Vec<Candidate> {
        let viewer_id = match context.viewer_id() {
            Some(viewer_id) => viewer_id,
            None => {
                return candidates
                    .into_iter()
                    .filter(|candidate| candidate.target_segment_id.is_none())
                    .collect();
            }
        };

        // Skip the lookup when nothing here is segmented
        if candidates.iter().all(|c| c.target_segment_id.is_none()) {
            return candidates;
        }

        let segments = self.resolver.segments_for(viewer_id);
        debug!("Viewer {} belongs to {} segments", viewer_id, segments.len());

        candidates
            .into_iter()
            .filter(|candidate| match candidate.target_segment_id {
                None => true,
                Some(segment_id) => segments.contains(&segment_id),
            })
            .collect()
    }
}
