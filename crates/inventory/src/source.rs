//! Collaborator seams consumed by the decision engine.
//!
//! The engine never owns storage. It asks a `CandidateSource` for the
//! universe of candidates and a `SegmentResolver` for a viewer's segments.

use crate::error::Result;
use crate::placement::PlacementArea;
use crate::types::{Candidate, SegmentId, ViewerId};
use std::collections::{HashMap, HashSet};

/// Supplies the current universe of candidates.
///
/// `Send + Sync` so one source can back concurrent decisions.
pub trait CandidateSource: Send + Sync {
    /// Return candidates, optionally restricted to one placement area.
    fn fetch_candidates(&self, area: Option<&PlacementArea>) -> Result<Vec<Candidate>>;
}

/// Resolves a viewer's audience segment memberships.
pub trait SegmentResolver: Send + Sync {
    /// Segment ids the viewer belongs to. Unknown viewers belong to none.
    fn segments_for(&self, viewer_id: ViewerId) -> HashSet<SegmentId>;
}

impl SegmentResolver for HashMap<ViewerId, HashSet<SegmentId>> {
    fn segments_for(&self, viewer_id: ViewerId) -> HashSet<SegmentId> {
        self.get(&viewer_id).cloned().unwrap_or_default()
    }
}
