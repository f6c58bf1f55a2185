//! Filter stage implementations for the decision pipeline.
//!
//! Listed in the order `StagePipeline::standard` applies them.

pub mod eligibility;
pub mod placement;
pub mod content_tag;
pub mod audience_segment;
pub mod authentication;
pub mod sponsorship;

// Re-export for convenience
pub use eligibility::EligibilityFilter;
pub use placement::PlacementFilter;
pub use content_tag::{ContentTagFilter, TagBranch};
pub use audience_segment::AudienceSegmentFilter;
pub use authentication::AuthenticationAudienceFilter;
pub use sponsorship::SponsorshipFilter;
