//! Core domain types for billboard inventory.
//!
//! A `Candidate` is one promotional unit that may be shown in a placement
//! slot. Candidates are read-only once loaded: the decision pipeline only
//! ever produces new, narrower `Vec<Candidate>` values from them.

use crate::placement::PlacementArea;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for a candidate billboard
pub type CandidateId = u64;

/// Identifier of an owning / hosting organization
pub type OrganizationId = u64;

/// Identifier of an audience segment (a named viewer cohort)
pub type SegmentId = u64;

/// Identifier of a signed-in viewer
pub type ViewerId = u64;

/// Identifier of a piece of content (an article)
pub type ContentId = u64;

// =============================================================================
// Enums
// =============================================================================

/// Moderation state of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Draft,
    Approved,
    Rejected,
}

/// Which viewers a candidate may be displayed to, by sign-in state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayAudience {
    All,
    LoggedIn,
    LoggedOut,
}

impl DisplayAudience {
    /// Whether a viewer with the given sign-in state may see this audience.
    pub fn admits(self, signed_in: bool) -> bool {
        match self {
            DisplayAudience::All => true,
            DisplayAudience::LoggedIn => signed_in,
            DisplayAudience::LoggedOut => !signed_in,
        }
    }
}

/// Sponsorship classification of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateType {
    InHouse,
    Community,
    External,
}

impl CandidateType {
    /// Label shown to people; external placements are presented as partners.
    pub fn display_label(self) -> &'static str {
        match self {
            CandidateType::InHouse => "in_house",
            CandidateType::Community => "community",
            CandidateType::External => "partner",
        }
    }
}

// =============================================================================
// Candidate
// =============================================================================

/// A billboard eligible for consideration in a placement decision.
///
/// `tags` is a set: an empty set means "untagged". A set holding a blank
/// string is still tagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub approval: ApprovalStatus,
    pub published: bool,
    pub placement_area: PlacementArea,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Content ids next to which this candidate must never be shown
    #[serde(default)]
    pub exclude_content_ids: HashSet<ContentId>,
    /// `None` means untargeted (visible to every segment)
    #[serde(default)]
    pub target_segment_id: Option<SegmentId>,
    pub display_audience: DisplayAudience,
    #[serde(rename = "type")]
    pub candidate_type: CandidateType,
    /// Engagement score used only for final ordering
    #[serde(default)]
    pub success_rate: f64,

    // Delivery selection attributes
    /// Relative weight for weighted sampling (0..=10_000)
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub impressions_count: u64,
    #[serde(default)]
    pub priority: bool,
    /// Content ids on which this candidate gets a weight boost
    #[serde(default)]
    pub preferred_content_ids: Vec<ContentId>,
}

fn default_weight() -> u32 {
    1
}

impl Candidate {
    /// Create an approved, published, untargeted in-house candidate.
    ///
    /// Mostly useful for tests and fixtures; adjust fields afterwards.
    pub fn new(id: CandidateId, placement_area: PlacementArea, success_rate: f64) -> Self {
        Self {
            id,
            approval: ApprovalStatus::Approved,
            published: true,
            placement_area,
            organization_id: None,
            tags: BTreeSet::new(),
            exclude_content_ids: HashSet::new(),
            target_segment_id: None,
            display_audience: DisplayAudience::All,
            candidate_type: CandidateType::InHouse,
            success_rate,
            weight: default_weight(),
            impressions_count: 0,
            priority: false,
            preferred_content_ids: Vec::new(),
        }
    }

    /// Builder-style helper to set tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_type(mut self, candidate_type: CandidateType) -> Self {
        self.candidate_type = candidate_type;
        self
    }

    pub fn with_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn with_audience(mut self, display_audience: DisplayAudience) -> Self {
        self.display_audience = display_audience;
        self
    }

    pub fn with_segment(mut self, segment_id: SegmentId) -> Self {
        self.target_segment_id = Some(segment_id);
        self
    }

    pub fn excluding(mut self, content_id: ContentId) -> Self {
        self.exclude_content_ids.insert(content_id);
        self
    }

    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }

    /// True when the candidate carries at least one of `tags`.
    ///
    /// `tags` is expected lower-cased, as `PlacementContext` stores them.
    /// The candidate's own tags may be in any case: inventory loaded from a
    /// file is already normalized, caller-built candidates need not be.
    pub fn tagged_with_any(&self, tags: &BTreeSet<String>) -> bool {
        if tags.is_empty() {
            return false;
        }
        self.tags
            .iter()
            .any(|tag| tags.contains(tag) || tags.contains(&tag.to_lowercase()))
    }

    pub fn is_eligible(&self) -> bool {
        self.approval == ApprovalStatus::Approved && self.published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> PlacementArea {
        PlacementArea::new("sidebar_left")
    }

    #[test]
    fn test_blank_tag_is_not_untagged() {
        let candidate = Candidate::new(1, area(), 0.1).with_tags([""]);
        assert!(!candidate.is_untagged());

        let candidate = Candidate::new(2, area(), 0.1);
        assert!(candidate.is_untagged());
    }

    #[test]
    fn test_tagged_with_any() {
        let candidate = Candidate::new(1, area(), 0.1).with_tags(["ruby", "rails"]);
        let wanted: BTreeSet<String> = ["python", "rails"].iter().map(|s| s.to_string()).collect();
        assert!(candidate.tagged_with_any(&wanted));

        let unrelated: BTreeSet<String> = ["go".to_string()].into_iter().collect();
        assert!(!candidate.tagged_with_any(&unrelated));
        assert!(!candidate.tagged_with_any(&BTreeSet::new()));
    }

    #[test]
    fn test_tagged_with_any_ignores_candidate_case() {
        let candidate = Candidate::new(1, area(), 0.1).with_tags(["Ruby", "WebDev"]);
        let wanted: BTreeSet<String> = ["webdev".to_string()].into_iter().collect();
        assert!(candidate.tagged_with_any(&wanted));

        let unrelated: BTreeSet<String> = ["rust".to_string()].into_iter().collect();
        assert!(!candidate.tagged_with_any(&unrelated));
    }

    #[test]
    fn test_display_audience_admits() {
        assert!(DisplayAudience::All.admits(true));
        assert!(DisplayAudience::All.admits(false));
        assert!(DisplayAudience::LoggedIn.admits(true));
        assert!(!DisplayAudience::LoggedIn.admits(false));
        assert!(DisplayAudience::LoggedOut.admits(false));
        assert!(!DisplayAudience::LoggedOut.admits(true));
    }

    #[test]
    fn test_external_displays_as_partner() {
        assert_eq!(CandidateType::External.display_label(), "partner");
        assert_eq!(CandidateType::InHouse.display_label(), "in_house");
    }

    #[test]
    fn test_deserialize_candidate_defaults() {
        let json = r#"{
            "id": 7,
            "approval": "approved",
            "published": true,
            "placement_area": "post_comments",
            "display_audience": "logged_in",
            "type": "external"
        }"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.id, 7);
        assert!(candidate.is_untagged());
        assert_eq!(candidate.target_segment_id, None);
        assert_eq!(candidate.candidate_type, CandidateType::External);
        assert_eq!(candidate.weight, 1);
        assert_eq!(candidate.success_rate, 0.0);
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let json = r#"{
            "id": 7,
            "approval": "pending",
            "published": true,
            "placement_area": "post_comments",
            "display_audience": "all",
            "type": "external"
        }"#;
        assert!(serde_json::from_str::<Candidate>(json).is_err());
    }
}
