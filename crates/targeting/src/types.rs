//! Request and context types for a single placement decision.

use inventory::{ContentId, OrganizationId, PlacementArea, ViewerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a caller sends to ask for a decision.
///
/// Every optional field may be missing or empty; the builder decides what
/// "empty" means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRequest {
    pub placement_area: PlacementArea,
    #[serde(default)]
    pub signed_in: bool,
    #[serde(default)]
    pub viewer_id: Option<ViewerId>,
    #[serde(default)]
    pub viewer_followed_tags: Option<Vec<String>>,
    #[serde(default)]
    pub content_id: Option<ContentId>,
    #[serde(default)]
    pub content_organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub content_tags: Option<Vec<String>>,
    /// Outside of an article this is always true
    #[serde(default = "default_permit_adjacent_sponsors")]
    pub permit_adjacent_sponsors: bool,
}

fn default_permit_adjacent_sponsors() -> bool {
    true
}

impl ContextRequest {
    /// A request for an anonymous viewer with nothing else specified.
    pub fn new(placement_area: impl Into<PlacementArea>) -> Self {
        Self {
            placement_area: placement_area.into(),
            signed_in: false,
            viewer_id: None,
            viewer_followed_tags: None,
            content_id: None,
            content_organization_id: None,
            content_tags: None,
            permit_adjacent_sponsors: true,
        }
    }
}

/// The immutable description of one placement decision.
///
/// Only `ContextBuilder` creates these, which guarantees that a viewer id is
/// never present for an anonymous viewer and that an empty followed-tag list
/// is represented as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementContext {
    pub(crate) placement_area: PlacementArea,
    pub(crate) signed_in: bool,
    pub(crate) viewer_id: Option<ViewerId>,
    pub(crate) viewer_followed_tags: Option<BTreeSet<String>>,
    pub(crate) content_id: Option<ContentId>,
    pub(crate) content_organization_id: Option<OrganizationId>,
    pub(crate) content_tags: BTreeSet<String>,
    pub(crate) permit_adjacent_sponsors: bool,
}

impl PlacementContext {
    pub fn placement_area(&self) -> &PlacementArea {
        &self.placement_area
    }

    pub fn signed_in(&self) -> bool {
        self.signed_in
    }

    /// Present only for signed-in viewers.
    pub fn viewer_id(&self) -> Option<ViewerId> {
        self.viewer_id
    }

    /// `None` when the caller asked for no viewer-tag targeting.
    pub fn viewer_followed_tags(&self) -> Option<&BTreeSet<String>> {
        self.viewer_followed_tags.as_ref()
    }

    /// Present only when rendering next to an article.
    pub fn content_id(&self) -> Option<ContentId> {
        self.content_id
    }

    pub fn content_organization_id(&self) -> Option<OrganizationId> {
        self.content_organization_id
    }

    pub fn content_tags(&self) -> &BTreeSet<String> {
        &self.content_tags
    }

    pub fn permit_adjacent_sponsors(&self) -> bool {
        self.permit_adjacent_sponsors
    }

    pub fn is_article(&self) -> bool {
        self.content_id.is_some()
    }
}
