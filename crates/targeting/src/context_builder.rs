//! Build a `PlacementContext` from caller input.
//!
//! The default build never fails: a viewer id on a signed-out request is
//! dropped (anonymous viewers never get personalized targeting), and empty
//! tag lists mean "not specified". `try_build` reports the viewer-id case as
//! `ContextError::InvalidContext` for callers that want to catch it.

use crate::error::{ContextError, Result};
use crate::types::{ContextRequest, PlacementContext};
use inventory::{ContentId, OrganizationId, PlacementArea, ViewerId};
use std::collections::BTreeSet;
use tracing::debug;

/// Builder for `PlacementContext`.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    request: ContextRequest,
}

impl ContextBuilder {
    /// Start an anonymous, non-article context for `placement_area`.
    pub fn new(placement_area: impl Into<PlacementArea>) -> Self {
        Self {
            request: ContextRequest::new(placement_area),
        }
    }

    pub fn from_request(request: ContextRequest) -> Self {
        Self { request }
    }

    /// Mark the viewer as signed in.
    pub fn signed_in(mut self, viewer_id: ViewerId) -> Self {
        self.request.signed_in = true;
        self.request.viewer_id = Some(viewer_id);
        self
    }

    pub fn viewer_followed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.viewer_followed_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Render next to an article with the given tags.
    pub fn article<I, S>(mut self, content_id: ContentId, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.content_id = Some(content_id);
        self.request.content_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn content_organization(mut self, organization_id: OrganizationId) -> Self {
        self.request.content_organization_id = Some(organization_id);
        self
    }

    pub fn permit_adjacent_sponsors(mut self, permit: bool) -> Self {
        self.request.permit_adjacent_sponsors = permit;
        self
    }

    /// Normalize into a context. Never fails.
    pub fn build(self) -> PlacementContext {
        let request = self.request;

        let viewer_id = if request.signed_in {
            request.viewer_id
        } else {
            if request.viewer_id.is_some() {
                debug!("Dropping viewer id from signed-out request");
            }
            None
        };

        let viewer_followed_tags = request
            .viewer_followed_tags
            .map(normalize_tags)
            .filter(|tags| !tags.is_empty());

        let content_tags = request.content_tags.map(normalize_tags).unwrap_or_default();

        PlacementContext {
            placement_area: request.placement_area,
            signed_in: request.signed_in,
            viewer_id,
            viewer_followed_tags,
            content_id: request.content_id,
            content_organization_id: request.content_organization_id,
            content_tags,
            permit_adjacent_sponsors: request.permit_adjacent_sponsors,
        }
    }

    /// Like `build`, but a viewer id on a signed-out request is an error.
    pub fn try_build(self) -> Result<PlacementContext> {
        if !self.request.signed_in {
            if let Some(viewer_id) = self.request.viewer_id {
                return Err(ContextError::InvalidContext { viewer_id });
            }
        }
        Ok(self.build())
    }
}

/// Build a context straight from a request, normalizing.
pub fn build_context(request: ContextRequest) -> PlacementContext {
    ContextBuilder::from_request(request).build()
}

/// Tags are compared lower-cased. Blank entries are kept as-is.
fn normalize_tags(tags: Vec<String>) -> BTreeSet<String> {
    tags.into_iter().map(|tag| tag.to_lowercase()).collect()
}
