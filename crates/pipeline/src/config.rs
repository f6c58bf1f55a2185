//! Engine configuration.

use crate::selection::SelectionConfig;
use inventory::{HOME_FEED_PLACEMENTS, PlacementArea};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Deployment-level knobs for the decision engine.
///
/// Deserializes from JSON; any missing field takes its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Areas where, without viewer tags, only untagged candidates may show.
    pub tag_sensitive_areas: BTreeSet<PlacementArea>,
    /// Post-ranking delivery selection settings
    pub selection: SelectionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tag_sensitive_areas: HOME_FEED_PLACEMENTS
                .iter()
                .map(|name| PlacementArea::new(*name))
                .collect(),
            selection: SelectionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Replace the tag-sensitive feed areas.
    pub fn with_tag_sensitive_areas<I, A>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<PlacementArea>,
    {
        self.tag_sensitive_areas = areas.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }
}
