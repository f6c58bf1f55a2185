//! Placement areas: the named slots a billboard can be rendered in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every slot the product knows how to render, paired with its label.
pub const PLACEMENT_AREAS: &[(&str, &str)] = &[
    ("sidebar_left", "Sidebar Left (First Position)"),
    ("sidebar_left_2", "Sidebar Left (Second Position)"),
    ("sidebar_right", "Sidebar Right (Home first position)"),
    ("sidebar_right_second", "Sidebar Right (Home second position)"),
    ("sidebar_right_third", "Sidebar Right (Home third position)"),
    ("feed_first", "Home Feed First"),
    ("feed_second", "Home Feed Second"),
    ("feed_third", "Home Feed Third"),
    ("home_hero", "Home Hero"),
    ("footer", "Footer"),
    ("page_fixed_bottom", "Fixed Bottom (Page)"),
    ("post_fixed_bottom", "Fixed Bottom (Individual Post)"),
    ("post_body_bottom", "Below the post body"),
    ("post_sidebar", "Sidebar Right (Individual Post)"),
    ("post_comments", "Below the comment section"),
    ("post_comments_mid", "Midway through the comment section"),
    ("digest_first", "Digest Email First"),
    ("digest_second", "Digest Email Second"),
];

/// Slots inside the home feed.
pub const HOME_FEED_PLACEMENTS: &[&str] = &["feed_first", "feed_second", "feed_third"];

/// Name of a placement slot.
///
/// Matching between a candidate and a context is exact string equality;
/// there is no hierarchy or wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementArea(String);

impl PlacementArea {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this area is part of the known catalog.
    pub fn is_known(&self) -> bool {
        PLACEMENT_AREAS.iter().any(|(name, _)| *name == self.0)
    }

    /// Human-readable label, if the area is in the catalog.
    pub fn label(&self) -> Option<&'static str> {
        PLACEMENT_AREAS
            .iter()
            .find(|(name, _)| *name == self.0)
            .map(|(_, label)| *label)
    }

    pub fn is_home_feed(&self) -> bool {
        HOME_FEED_PLACEMENTS.contains(&self.0.as_str())
    }

    /// Upper-case key used by per-area configuration overrides.
    pub fn config_key(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for PlacementArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlacementArea {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
