//! Filter candidates by tag relevance to the article or viewer.
//!
//! Exactly one tag branch fires per decision, in this priority:
//!
//! | Branch            | When                                        | Keeps                         |
//! |-------------------|---------------------------------------------|-------------------------------|
//! | `ViewerTags`      | viewer follows at least one tag             | tagged with a followed tag, or untagged |
//! | `ArticleTagged`   | article context, article has tags           | tagged with an article tag, or untagged |
//! | `ArticleUntagged` | article context, article has no tags        | untagged only                 |
//! | `FeedDefault`     | no viewer tags, tag-sensitive feed area     | untagged only                 |
//! | `Unfiltered`      | otherwise                                   | everything                    |
//!
//! Viewer targeting outranks the article branches because it is the more
//! specific signal. Independently of the branch, an article context also
//! removes every candidate whose exclusion list names that article.

use crate::traits::Stage;
use inventory::{Candidate, PlacementArea};
use std::collections::{BTreeSet, HashSet};
use targeting::PlacementContext;
use tracing::debug;

/// Which tag rule applies to a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagBranch {
    ViewerTags,
    ArticleTagged,
    ArticleUntagged,
    FeedDefault,
    Unfiltered,
}

/// Tag matching plus the per-article exclusion list.
pub struct ContentTagFilter {
    tag_sensitive_areas: HashSet<PlacementArea>,
}

impl ContentTagFilter {
    /// Create a new ContentTagFilter.
    ///
    /// # Arguments
    /// * `tag_sensitive_areas` - Feed areas where untagged-only applies
    ///   when the viewer has no tag targeting
    pub fn new<I>(tag_sensitive_areas: I) -> Self
    where
        I: IntoIterator<Item = PlacementArea>,
    {
        Self {
            tag_sensitive_areas: tag_sensitive_areas.into_iter().collect(),
        }
    }

    /// Decide which tag branch applies to `context`.
    pub fn select_branch(&self, context: &PlacementContext) -> TagBranch {
        if context.viewer_followed_tags().is_some_and(|tags| !tags.is_empty()) {
            return TagBranch::ViewerTags;
        }
        if context.is_article() {
            return if context.content_tags().is_empty() {
                TagBranch::ArticleUntagged
            } else {
                TagBranch::ArticleTagged
            };
        }
        if self.tag_sensitive_areas.contains(context.placement_area()) {
            return TagBranch::FeedDefault;
        }
        TagBranch::Unfiltered
    }
}

/// Tagged with any of `tags`, or untagged fallback inventory.
fn tagged_or_untagged(candidate: &Candidate, tags: &BTreeSet<String>) -> bool {
    candidate.is_untagged() || candidate.tagged_with_any(tags)
}

impl Stage for ContentTagFilter {
    fn name(&self) -> &str {
        "ContentTagFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Vec<Candidate> {
        let branch = self.select_branch(context);
        debug!("Content tag branch: {:?}", branch);

        let excluded_for = context.content_id();

        candidates
            .into_iter()
            .filter(|candidate| match branch {
                TagBranch::ViewerTags => context
                    .viewer_followed_tags()
                    .is_some_and(|tags| tagged_or_untagged(candidate, tags)),
                TagBranch::ArticleTagged => tagged_or_untagged(candidate, context.content_tags()),
                TagBranch::ArticleUntagged | TagBranch::FeedDefault => candidate.is_untagged(),
                TagBranch::Unfiltered => true,
            })
            .filter(|candidate| {
                excluded_for.is_none_or(|content_id| !candidate.exclude_content_ids.contains(&content_id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory::HOME_FEED_PLACEMENTS;
    use targeting::ContextBuilder;

    fn filter() -> ContentTagFilter {
        ContentTagFilter::new(HOME_FEED_PLACEMENTS.iter().map(|a| PlacementArea::new(*a)))
    }

    fn ids(candidates: &[Candidate]) -> Vec<u64> {
        candidates.iter().map(|c| c.id).collect()
    }

    fn tagged(id: u64, area: &str, tags: &[&str]) -> Candidate {
        Candidate::new(id, area.into(), 0.5).with_tags(tags.iter().copied())
    }

    #[test]
    fn test_article_with_tags_keeps_matching_and_untagged() {
        let context = ContextBuilder::new("post_comments").article(1, ["ruby"]).build();
        let candidates = vec![
            tagged(1, "post_comments", &["ruby"]),
            tagged(2, "post_comments", &[]),
            tagged(3, "post_comments", &["python"]),
        ];

        assert_eq!(filter().select_branch(&context), TagBranch::ArticleTagged);
        assert_eq!(ids(&filter().apply(candidates, &context)), vec![1, 2]);
    }

    #[test]
    fn test_article_without_tags_keeps_only_untagged() {
        let context = ContextBuilder::new("post_comments")
            .article(1, Vec::<String>::new())
            .build();
        let candidates = vec![
            tagged(1, "post_comments", &["ruby"]),
            tagged(2, "post_comments", &[]),
        ];

        assert_eq!(filter().select_branch(&context), TagBranch::ArticleUntagged);
        assert_eq!(ids(&filter().apply(candidates, &context)), vec![2]);
    }

    #[test]
    fn test_blank_tag_is_not_untagged_fallback() {
        let context = ContextBuilder::new("post_comments")
            .article(1, Vec::<String>::new())
            .build();
        let candidates = vec![tagged(1, "post_comments", &[""]), tagged(2, "post_comments", &[])];

        assert_eq!(ids(&filter().apply(candidates, &context)), vec![2]);
    }

    #[test]
    fn test_viewer_tags_override_article_tags() {
        let context = ContextBuilder::new("post_comments")
            .article(1, ["ruby"])
            .viewer_followed_tags(["go"])
            .build();
        let candidates = vec![
            tagged(1, "post_comments", &["ruby"]),
            tagged(2, "post_comments", &["go"]),
            tagged(3, "post_comments", &[]),
        ];

        assert_eq!(filter().select_branch(&context), TagBranch::ViewerTags);
        assert_eq!(ids(&filter().apply(candidates, &context)), vec![2, 3]);
    }

    #[test]
    fn test_viewer_tags_override_untagged_article() {
        let context = ContextBuilder::new("post_comments")
            .article(1, Vec::<String>::new())
            .viewer_followed_tags(["go"])
            .build();
        let candidates = vec![
            tagged(1, "post_comments", &["go"]),
            tagged(2, "post_comments", &["ruby"]),
            tagged(3, "post_comments", &[]),
        ];

        assert_eq!(filter().select_branch(&context), TagBranch::ViewerTags);
        assert_eq!(ids(&filter().apply(candidates, &context)), vec![1, 3]);
    }

    #[test]
    fn test_feed_default_untagged_only() {
        let context = ContextBuilder::new("feed_first").build();
        let candidates = vec![tagged(1, "feed_first", &["ruby"]), tagged(2, "feed_first", &[])];

        assert_eq!(filter().select_branch(&context), TagBranch::FeedDefault);
        assert_eq!(ids(&filter().apply(candidates, &context)), vec![2]);
    }

    #[test]
    fn test_feed_with_viewer_tags() {
        let context = ContextBuilder::new("feed_first")
            .viewer_followed_tags(["ruby"])
            .build();
        let candidates = vec![
            tagged(1, "feed_first", &["ruby"]),
            tagged(2, "feed_first", &["java"]),
            tagged(3, "feed_first", &[]),
        ];

        assert_eq!(ids(&filter().apply(candidates, &context)), vec![1, 3]);
    }

    #[test]
    fn test_empty_viewer_tags_fall_back_to_feed_default() {
        let context = ContextBuilder::new("feed_second")
            .viewer_followed_tags(Vec::<String>::new())
            .build();
        assert_eq!(filter().select_branch(&context), TagBranch::FeedDefault);
    }

    #[test]
    fn test_unfiltered_elsewhere() {
        let context = ContextBuilder::new("sidebar_left").build();
        let candidates = vec![tagged(1, "sidebar_left", &["ruby"]), tagged(2, "sidebar_left", &[])];

        assert_eq!(filter().select_branch(&context), TagBranch::Unfiltered);
        assert_eq!(ids(&filter().apply(candidates, &context)), vec![1, 2]);
    }

    #[test]
    fn test_feed_areas_are_configurable() {
        let context = ContextBuilder::new("feed_first").build();
        let no_feeds = ContentTagFilter::new(Vec::new());
        assert_eq!(no_feeds.select_branch(&context), TagBranch::Unfiltered);
    }

    #[test]
    fn test_exclusion_list_always_applies() {
        // Viewer branch fires, exclusion still runs
        let context = ContextBuilder::new("post_comments")
            .article(42, ["ruby"])
            .viewer_followed_tags(["ruby"])
            .build();
        let candidates = vec![
            tagged(1, "post_comments", &["ruby"]).excluding(42),
            tagged(2, "post_comments", &["ruby"]).excluding(7),
            tagged(3, "post_comments", &[]).excluding(42),
        ];

        assert_eq!(ids(&filter().apply(candidates, &context)), vec![2]);
    }

    #[test]
    fn test_exclusion_ignored_outside_articles() {
        let context = ContextBuilder::new("sidebar_left").build();
        let candidates = vec![tagged(1, "sidebar_left", &[]).excluding(42)];
        assert_eq!(filter().apply(candidates, &context).len(), 1);
    }
}
