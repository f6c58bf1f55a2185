//! In-memory inventory index.
//!
//! `InventoryIndex` is the reference implementation of both collaborator
//! traits: it serves candidates per placement area and resolves segment
//! memberships. It is built once and then shared read-only behind an `Arc`.

use crate::error::Result;
use crate::parser::{self, InventoryDocument};
use crate::placement::PlacementArea;
use crate::source::{CandidateSource, SegmentResolver};
use crate::types::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Candidates plus audience segment memberships, indexed for lookup.
#[derive(Debug, Default)]
pub struct InventoryIndex {
    /// Candidates in load order
    candidates: Vec<Candidate>,
    /// Positions into `candidates`, grouped by placement area
    area_index: BTreeMap<PlacementArea, Vec<usize>>,
    /// Position of each candidate by id
    id_index: HashMap<CandidateId, usize>,
    memberships: HashMap<ViewerId, HashSet<SegmentId>>,
}

impl InventoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate an inventory document from disk.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading inventory from {:?}", path);
        let document = parser::read_document(path)?;
        let index = Self::from_document(document)?;
        let (candidates, viewers) = index.counts();
        info!("Loaded {} candidates and {} segment viewers", candidates, viewers);
        Ok(index)
    }

    /// Build an index from an already-parsed document.
    pub fn from_document(document: InventoryDocument) -> Result<Self> {
        let candidates = parser::validate_candidates(document.candidates)?;

        let mut index = Self::new();
        for candidate in candidates {
            index.insert_candidate(candidate);
        }
        for (viewer_id, segments) in document.segment_memberships {
            for segment_id in segments {
                index.insert_membership(viewer_id, segment_id);
            }
        }
        debug!("Indexed {} placement areas", index.area_index.len());
        Ok(index)
    }

    /// Insert a candidate, replacing any previous candidate with the same id.
    ///
    /// No validation happens here; use `from_document` for untrusted input.
    pub fn insert_candidate(&mut self, candidate: Candidate) {
        if let Some(&position) = self.id_index.get(&candidate.id) {
            let previous_area = self.candidates[position].placement_area.clone();
            if let Some(positions) = self.area_index.get_mut(&previous_area) {
                positions.retain(|&p| p != position);
            }
            self.area_index
                .entry(candidate.placement_area.clone())
                .or_default()
                .push(position);
            self.candidates[position] = candidate;
            return;
        }

        let position = self.candidates.len();
        self.id_index.insert(candidate.id, position);
        self.area_index
            .entry(candidate.placement_area.clone())
            .or_default()
            .push(position);
        self.candidates.push(candidate);
    }

    pub fn insert_membership(&mut self, viewer_id: ViewerId, segment_id: SegmentId) {
        self.memberships.entry(viewer_id).or_default().insert(segment_id);
    }

    pub fn get_candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.id_index.get(&id).map(|&position| &self.candidates[position])
    }

    /// Candidates for one area, in load order.
    pub fn candidates_in_area(&self, area: &PlacementArea) -> Vec<&Candidate> {
        self.area_index
            .get(area)
            .map(|positions| positions.iter().map(|&p| &self.candidates[p]).collect())
            .unwrap_or_default()
    }

    pub fn all_candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Areas that hold at least one candidate, sorted by name.
    pub fn areas(&self) -> Vec<&PlacementArea> {
        self.area_index
            .iter()
            .filter(|(_, positions)| !positions.is_empty())
            .map(|(area, _)| area)
            .collect()
    }

    /// Viewers with at least one membership.
    pub fn viewers(&self) -> Vec<ViewerId> {
        let mut viewers: Vec<ViewerId> = self.memberships.keys().copied().collect();
        viewers.sort_unstable();
        viewers
    }

    /// (candidates, viewers with memberships)
    pub fn counts(&self) -> (usize, usize) {
        (self.candidates.len(), self.memberships.len())
    }
}

impl CandidateSource for InventoryIndex {
    fn fetch_candidates(&self, area: Option<&PlacementArea>) -> Result<Vec<Candidate>> {
        let candidates = match area {
            Some(area) => self.candidates_in_area(area).into_iter().cloned().collect(),
            None => self.candidates.clone(),
        };
        Ok(candidates)
    }
}

impl SegmentResolver for InventoryIndex {
    fn segments_for(&self, viewer_id: ViewerId) -> HashSet<SegmentId> {
        self.memberships.segments_for(viewer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_index() -> InventoryIndex {
        let mut index = InventoryIndex::new();
        index.insert_candidate(Candidate::new(1, "sidebar_left".into(), 0.3));
        index.insert_candidate(Candidate::new(2, "post_comments".into(), 0.6));
        index.insert_candidate(Candidate::new(3, "sidebar_left".into(), 0.9));
        index.insert_membership(100, 7);
        index
    }

    #[test]
    fn test_fetch_by_area() {
        let index = create_test_index();
        let area = PlacementArea::new("sidebar_left");

        let fetched = index.fetch_candidates(Some(&area)).unwrap();
        let ids: Vec<CandidateId> = fetched.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let all = index.fetch_candidates(None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_fetch_unknown_area_is_empty() {
        let index = create_test_index();
        let fetched = index.fetch_candidates(Some(&"footer".into())).unwrap();
        assert!(fetched.is_empty());
    }

    #[test]
    fn test_reinsert_moves_area() {
        let mut index = create_test_index();
        index.insert_candidate(Candidate::new(1, "footer".into(), 0.3));

        assert_eq!(index.counts().0, 3);
        assert_eq!(index.candidates_in_area(&"sidebar_left".into()).len(), 1);
        assert_eq!(index.candidates_in_area(&"footer".into()).len(), 1);
        assert_eq!(index.get_candidate(1).unwrap().placement_area.as_str(), "footer");
    }

    #[test]
    fn test_segments() {
        let index = create_test_index();
        assert!(index.segments_for(100).contains(&7));
        assert!(index.segments_for(101).is_empty());
        assert_eq!(index.viewers(), vec![100]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "candidates": [
                    {{"id": 5, "approval": "approved", "published": true,
                      "placement_area": "footer", "display_audience": "all",
                      "type": "in_house", "success_rate": 0.4}}
                ],
                "segment_memberships": {{"1": [2]}}
            }}"#
        )
        .unwrap();

        let index = InventoryIndex::load_from_file(file.path()).unwrap();
        assert_eq!(index.counts(), (1, 1));
        assert_eq!(index.areas(), vec![&PlacementArea::new("footer")]);
    }

    #[test]
    fn test_load_missing_file() {
        let result = InventoryIndex::load_from_file(Path::new("/nonexistent/inventory.json"));
        assert!(matches!(
            result,
            Err(crate::error::InventoryError::FileNotFound { .. })
        ));
    }
}
