//! Parser and boundary validation for inventory documents.
//!
//! An inventory document is JSON:
//! ```json
//! {
//!   "candidates": [ { "id": 1, "approval": "approved", ... } ],
//!   "segment_memberships": { "42": [7, 9] }
//! }
//! ```
//!
//! Unknown enum values are rejected by serde. Everything else the decision
//! stages assume (known placement area, finite scores, type rules) is checked
//! here so the stages never have to.

use crate::error::{InventoryError, Result};
use crate::placement::PlacementArea;
use crate::types::*;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Maximum number of tags a candidate may carry
pub const MAX_TAG_COUNT: usize = 25;

/// Upper bound for `Candidate::weight`
pub const MAX_WEIGHT: u32 = 10_000;

/// Raw shape of an inventory file
#[derive(Debug, Default, Deserialize)]
pub struct InventoryDocument {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub segment_memberships: HashMap<ViewerId, HashSet<SegmentId>>,
}

/// Read and parse an inventory document from disk
pub fn read_document(path: &Path) -> Result<InventoryDocument> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => InventoryError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => InventoryError::IoError(e),
    })?;
    parse_document(&contents, &path.display().to_string())
}

/// Parse an inventory document from a string
///
/// `origin` is only used in error messages.
pub fn parse_document(contents: &str, origin: &str) -> Result<InventoryDocument> {
    serde_json::from_str(contents).map_err(|source| InventoryError::ParseError {
        file: origin.to_string(),
        source,
    })
}

/// Validate and normalize every candidate, in parallel, keeping input order.
pub fn validate_candidates(candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
    let validated: Vec<Candidate> = candidates
        .into_par_iter()
        .map(validate_candidate)
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::with_capacity(validated.len());
    for candidate in &validated {
        if !seen.insert(candidate.id) {
            return Err(InventoryError::DuplicateCandidate(candidate.id));
        }
    }
    Ok(validated)
}

/// Check one candidate against the catalog and cross-field rules.
///
/// Tags are lower-cased. Blank tags are kept: a candidate tagged `""` is
/// not untagged.
pub fn validate_candidate(mut candidate: Candidate) -> Result<Candidate> {
    let id = candidate.id;

    if !candidate.placement_area.is_known() {
        return Err(InventoryError::UnknownPlacementArea {
            id,
            area: candidate.placement_area.to_string(),
        });
    }

    if !candidate.success_rate.is_finite() || candidate.success_rate < 0.0 {
        return Err(InventoryError::InvalidValue {
            id,
            field: "success_rate".to_string(),
            value: candidate.success_rate.to_string(),
        });
    }

    if candidate.weight > MAX_WEIGHT {
        return Err(InventoryError::InvalidValue {
            id,
            field: "weight".to_string(),
            value: candidate.weight.to_string(),
        });
    }

    if candidate.tags.len() > MAX_TAG_COUNT {
        return Err(InventoryError::ValidationError {
            id,
            reason: format!("too many tags ({} > {})", candidate.tags.len(), MAX_TAG_COUNT),
        });
    }

    if candidate.candidate_type == CandidateType::Community && candidate.organization_id.is_none() {
        return Err(InventoryError::ValidationError {
            id,
            reason: "community candidates require an organization".to_string(),
        });
    }

    if candidate.placement_area == PlacementArea::new("home_hero")
        && candidate.candidate_type != CandidateType::InHouse
    {
        return Err(InventoryError::ValidationError {
            id,
            reason: "home_hero candidates must be in_house".to_string(),
        });
    }

    candidate.tags = candidate.tags.iter().map(|tag| tag.to_lowercase()).collect();
    Ok(candidate)
}
