//! # Inventory Crate
//!
//! Billboard inventory: the candidate data model, the placement-area
//! catalog, loading and boundary validation, and the collaborator traits the
//! decision engine consumes.
//!
//! ## Main Components
//!
//! - **types**: `Candidate` and its enums and identifiers
//! - **placement**: `PlacementArea` and the known slot catalog
//! - **parser**: JSON inventory documents and validation rules
//! - **index**: `InventoryIndex`, an in-memory store
//! - **source**: `CandidateSource` / `SegmentResolver` traits
//! - **error**: Error types for loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use inventory::{CandidateSource, InventoryIndex, PlacementArea};
//! use std::path::Path;
//!
//! let index = InventoryIndex::load_from_file(Path::new("inventory.json"))?;
//! let sidebar = index.fetch_candidates(Some(&PlacementArea::new("sidebar_left")))?;
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod placement;
pub mod source;
pub mod types;

pub use error::{InventoryError, Result};
pub use index::InventoryIndex;
pub use placement::{HOME_FEED_PLACEMENTS, PLACEMENT_AREAS, PlacementArea};
pub use source::{CandidateSource, SegmentResolver};
pub use types::{
    ApprovalStatus,
    Candidate,
    CandidateId,
    CandidateType,
    ContentId,
    DisplayAudience,
    OrganizationId,
    SegmentId,
    ViewerId,
};
