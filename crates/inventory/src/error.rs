//! Error types for the inventory crate.
//!
//! Everything that can go wrong while bringing candidates across the
//! boundary lives here. Once a candidate is inside an `InventoryIndex` it is
//! well-formed, and the decision stages never fail.

use crate::types::CandidateId;
use thiserror::Error;

/// Errors that can occur while loading or validating inventory
#[derive(Error, Debug)]
pub enum InventoryError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Inventory document is not valid JSON or has unknown enum values
    #[error("Parse error in {file}: {source}")]
    ParseError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Candidate references a slot outside the placement catalog
    #[error("Candidate {id} has unknown placement area: {area}")]
    UnknownPlacementArea { id: CandidateId, area: String },

    /// A field had an out-of-range value
    #[error("Invalid value for {field} on candidate {id}: {value}")]
    InvalidValue {
        id: CandidateId,
        field: String,
        value: String,
    },

    /// Two candidates share an id
    #[error("Duplicate candidate id {0}")]
    DuplicateCandidate(CandidateId),

    /// A cross-field rule failed
    #[error("Validation failed for candidate {id}: {reason}")]
    ValidationError { id: CandidateId, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, InventoryError>;
