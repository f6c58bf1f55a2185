//! Error types for context building.

use inventory::ViewerId;
use thiserror::Error;

/// Raised only by the strict builder; the default build normalizes instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Invalid context: viewer {viewer_id} supplied for a signed-out request")]
    InvalidContext { viewer_id: ViewerId },
}

pub type Result<T> = std::result::Result<T, ContextError>;
