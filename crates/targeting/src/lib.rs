//! # Targeting Crate
//!
//! Describes *where* and *for whom* a billboard decision is made.
//!
//! A caller sends a `ContextRequest`; `ContextBuilder` turns it into an
//! immutable `PlacementContext` that the decision pipeline reads. Building
//! happens once per decision so no stage has to re-check the request.
//!
//! ```ignore
//! use targeting::ContextBuilder;
//!
//! let context = ContextBuilder::new("post_comments")
//!     .signed_in(viewer_id)
//!     .article(article_id, ["rust", "wasm"])
//!     .content_organization(org_id)
//!     .build();
//! ```

pub mod context_builder;
pub mod error;
pub mod types;

pub use context_builder::{ContextBuilder, build_context};
pub use error::{ContextError, Result};
pub use types::{ContextRequest, PlacementContext};
