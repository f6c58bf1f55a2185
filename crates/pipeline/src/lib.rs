//! Candidate filtering, ranking and delivery selection for billboard slots.
//!
//! This crate provides:
//! - Stage trait and the six filter stages
//! - StagePipeline for composing stages and ranking the survivors
//! - DeliverySelector for picking the one billboard a slot renders
//!
//! ## Architecture
//! A decision runs in three steps:
//! 1. Stages narrow the inventory (eligibility, placement, tags, segment,
//!    sign-in audience, sponsorship). Each stage only ever removes.
//! 2. SuccessRateRanker orders what is left, best first.
//! 3. Optionally, DeliverySelector samples one candidate from the ranked list.
//!
//! Steps 1 and 2 are deterministic. Step 3 takes an explicit `Rng`.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{EngineConfig, StagePipeline, DeliverySelector};
//!
//! let config = EngineConfig::default();
//! let pipeline = StagePipeline::standard(&config, resolver);
//! let ranked = pipeline.decide(candidates, &context);
//!
//! let selector = DeliverySelector::new(config.selection.clone());
//! let shown = selector.select(&ranked, &context, &mut rand::rng());
//! ```

pub mod config;
pub mod filter_pipeline;
pub mod filters;
pub mod ranker;
pub mod selection;
pub mod traits;

// Re-export main types
pub use config::EngineConfig;
pub use filter_pipeline::{StagePipeline, StageReport};
pub use ranker::SuccessRateRanker;
pub use selection::{DeliveryRate, DeliverySelector, SelectionConfig, SelectionTier};
pub use traits::Stage;
