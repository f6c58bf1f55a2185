//! # Decision Engine
//!
//! This module coordinates one placement decision end to end:
//! 1. Normalize the request into a `PlacementContext`
//! 2. Fetch the candidate universe for the area from the `CandidateSource`
//! 3. Run the standard stage pipeline
//! 4. Rank by success rate
//! 5. Optionally pick the one billboard to render
//!
//! Steps 1 to 4 are pure, so the engine is shared freely across threads and
//! batches are decided in parallel with rayon.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

use inventory::{Candidate, CandidateId, CandidateSource, InventoryIndex, SegmentResolver};
use pipeline::{DeliverySelector, EngineConfig, StagePipeline, StageReport};
use targeting::{ContextBuilder, ContextRequest, PlacementContext, build_context};

/// Ranked outcome of one placement decision
///
/// An empty `ranked` list is a normal outcome, not a failure.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub context: PlacementContext,
    /// Surviving candidates, best first
    pub ranked: Vec<Candidate>,
    /// How many candidates each stage kept
    pub stages: Vec<StageReport>,
}

impl Decision {
    pub fn ids(&self) -> Vec<CandidateId> {
        self.ranked.iter().map(|candidate| candidate.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Best-ranked candidate, if any survived
    pub fn top(&self) -> Option<&Candidate> {
        self.ranked.first()
    }
}

/// Main engine that coordinates the decision pipeline
#[derive(Clone)]
pub struct DecisionEngine {
    source: Arc<dyn CandidateSource>,
    pipeline: Arc<StagePipeline>,
    selector: DeliverySelector,
}

impl DecisionEngine {
    /// Create a new engine with all components initialized
    ///
    /// # Arguments
    /// * `source` - Where the candidate universe comes from
    /// * `resolver` - Viewer segment membership lookup
    /// * `config` - Tag-sensitive areas and delivery selection settings
    pub fn new(
        source: Arc<dyn CandidateSource>,
        resolver: Arc<dyn SegmentResolver>,
        config: &EngineConfig,
    ) -> Self {
        let pipeline = Arc::new(StagePipeline::standard(config, resolver));
        let selector = DeliverySelector::new(config.selection.clone());
        Self {
            source,
            pipeline,
            selector,
        }
    }

    /// Engine backed by a loaded inventory for both candidates and segments.
    pub fn from_index(index: Arc<InventoryIndex>, config: &EngineConfig) -> Self {
        Self::new(index.clone(), index, config)
    }

    pub fn selector(&self) -> &DeliverySelector {
        &self.selector
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.pipeline.stage_names()
    }

    /// Decide over a caller-supplied candidate universe.
    pub fn decide(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Decision {
        let (filtered, stages) = self.pipeline.apply_with_report(candidates, context);
        let ranked = pipeline::SuccessRateRanker.rank(filtered);
        Decision {
            context: context.clone(),
            ranked,
            stages,
        }
    }

    /// Main entry point: normalize the request, fetch candidates, decide.
    ///
    /// A signed-out request carrying a viewer id is silently anonymized.
    #[instrument(skip(self, request), fields(area = %request.placement_area))]
    pub fn decide_request(&self, request: ContextRequest) -> Result<Decision> {
        let context = build_context(request);
        self.decide_context(context)
    }

    /// Like `decide_request`, but reject a signed-out request that carries a
    /// viewer id instead of normalizing it.
    #[instrument(skip(self, request), fields(area = %request.placement_area))]
    pub fn decide_request_strict(&self, request: ContextRequest) -> Result<Decision> {
        let context = ContextBuilder::from_request(request)
            .try_build()
            .context("Rejected placement context")?;
        self.decide_context(context)
    }

    fn decide_context(&self, context: PlacementContext) -> Result<Decision> {
        let start_time = Instant::now();

        let candidates = self
            .source
            .fetch_candidates(Some(context.placement_area()))
            .with_context(|| format!("Failed to fetch candidates for {}", context.placement_area()))?;
        let fetched = candidates.len();

        let decision = self.decide(candidates, &context);

        info!(
            "Decided {}: {} fetched, {} ranked in {:.2?}",
            context.placement_area(),
            fetched,
            decision.ranked.len(),
            start_time.elapsed()
        );
        Ok(decision)
    }

    /// Decide many requests in parallel; results keep request order.
    pub fn decide_batch(&self, requests: Vec<ContextRequest>) -> Vec<Result<Decision>> {
        let start_time = Instant::now();
        let total = requests.len();

        let decisions: Vec<Result<Decision>> = requests
            .into_par_iter()
            .map(|request| self.decide_request(request))
            .collect();

        info!("Decided batch of {} in {:.2?}", total, start_time.elapsed());
        decisions
    }

    /// Pick the billboard to render from a decision.
    ///
    /// `None` means the slot stays empty, either because nothing survived or
    /// because the area's delivery rate skipped this request.
    pub fn select<'a, R: Rng + ?Sized>(&self, decision: &'a Decision, rng: &mut R) -> Option<&'a Candidate> {
        self.selector.select(&decision.ranked, &decision.context, rng)
    }
}
