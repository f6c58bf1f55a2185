//! The StagePipeline runs filter stages in order, then ranks.
//!
//! `StagePipeline::standard` builds the fixed production order. Custom
//! pipelines can be assembled with the builder for tests and tooling.

use crate::config::EngineConfig;
use crate::filters::*;
use crate::ranker::SuccessRateRanker;
use crate::traits::Stage;
use inventory::{Candidate, SegmentResolver};
use serde::Serialize;
use std::sync::Arc;
use targeting::PlacementContext;

/// Input/output sizes of one stage, for explaining a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub input: usize,
    pub output: usize,
}

/// Chains stages together into a decision pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = StagePipeline::standard(&EngineConfig::default(), resolver);
/// let ranked = pipeline.decide(candidates, &context);
/// ```
pub struct StagePipeline {
    stages: Vec<Box<dyn Stage>>,
    ranker: SuccessRateRanker,
}

impl StagePipeline {
    /// Create a new empty StagePipeline.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            ranker: SuccessRateRanker,
        }
    }

    /// The production pipeline:
    /// eligibility → placement → content tags → audience segment →
    /// authentication audience → sponsorship.
    ///
    /// The order is fixed. Sponsorship must come last because it looks at
    /// what every earlier stage left behind.
    pub fn standard(config: &EngineConfig, resolver: Arc<dyn SegmentResolver>) -> Self {
        Self::new()
            .add_stage(EligibilityFilter)
            .add_stage(PlacementFilter)
            .add_stage(ContentTagFilter::new(config.tag_sensitive_areas.iter().cloned()))
            .add_stage(AudienceSegmentFilter::new(resolver))
            .add_stage(AuthenticationAudienceFilter)
            .add_stage(SponsorshipFilter)
    }

    /// Add a stage to the pipeline (builder pattern).
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names in application order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Apply all stages in sequence.
    ///
    /// An empty set simply flows through the remaining stages.
    pub fn apply(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Vec<Candidate> {
        self.apply_with_report(candidates, context).0
    }

    /// Apply all stages and record how many candidates each one kept.
    pub fn apply_with_report(
        &self,
        candidates: Vec<Candidate>,
        context: &PlacementContext,
    ) -> (Vec<Candidate>, Vec<StageReport>) {
        let mut current = candidates;
        let mut report = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let input = current.len();
            tracing::debug!("Applying stage: {} (input count: {})", stage.name(), input);
            current = stage.apply(current, context);
            tracing::debug!("Stage applied: {} (output count: {})", stage.name(), current.len());
            report.push(StageReport {
                stage: stage.name().to_string(),
                input,
                output: current.len(),
            });
        }
        (current, report)
    }

    /// Filter, then order by success rate.
    pub fn decide(&self, candidates: Vec<Candidate>, context: &PlacementContext) -> Vec<Candidate> {
        self.ranker.rank(self.apply(candidates, context))
    }
}

impl Default for StagePipeline {
    fn default() -> Self {
        Self::new()
    }
}
