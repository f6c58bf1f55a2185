//! Benchmarks for placement decisions
//!
//! Run with: cargo bench --package pipeline
//!
//! Builds a synthetic inventory spread over every placement area and times
//! the standard pipeline plus delivery selection.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use inventory::{Candidate, CandidateType, InventoryIndex, PLACEMENT_AREAS, SegmentResolver};
use pipeline::{DeliverySelector, EngineConfig, StagePipeline};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use targeting::{ContextBuilder, PlacementContext};

const TAGS: &[&str] = &["rust", "ruby", "python", "go", "javascript", "devops"];

fn synthetic_inventory(size: u64) -> (Vec<Candidate>, Arc<dyn SegmentResolver>) {
    let mut index = InventoryIndex::new();
    let mut candidates = Vec::with_capacity(size as usize);

    for id in 1..=size {
        let (area, _) = PLACEMENT_AREAS[(id as usize) % PLACEMENT_AREAS.len()];
        let mut candidate = Candidate::new(id, area.into(), (id % 97) as f64 / 97.0);
        if id % 3 != 0 {
            candidate = candidate.with_tags([TAGS[(id as usize) % TAGS.len()]]);
        }
        candidate = match id % 5 {
            0 => candidate.with_type(CandidateType::External),
            1 => candidate.with_type(CandidateType::Community).with_organization(id % 7),
            _ => candidate,
        };
        if id % 11 == 0 {
            candidate = candidate.with_segment(id % 4);
        }
        candidates.push(candidate);
    }

    for viewer_id in 0..1_000 {
        index.insert_membership(viewer_id, viewer_id % 4);
    }

    (candidates, Arc::new(index))
}

fn article_context() -> PlacementContext {
    ContextBuilder::new("post_sidebar")
        .signed_in(42)
        .article(9, ["rust", "devops"])
        .build()
}

fn bench_decide(c: &mut Criterion) {
    let (candidates, resolver) = synthetic_inventory(5_000);
    let pipeline = StagePipeline::standard(&EngineConfig::default(), resolver);
    let context = article_context();

    c.bench_function("decide_article_5000", |b| {
        b.iter(|| {
            let ranked = pipeline.decide(black_box(candidates.clone()), black_box(&context));
            black_box(ranked)
        })
    });
}

fn bench_decide_feed(c: &mut Criterion) {
    let (candidates, resolver) = synthetic_inventory(5_000);
    let pipeline = StagePipeline::standard(&EngineConfig::default(), resolver);
    let context = ContextBuilder::new("feed_first").build();

    c.bench_function("decide_feed_5000", |b| {
        b.iter(|| {
            let ranked = pipeline.decide(black_box(candidates.clone()), black_box(&context));
            black_box(ranked)
        })
    });
}

fn bench_select(c: &mut Criterion) {
    let (candidates, resolver) = synthetic_inventory(5_000);
    let config = EngineConfig::default();
    let pipeline = StagePipeline::standard(&config, resolver);
    let context = article_context();
    let ranked = pipeline.decide(candidates, &context);
    let selector = DeliverySelector::new(config.selection);
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("select_ranked", |b| {
        b.iter(|| {
            let shown = selector.select(black_box(&ranked), black_box(&context), &mut rng);
            black_box(shown.map(|c| c.id))
        })
    });
}

criterion_group!(benches, bench_decide, bench_decide_feed, bench_select);
criterion_main!(benches);
