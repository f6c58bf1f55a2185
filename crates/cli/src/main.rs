use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use inventory::{Candidate, InventoryIndex, PlacementArea};
use pipeline::{EngineConfig, SelectionConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use server::{Decision, DecisionEngine};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use targeting::ContextRequest;
use tracing::info;

/// Billboard - contextual billboard selection and ranking
#[derive(Parser)]
#[command(name = "billboard")]
#[command(about = "Pick and rank billboards for a placement slot", long_about = None)]
struct Cli {
    /// Path to the inventory JSON document
    #[arg(short, long, default_value = "data/inventory.json")]
    inventory: PathBuf,

    /// Engine configuration JSON (tag-sensitive areas, selection settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide one request, or an array of requests, from a JSON file
    Decide {
        /// Context request JSON file
        #[arg(long)]
        context: PathBuf,

        /// Reject a signed-out request that carries a viewer id
        #[arg(long)]
        strict: bool,

        /// Number of ranked candidates to print
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Also pick the billboard to render
        #[arg(long)]
        select: bool,

        /// Seed for selection, for reproducible picks
        #[arg(long)]
        seed: Option<u64>,

        /// Print decisions as JSON
        #[arg(long)]
        json: bool,

        /// Show how many candidates each stage kept
        #[arg(long)]
        explain: bool,
    },

    /// Show placement areas, or the candidates in one area
    Inspect {
        /// Placement area to list
        #[arg(long)]
        area: Option<String>,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let start = Instant::now();
    let index = Arc::new(
        InventoryIndex::load_from_file(&cli.inventory).context("Failed to load inventory")?,
    );
    let (candidates, viewers) = index.counts();
    // stderr, so `decide --json` output stays parseable
    eprintln!(
        "{} Loaded {} candidates ({} segment viewers) in {:?}",
        "✓".green(),
        candidates,
        viewers,
        start.elapsed()
    );

    let engine = DecisionEngine::from_index(index.clone(), &config);

    match cli.command {
        Commands::Decide {
            context,
            strict,
            limit,
            select,
            seed,
            json,
            explain,
        } => {
            let options = DecideOptions {
                strict,
                limit,
                select,
                seed,
                json,
                explain,
            };
            handle_decide(&engine, &context, &options)?
        }
        Commands::Inspect { area } => handle_inspect(&index, area.map(PlacementArea::new))?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(engine, index, requests, concurrent).await?,
    }

    Ok(())
}

/// Read the config file if given; selection settings from the environment win.
fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    config.selection.settings.extend(SelectionConfig::from_env().settings);
    Ok(config)
}

struct DecideOptions {
    strict: bool,
    limit: usize,
    select: bool,
    seed: Option<u64>,
    json: bool,
    explain: bool,
}

/// Handle the 'decide' command
fn handle_decide(engine: &DecisionEngine, path: &Path, options: &DecideOptions) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse context {}", path.display()))?;
    let requests: Vec<ContextRequest> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        _ => vec![serde_json::from_value(value)?],
    };
    info!("Deciding {} requests", requests.len());

    if options.explain && !options.json {
        println!("{} {}", "Stages:".bold(), engine.stage_names().join(" -> "));
    }

    let results: Vec<Result<Decision>> = if options.strict {
        requests
            .into_iter()
            .map(|request| engine.decide_request_strict(request))
            .collect()
    } else {
        engine.decide_batch(requests)
    };

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut failures = 0;
    let mut output = Vec::new();
    for result in results {
        let decision = match result {
            Ok(decision) => decision,
            Err(err) => {
                failures += 1;
                eprintln!("{} {:#}", "✗".red(), err);
                continue;
            }
        };
        let selected = if options.select {
            engine.select(&decision, &mut rng).map(|candidate| candidate.id)
        } else {
            None
        };

        if options.json {
            output.push(serde_json::json!({
                "decision": decision,
                "selected": selected,
            }));
        } else {
            print_decision(engine, &decision, options, selected);
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    if failures > 0 {
        bail!("{} requests failed", failures);
    }
    Ok(())
}

/// Helper function to format and print a decision
fn print_decision(
    engine: &DecisionEngine,
    decision: &Decision,
    options: &DecideOptions,
    selected: Option<u64>,
) {
    let area = decision.context.placement_area();
    let label = area.label().unwrap_or("unknown area");
    println!("{}", format!("Billboards for {} ({}):", area, label).bold().blue());

    if decision.is_empty() {
        println!("  {}", "no eligible billboards".yellow());
    }
    for (rank, candidate) in decision.ranked.iter().take(options.limit).enumerate() {
        println!(
            "{}. #{} {} - success rate {:.3}{}",
            (rank + 1).to_string().green(),
            candidate.id,
            candidate.candidate_type.display_label(),
            candidate.success_rate,
            format_tags(candidate)
        );
    }
    if decision.ranked.len() > options.limit {
        println!("   ... {} more", decision.ranked.len() - options.limit);
    }

    if options.explain {
        for stage in &decision.stages {
            println!("   {} {} -> {}", stage.stage.cyan(), stage.input, stage.output);
        }
        let selection = engine.selector().config();
        println!(
            "   {} random <= {}, seldom seen <= {}, new only <= {}, low impressions < {}",
            "tiers".cyan(),
            selection.seldom_seen_min(area),
            selection.seldom_seen_max(area),
            selection.new_only_max(area),
            selection.low_impression_count(area)
        );
    }

    if options.select {
        match selected {
            Some(id) => println!("{} Selected #{}", "→".green(), id),
            None => println!("{} Slot left empty", "→".yellow()),
        }
    }
}

fn format_tags(candidate: &Candidate) -> String {
    if candidate.is_untagged() {
        return String::new();
    }
    let tags: Vec<&str> = candidate.tags.iter().map(String::as_str).collect();
    format!(" [{}]", tags.join(", "))
}

/// Handle the 'inspect' command
fn handle_inspect(index: &InventoryIndex, area: Option<PlacementArea>) -> Result<()> {
    let Some(area) = area else {
        println!("{}", "Placement areas:".bold().blue());
        for area in index.areas() {
            println!(
                "{}{} ({}): {} candidates{}",
                "• ".green(),
                area,
                area.label().unwrap_or("unknown"),
                index.candidates_in_area(area).len(),
                if area.is_home_feed() { " [feed]" } else { "" }
            );
        }
        return Ok(());
    };

    if !area.is_known() {
        bail!("Unknown placement area: {}", area);
    }

    let candidates = index.candidates_in_area(&area);
    println!("{}", format!("Candidates in {}:", area).bold().blue());
    for candidate in candidates {
        println!(
            "{}#{} {} {:?} {} audience={:?} segment={} rate={:.3}{}",
            "• ".cyan(),
            candidate.id,
            candidate.candidate_type.display_label(),
            candidate.approval,
            if candidate.published { "published" } else { "unpublished" },
            candidate.display_audience,
            candidate
                .target_segment_id
                .map(|segment| segment.to_string())
                .unwrap_or_else(|| "-".to_string()),
            candidate.success_rate,
            format_tags(candidate)
        );
    }
    Ok(())
}

/// Random request against areas and viewers that exist in the inventory
fn random_request<R: Rng>(
    areas: &[PlacementArea],
    viewers: &[u64],
    tags: &[String],
    rng: &mut R,
) -> ContextRequest {
    let mut request = ContextRequest::new(areas[rng.random_range(0..areas.len())].clone());

    if !viewers.is_empty() && rng.random_bool(0.5) {
        request.signed_in = true;
        request.viewer_id = Some(viewers[rng.random_range(0..viewers.len())]);
    }
    if !tags.is_empty() && rng.random_bool(0.4) {
        request.content_id = Some(rng.random_range(1..10_000));
        request.content_tags = Some(vec![tags[rng.random_range(0..tags.len())].clone()]);
    }
    request
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: DecisionEngine,
    index: Arc<InventoryIndex>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }
    let areas: Vec<PlacementArea> = index.areas().into_iter().cloned().collect();
    if areas.is_empty() {
        bail!("Inventory has no candidates to benchmark");
    }
    let viewers = index.viewers();
    let tags: Vec<String> = index
        .all_candidates()
        .iter()
        .flat_map(|candidate| candidate.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut rng = rand::rng();
    let workload: Vec<ContextRequest> = (0..requests)
        .map(|_| random_request(&areas, &viewers, &tags, &mut rng))
        .collect();

    // Decisions are CPU-bound, so they run on the blocking pool
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrent.max(1)));
    let started = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for request in workload {
        let engine = engine.clone();
        let permit = semaphore.clone().acquire_owned().await?;
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let start = Instant::now();
            engine.decide_request(request)?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = started.elapsed();

    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}
