//! Delivery selection: choose the one billboard a slot actually renders.
//!
//! Ranking is deterministic; delivery is not. Most of the time a slot shows
//! one of the top few ranked candidates, but a share of impressions goes to
//! exploration so new or rarely seen inventory can earn a success rate.
//!
//! A roll in `0..99` picks the tier:
//!
//! | Roll                      | Tier                  | Picks from                                  |
//! |---------------------------|-----------------------|---------------------------------------------|
//! | `<= seldom_seen_min`      | `Random`              | the whole ranked list                       |
//! | `<= seldom_seen_max`      | `SeldomSeenWeighted`  | low-impression or priority, by weight       |
//! | `<= new_only_max`         | `NewOnly`             | low-impression candidates                   |
//! | otherwise                 | `TopRanked`           | the top `k` ranked, `k` uniform in `1..=15` |
//!
//! Thresholds come from `SelectionConfig`, which resolves an area-specific
//! setting first, then a global one, then the built-in default.

use inventory::{Candidate, PlacementArea};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use targeting::PlacementContext;
use tracing::debug;

/// Impressions below which a candidate counts as "seldom seen"
pub const LOW_IMPRESSION_COUNT: u64 = 1_000;
/// Default upper roll for the fully random tier
pub const RANDOM_RANGE_MAX_FALLBACK: u32 = 5;
/// Default upper roll for the seldom-seen weighted tier
pub const NEW_AND_PRIORITY_RANGE_MAX_FALLBACK: u32 = 35;
/// Default upper roll for the new-only tier
pub const NEW_ONLY_RANGE_MAX_FALLBACK: u32 = 40;
/// Largest top-ranked window sampled from
pub const TOP_RANKED_WINDOW: usize = 15;
/// Weight multiplier when the candidate prefers the current article
pub const PREFERRED_CONTENT_BOOST: u64 = 10;

const LOW_IMPRESSION_KEY: &str = "LOW_IMPRESSION_COUNT";
const SELDOM_SEEN_MIN_KEY: &str = "SELDOM_SEEN_MIN";
const SELDOM_SEEN_MAX_KEY: &str = "SELDOM_SEEN_MAX";
const NEW_ONLY_MAX_KEY: &str = "NEW_ONLY_MAX";
const SETTING_KEYS: &[&str] = &[
    LOW_IMPRESSION_KEY,
    SELDOM_SEEN_MIN_KEY,
    SELDOM_SEEN_MAX_KEY,
    NEW_ONLY_MAX_KEY,
];

/// Share of requests (0..=100) for which a slot renders at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRate {
    pub signed_in_rate: u8,
    pub signed_out_rate: u8,
}

/// Tunables for delivery selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Raw settings keyed like environment variables, e.g.
    /// `SELDOM_SEEN_MAX` or `LOW_IMPRESSION_COUNT_FOR_SIDEBAR_LEFT`.
    pub settings: HashMap<String, String>,
    /// Per-area delivery rates; unlisted areas always deliver.
    pub delivery_rates: HashMap<PlacementArea, DeliveryRate>,
    /// Multiply a candidate's weight when it prefers the current article.
    pub preferred_content_boost: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            settings: HashMap::new(),
            delivery_rates: HashMap::new(),
            preferred_content_boost: true,
        }
    }
}

impl SelectionConfig {
    /// Pick up every selection setting present in the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Keep only the recognized keys (and their `_FOR_<AREA>` variants).
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let settings = vars
            .into_iter()
            .filter(|(key, _)| SETTING_KEYS.iter().any(|prefix| key.starts_with(prefix)))
            .collect();
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn with_delivery_rate(mut self, area: impl Into<PlacementArea>, rate: DeliveryRate) -> Self {
        self.delivery_rates.insert(area.into(), rate);
        self
    }

    pub fn with_preferred_content_boost(mut self, enabled: bool) -> Self {
        self.preferred_content_boost = enabled;
        self
    }

    fn lookup(&self, area: &PlacementArea, key: &str) -> Option<u64> {
        self.settings
            .get(&format!("{}_FOR_{}", key, area.config_key()))
            .or_else(|| self.settings.get(key))
            .map(|raw| leading_integer(raw))
    }

    pub fn low_impression_count(&self, area: &PlacementArea) -> u64 {
        self.lookup(area, LOW_IMPRESSION_KEY).unwrap_or(LOW_IMPRESSION_COUNT)
    }

    pub fn seldom_seen_min(&self, area: &PlacementArea) -> u64 {
        self.lookup(area, SELDOM_SEEN_MIN_KEY)
            .unwrap_or(u64::from(RANDOM_RANGE_MAX_FALLBACK))
    }

    pub fn seldom_seen_max(&self, area: &PlacementArea) -> u64 {
        self.lookup(area, SELDOM_SEEN_MAX_KEY)
            .unwrap_or(u64::from(NEW_AND_PRIORITY_RANGE_MAX_FALLBACK))
    }

    pub fn new_only_max(&self, area: &PlacementArea) -> u64 {
        self.lookup(area, NEW_ONLY_MAX_KEY)
            .unwrap_or(u64::from(NEW_ONLY_RANGE_MAX_FALLBACK))
    }

    /// Percentage of requests that should render this area at all.
    pub fn delivery_rate_for(&self, area: &PlacementArea, signed_in: bool) -> u8 {
        self.delivery_rates
            .get(area)
            .map(|rate| if signed_in { rate.signed_in_rate } else { rate.signed_out_rate })
            .unwrap_or(100)
            .min(100)
    }
}

/// Leading decimal digits of `raw`; anything unparseable reads as 0.
fn leading_integer(raw: &str) -> u64 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Which pool a roll draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTier {
    Random,
    SeldomSeenWeighted,
    NewOnly,
    TopRanked,
}

/// Picks one candidate from a ranked list.
#[derive(Debug, Clone, Default)]
pub struct DeliverySelector {
    config: SelectionConfig,
}

impl DeliverySelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Tier for a roll in `0..99`.
    pub fn tier_for(&self, area: &PlacementArea, roll: u32) -> SelectionTier {
        let roll = u64::from(roll);
        if roll <= self.config.seldom_seen_min(area) {
            SelectionTier::Random
        } else if roll <= self.config.seldom_seen_max(area) {
            SelectionTier::SeldomSeenWeighted
        } else if roll <= self.config.new_only_max(area) {
            SelectionTier::NewOnly
        } else {
            SelectionTier::TopRanked
        }
    }

    /// Whether this request's slot renders at all, for a roll in `0..100`.
    pub fn should_deliver(&self, context: &PlacementContext, roll: u32) -> bool {
        let rate = self
            .config
            .delivery_rate_for(context.placement_area(), context.signed_in());
        roll < u32::from(rate)
    }

    /// Choose the billboard to render, or `None` for an empty slot.
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        ranked: &'a [Candidate],
        context: &PlacementContext,
        rng: &mut R,
    ) -> Option<&'a Candidate> {
        if !self.should_deliver(context, rng.random_range(0..100)) {
            debug!("Delivery rate skipped {}", context.placement_area());
            return None;
        }
        let roll = rng.random_range(0..99);
        self.select_with_roll(ranked, context, roll, rng)
    }

    /// Choose with a fixed tier roll; randomness inside the tier comes from `rng`.
    pub fn select_with_roll<'a, R: Rng + ?Sized>(
        &self,
        ranked: &'a [Candidate],
        context: &PlacementContext,
        roll: u32,
        rng: &mut R,
    ) -> Option<&'a Candidate> {
        if ranked.is_empty() {
            return None;
        }
        let area = context.placement_area();
        let tier = self.tier_for(area, roll);
        debug!("Selection roll {} in {} -> {:?}", roll, area, tier);

        let low_impressions = self.config.low_impression_count(area);
        match tier {
            SelectionTier::Random => ranked.choose(rng),
            SelectionTier::SeldomSeenWeighted => {
                let seldom_seen: Vec<&Candidate> = ranked
                    .iter()
                    .filter(|c| c.impressions_count < low_impressions || c.priority)
                    .collect();
                weighted_pick(&seldom_seen, context, self.config.preferred_content_boost, rng).or_else(|| ranked.choose(rng))
            }
            SelectionTier::NewOnly => {
                let new_only: Vec<&Candidate> = ranked
                    .iter()
                    .filter(|c| c.impressions_count < low_impressions)
                    .collect();
                match new_only.choose(rng) {
                    Some(candidate) => Some(*candidate),
                    None => top_ranked_pick(ranked, rng),
                }
            }
            SelectionTier::TopRanked => top_ranked_pick(ranked, rng),
        }
    }
}

/// Sample from the first `k` ranked candidates, `k` uniform in `1..=15`.
///
/// Higher-ranked candidates fall inside more windows, so they win more often.
fn top_ranked_pick<'a, R: Rng + ?Sized>(ranked: &'a [Candidate], rng: &mut R) -> Option<&'a Candidate> {
    let window = rng.random_range(1..=TOP_RANKED_WINDOW).min(ranked.len());
    ranked[..window].choose(rng)
}

/// Weighted draw over `pool`, accumulating weights in candidate-id order.
fn weighted_pick<'a, R: Rng + ?Sized>(
    pool: &[&'a Candidate],
    context: &PlacementContext,
    boost_preferred: bool,
    rng: &mut R,
) -> Option<&'a Candidate> {
    if pool.is_empty() {
        return None;
    }
    let mut ordered: Vec<&'a Candidate> = pool.to_vec();
    ordered.sort_by_key(|candidate| candidate.id);

    let weights: Vec<u64> = ordered
        .iter()
        .map(|candidate| effective_weight(candidate, context, boost_preferred))
        .collect();
    let total: u64 = weights.iter().sum();
    let target = rng.random::<f64>() * total as f64;

    let mut running = 0u64;
    for (candidate, weight) in ordered.iter().zip(&weights) {
        running += weight;
        if running as f64 >= target {
            return Some(*candidate);
        }
    }
    ordered.last().copied()
}

fn effective_weight(candidate: &Candidate, context: &PlacementContext, boost_preferred: bool) -> u64 {
    let weight = u64::from(candidate.weight);
    match context.content_id() {
        Some(content_id) if boost_preferred && candidate.preferred_content_ids.contains(&content_id) => {
            weight * PREFERRED_CONTENT_BOOST
        }
        _ => weight,
    }
}
