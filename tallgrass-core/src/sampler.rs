//! Seeded Monte Carlo walks used to cross-check the exact engine
//!
//! A sampled walker follows the same mechanic the branching tables encode,
//! drawing each decision from an RNG instead of enumerating it.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::RouteConfig;
use crate::constants::{BUSH_TRANSITION_SHIELD_CHANCE, PROTECTED_SKIP_CHANCE, RATE_DENOMINATOR};
use crate::rate::encounter_rate_numerator;

/// Outcome of one sampled walk over the whole route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSample {
    pub first_encounter_tile: Option<u32>,
    pub encounter_count: u32,
}

/// How protection is tracked while walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protection {
    /// Countdown restarted by encounters and reset tiles.
    Countdown,
    /// Tiles up to the protected step count, with no resets.
    ByTileIndex,
}

fn walk_route<R: Rng>(
    config: &RouteConfig,
    rng: &mut R,
    protection: Protection,
    stop_at_first_encounter: bool,
) -> WalkSample {
    let protected_step_count = config.protected_step_count();
    let mut buff = 0u32;
    let mut protected_steps_remaining = protected_step_count;
    let mut sample = WalkSample {
        first_encounter_tile: None,
        encounter_count: 0,
    };

    for tile in 1..=config.max_tiles {
        let protected = match protection {
            Protection::Countdown => protected_steps_remaining > 0,
            Protection::ByTileIndex => tile <= protected_step_count,
        };
        let regime = config.regime_for(tile, protected);
        let checked = !regime.is_protected() || !rng.gen_bool(PROTECTED_SKIP_CHANCE);
        let shielded =
            checked && regime.is_bush_entry() && rng.gen_bool(BUSH_TRANSITION_SHIELD_CHANCE);
        let numerator = encounter_rate_numerator(config.base_rate, buff);
        let hit = checked && !shielded && rng.gen_range(0..RATE_DENOMINATOR) < numerator;

        if hit {
            sample.encounter_count += 1;
            if sample.first_encounter_tile.is_none() {
                sample.first_encounter_tile = Some(tile);
            }
            if stop_at_first_encounter {
                break;
            }
            buff = 0;
            protected_steps_remaining = protected_step_count;
            continue;
        }
        if checked && !shielded {
            buff = buff.saturating_add(config.base_rate);
        }
        protected_steps_remaining = if config.is_reset_tile(tile.saturating_add(1)) {
            protected_step_count
        } else {
            protected_steps_remaining.saturating_sub(1)
        };
    }
    sample
}

/// Walk the whole route once, drawing every roll from `rng`.
///
/// Protection restarts after each encounter and at every reset tile, which
/// matches the encounter-count engine.
pub fn sample_walk<R: Rng>(config: &RouteConfig, rng: &mut R) -> WalkSample {
    walk_route(config, rng, Protection::Countdown, false)
}

/// Walk until the first encounter and return its tile.
///
/// Protection covers the first `protected_step_count` tiles and reset tiles
/// are not applied, which matches the first-encounter engine.
pub fn sample_first_encounter<R: Rng>(config: &RouteConfig, rng: &mut R) -> Option<u32> {
    walk_route(config, rng, Protection::ByTileIndex, true).first_encounter_tile
}

/// Aggregated outcomes of many sampled walks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SampleSummary {
    pub trials: u64,
    pub seed: u64,
    /// First-encounter tiles sampled the way [`sample_first_encounter`] walks.
    pub first_encounter_tiles: BTreeMap<u32, u64>,
    pub without_encounter: u64,
    pub encounter_counts: BTreeMap<u32, u64>,
}

impl SampleSummary {
    fn ratio(&self, hits: u64) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = hits as f64 / self.trials as f64;
        ratio
    }

    /// Observed chance that the first encounter happened on `tile`.
    #[must_use]
    pub fn first_encounter_chance(&self, tile: u32) -> f64 {
        self.ratio(self.first_encounter_tiles.get(&tile).copied().unwrap_or(0))
    }

    /// Observed chance that the first encounter happened on or before `tile`.
    #[must_use]
    pub fn cumulative_chance(&self, tile: u32) -> f64 {
        self.ratio(self.first_encounter_tiles.range(..=tile).map(|(_, n)| n).sum())
    }

    #[must_use]
    pub fn count_chance(&self, count: u32) -> f64 {
        self.ratio(self.encounter_counts.get(&count).copied().unwrap_or(0))
    }
}

/// Run `trials` walks from a ChaCha stream seeded with `seed`.
///
/// Without reset tiles the two protection models agree up to the first
/// encounter, so each trial's full walk also supplies its first-encounter
/// tile. Otherwise a separate first-encounter walk is drawn per trial.
#[must_use]
pub fn sample_route(config: &RouteConfig, trials: u64, seed: u64) -> SampleSummary {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut summary = SampleSummary {
        trials,
        seed,
        ..SampleSummary::default()
    };
    let resets = !config.protection_reset_tiles.is_empty();
    for _ in 0..trials {
        let sample = sample_walk(config, &mut rng);
        let first_encounter_tile = if resets {
            sample_first_encounter(config, &mut rng)
        } else {
            sample.first_encounter_tile
        };
        match first_encounter_tile {
            Some(tile) => *summary.first_encounter_tiles.entry(tile).or_insert(0) += 1,
            None => summary.without_encounter += 1,
        }
        *summary
            .encounter_counts
            .entry(sample.encounter_count)
            .or_insert(0) += 1;
    }
    summary
}
