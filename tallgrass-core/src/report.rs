//! Result aggregation for finished or in-progress walks
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::branching::EncounterCountUniverse;
use crate::constants::DRIFT_WARN_THRESHOLD;
use crate::driver::WalkStatus;

/// First-encounter odds for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileResult {
    pub tile: u32,
    /// Chance that the first encounter happens on exactly this tile.
    pub exact_chance: f64,
    /// Chance that the first encounter happens on or before this tile.
    pub cumulative_chance: f64,
}

/// Complete first-encounter table for a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstEncounterReport {
    pub tiles: Vec<TileResult>,
    pub status: WalkStatus,
    pub protected_step_count: u32,
}

impl FirstEncounterReport {
    /// Chance that an encounter happened anywhere on the walked tiles.
    #[must_use]
    pub fn total_chance(&self) -> f64 {
        self.tiles.last().map_or(0.0, |t| t.cumulative_chance)
    }

    /// First tile whose cumulative chance reaches `threshold`.
    #[must_use]
    pub fn tile_reaching(&self, threshold: f64) -> Option<u32> {
        self.tiles
            .iter()
            .find(|t| t.cumulative_chance >= threshold)
            .map(|t| t.tile)
    }

    /// Mean first-encounter tile, conditional on an encounter within the walk.
    #[must_use]
    pub fn expected_tile(&self) -> Option<f64> {
        let total = self.total_chance();
        if total <= 0.0 {
            return None;
        }
        let weighted: f64 = self
            .tiles
            .iter()
            .map(|t| f64::from(t.tile) * t.exact_chance)
            .sum();
        Some(weighted / total)
    }
}

/// Distribution over the total number of encounters on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterDistribution {
    pub by_count: BTreeMap<u32, f64>,
    /// Sum of all probabilities; drift from one is floating-point error.
    pub total_mass: f64,
}

impl EncounterDistribution {
    #[must_use]
    pub fn from_population(population: &[EncounterCountUniverse]) -> Self {
        let mut by_count: BTreeMap<u32, f64> = BTreeMap::new();
        let mut total_mass = 0.0;
        for universe in population {
            *by_count.entry(universe.encounter_count).or_insert(0.0) += universe.mass;
            total_mass += universe.mass;
        }
        let distribution = Self {
            by_count,
            total_mass,
        };
        if distribution.drift() > DRIFT_WARN_THRESHOLD {
            warn!(
                "encounter distribution drifted from one: total {:.9}",
                distribution.total_mass
            );
        }
        distribution
    }

    #[must_use]
    pub fn probability(&self, count: u32) -> f64 {
        self.by_count.get(&count).copied().unwrap_or(0.0)
    }

    /// Chance of at least `count` encounters.
    #[must_use]
    pub fn at_least(&self, count: u32) -> f64 {
        self.by_count.range(count..).map(|(_, p)| p).sum()
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.by_count
            .iter()
            .map(|(&count, &p)| f64::from(count) * p)
            .sum()
    }

    #[must_use]
    pub fn drift(&self) -> f64 {
        (self.total_mass - 1.0).abs()
    }
}
