//! Simulation driver: walks the route tile by tile
//!
//! Every tile classifies and branches each live universe, merges the
//! successors and replaces the population wholesale. Mass that encounters
//! is retired (first-encounter walks) or kept in the population under a
//! higher encounter count (count walks).
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::branching::{
    EncounterCountUniverse, FirstEncounterUniverse, StepContext, Universe, branch,
};
use crate::config::{ConfigError, RouteConfig};
use crate::constants::CONVERGENCE_THRESHOLD;
use crate::merge::merge_successors;
use crate::report::{EncounterDistribution, FirstEncounterReport, TileResult};

/// Lifecycle of a walk. Both terminal states are normal termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkStatus {
    Running,
    /// Encountered mass reached [`CONVERGENCE_THRESHOLD`].
    Converged,
    /// Every configured tile was walked.
    ExhaustedSteps,
}

/// Summary of a single walked tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStep {
    pub tile: u32,
    /// Mass that encountered on this tile and left the population.
    pub retired_mass: f64,
    pub live_states: usize,
}

/// Generic tile loop shared by both walk kinds.
#[derive(Debug, Clone)]
pub struct Walk<'a, U> {
    config: &'a RouteConfig,
    next_tile: u32,
    population: Vec<U>,
    retired_mass: f64,
    status: WalkStatus,
}

impl<'a, U: Universe> Walk<'a, U> {
    #[must_use]
    pub fn new(config: &'a RouteConfig) -> Self {
        Self {
            config,
            next_tile: 1,
            population: vec![U::seed(config)],
            retired_mass: 0.0,
            status: WalkStatus::Running,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RouteConfig {
        self.config
    }

    #[must_use]
    pub const fn status(&self) -> WalkStatus {
        self.status
    }

    #[must_use]
    pub fn population(&self) -> &[U] {
        &self.population
    }

    /// Number of tiles walked so far.
    #[must_use]
    pub const fn tiles_walked(&self) -> u32 {
        self.next_tile - 1
    }

    #[must_use]
    pub fn live_mass(&self) -> f64 {
        self.population.iter().map(Universe::mass).sum()
    }

    /// Mass retired as encountered since the walk started.
    #[must_use]
    pub const fn retired_mass(&self) -> f64 {
        self.retired_mass
    }

    /// Distance of live plus retired mass from one.
    #[must_use]
    pub fn mass_drift(&self) -> f64 {
        (self.live_mass() + self.retired_mass - 1.0).abs()
    }

    /// Walk the next tile, or finish the walk when every tile is done.
    pub fn step(&mut self) -> Option<TileStep> {
        if self.status != WalkStatus::Running {
            return None;
        }
        if self.next_tile > self.config.max_tiles {
            self.finish(WalkStatus::ExhaustedSteps);
            return None;
        }

        let tile = self.next_tile;
        let ctx = StepContext::for_tile(self.config, tile);
        let successors = self
            .population
            .iter()
            .flat_map(|&universe| branch(universe, ctx.regime_for(&universe), &ctx));
        let merged = merge_successors(successors);

        self.population = merged.population;
        self.retired_mass += merged.retired_mass;
        self.next_tile += 1;

        trace!(
            "tile {tile}: {} live states, retired {:.6}, live mass {:.6}",
            self.population.len(),
            merged.retired_mass,
            self.live_mass()
        );

        Some(TileStep {
            tile,
            retired_mass: merged.retired_mass,
            live_states: self.population.len(),
        })
    }

    fn finish(&mut self, status: WalkStatus) {
        self.status = status;
        debug!(
            "walk finished after {} tiles: {status:?}, drift {:.3e}",
            self.tiles_walked(),
            self.mass_drift()
        );
    }
}

/// Per-tile first-encounter odds, yielded lazily.
///
/// Stopping iteration early is always safe; every yielded tile is final.
#[derive(Debug, Clone)]
pub struct FirstEncounterWalk<'a> {
    walk: Walk<'a, FirstEncounterUniverse>,
    cumulative_chance: f64,
}

impl<'a> FirstEncounterWalk<'a> {
    #[must_use]
    pub fn new(config: &'a RouteConfig) -> Self {
        Self {
            walk: Walk::new(config),
            cumulative_chance: 0.0,
        }
    }

    #[must_use]
    pub const fn status(&self) -> WalkStatus {
        self.walk.status()
    }

    #[must_use]
    pub const fn walk(&self) -> &Walk<'a, FirstEncounterUniverse> {
        &self.walk
    }

    #[must_use]
    pub const fn cumulative_chance(&self) -> f64 {
        self.cumulative_chance
    }

    /// Drain the walk into a report.
    #[must_use]
    pub fn run(mut self) -> FirstEncounterReport {
        let tiles: Vec<TileResult> = self.by_ref().collect();
        FirstEncounterReport {
            tiles,
            status: self.status(),
            protected_step_count: self.walk.config().protected_step_count(),
        }
    }
}

impl Iterator for FirstEncounterWalk<'_> {
    type Item = TileResult;

    fn next(&mut self) -> Option<TileResult> {
        if self.walk.status() != WalkStatus::Running {
            return None;
        }
        if self.cumulative_chance >= CONVERGENCE_THRESHOLD {
            self.walk.finish(WalkStatus::Converged);
            return None;
        }
        let step = self.walk.step()?;
        self.cumulative_chance += step.retired_mass;
        Some(TileResult {
            tile: step.tile,
            exact_chance: step.retired_mass,
            cumulative_chance: self.cumulative_chance,
        })
    }
}

/// Encounter-count walk; always runs the full configured route.
#[derive(Debug, Clone)]
pub struct EncounterCountWalk<'a> {
    walk: Walk<'a, EncounterCountUniverse>,
}

impl<'a> EncounterCountWalk<'a> {
    #[must_use]
    pub fn new(config: &'a RouteConfig) -> Self {
        Self {
            walk: Walk::new(config),
        }
    }

    #[must_use]
    pub const fn walk(&self) -> &Walk<'a, EncounterCountUniverse> {
        &self.walk
    }

    pub fn step(&mut self) -> Option<TileStep> {
        self.walk.step()
    }

    /// Distribution over encounter counts for the tiles walked so far.
    #[must_use]
    pub fn distribution(&self) -> EncounterDistribution {
        EncounterDistribution::from_population(self.walk.population())
    }

    #[must_use]
    pub fn run(mut self) -> EncounterDistribution {
        while self.step().is_some() {}
        self.distribution()
    }
}

/// Validate `config` and compute first-encounter odds for every tile.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the configuration is rejected.
pub fn first_encounter_odds(config: &RouteConfig) -> Result<FirstEncounterReport, ConfigError> {
    config.validate_nonempty()?;
    Ok(FirstEncounterWalk::new(config).run())
}

/// Validate `config` and compute the encounter-count distribution.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the configuration is rejected.
pub fn encounter_count_odds(config: &RouteConfig) -> Result<EncounterDistribution, ConfigError> {
    config.validate()?;
    Ok(EncounterCountWalk::new(config).run())
}
