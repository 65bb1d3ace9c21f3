//! Tallgrass Encounter Engine
//!
//! Exact odds for wild encounters while walking through tall grass. The
//! engine enumerates every branch of the per-tile encounter roll, merges
//! branches that behave identically from then on, and reports either the
//! chance of the first encounter on each tile or the distribution over the
//! total number of encounters on a route.
//!
//! This crate has no I/O beyond parsing a JSON route description; callers
//! supply a [`RouteConfig`] and render the returned reports.

pub mod branching;
pub mod config;
pub mod constants;
pub mod driver;
pub mod merge;
pub mod presets;
pub mod rate;
pub mod regime;
pub mod report;
pub mod sampler;

// Re-export commonly used types
pub use branching::{
    EncounterCountUniverse, FirstEncounterUniverse, StepContext, Successor, Successors, Universe,
    branch,
};
pub use config::{ConfigError, RouteConfig};
pub use driver::{
    EncounterCountWalk, FirstEncounterWalk, TileStep, Walk, WalkStatus, encounter_count_odds,
    first_encounter_odds,
};
pub use merge::{Merged, merge_population, merge_successors};
pub use presets::{PRESETS, RoutePreset, find_preset};
pub use rate::{encounter_rate, encounter_rate_numerator};
pub use regime::{BranchRule, Regime, RollKind};
pub use report::{EncounterDistribution, FirstEncounterReport, TileResult};
pub use sampler::{SampleSummary, WalkSample, sample_first_encounter, sample_route, sample_walk};
