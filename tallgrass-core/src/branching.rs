//! Branching engine: expands one universe into its successors for a tile
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::Debug;

use crate::config::RouteConfig;
use crate::rate::encounter_rate;
use crate::regime::{Regime, RollKind};

/// Successors produced by a single branch; no regime has more than four rules.
pub type Successors<U> = SmallVec<[Successor<U>; 4]>;

/// Per-tile facts every universe needs to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepContext {
    /// One-based index of the tile being stepped onto.
    pub tile: u32,
    pub base_rate: u32,
    pub protected_step_count: u32,
    pub bush_entry: bool,
    /// The following tile forces the protection countdown back to full.
    pub next_tile_resets: bool,
}

impl StepContext {
    #[must_use]
    pub fn for_tile(config: &RouteConfig, tile: u32) -> Self {
        Self {
            tile,
            base_rate: config.base_rate,
            protected_step_count: config.protected_step_count(),
            bush_entry: config.is_bush_entry(tile),
            next_tile_resets: config.is_reset_tile(tile.saturating_add(1)),
        }
    }

    #[must_use]
    pub fn regime_for<U: Universe>(&self, universe: &U) -> Regime {
        Regime::classify(universe.is_protected(self), self.bush_entry)
    }
}

/// One branch of the enumerated probability tree.
///
/// Implementors decide which fields distinguish branches going forward
/// (the merge key) and how each roll moves them.
pub trait Universe: Copy + Debug {
    type Key: Ord + Copy + Debug;

    /// The single universe a walk starts from, holding all the mass.
    fn seed(config: &RouteConfig) -> Self;

    fn buff(&self) -> u32;

    fn mass(&self) -> f64;

    fn add_mass(&mut self, mass: f64);

    #[must_use]
    fn with_mass(self, mass: f64) -> Self;

    fn key(&self) -> Self::Key;

    fn is_protected(&self, ctx: &StepContext) -> bool;

    /// Move the universe across one roll; mass is left untouched.
    fn advance(self, roll: RollKind, ctx: &StepContext) -> Successor<Self>;
}

/// A universe produced by branching, with the flag the merger needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Successor<U> {
    pub universe: U,
    /// The encounter fired on this tile and the branch leaves the walk.
    pub just_encountered: bool,
}

impl<U> Successor<U> {
    #[must_use]
    pub const fn live(universe: U) -> Self {
        Self {
            universe,
            just_encountered: false,
        }
    }

    #[must_use]
    pub const fn encountered(universe: U) -> Self {
        Self {
            universe,
            just_encountered: true,
        }
    }
}

/// Branch universe used when only the first encounter matters.
///
/// Protection is a function of the tile index, so the buff alone tells
/// live universes apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstEncounterUniverse {
    pub buff: u32,
    pub mass: f64,
}

impl Universe for FirstEncounterUniverse {
    type Key = u32;

    fn seed(_config: &RouteConfig) -> Self {
        Self { buff: 0, mass: 1.0 }
    }

    fn buff(&self) -> u32 {
        self.buff
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn add_mass(&mut self, mass: f64) {
        self.mass += mass;
    }

    fn with_mass(self, mass: f64) -> Self {
        Self { mass, ..self }
    }

    fn key(&self) -> u32 {
        self.buff
    }

    fn is_protected(&self, ctx: &StepContext) -> bool {
        ctx.tile <= ctx.protected_step_count
    }

    fn advance(self, roll: RollKind, ctx: &StepContext) -> Successor<Self> {
        match roll {
            RollKind::Hit => Successor::encountered(self),
            RollKind::Missed => Successor::live(Self {
                buff: self.buff.saturating_add(ctx.base_rate),
                ..self
            }),
            RollKind::Skipped | RollKind::Shielded => Successor::live(self),
        }
    }
}

/// Branch universe used when counting every encounter along the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncounterCountUniverse {
    pub buff: u32,
    pub protected_steps_remaining: u32,
    pub encounter_count: u32,
    pub mass: f64,
}

impl Universe for EncounterCountUniverse {
    /// `(encounter_count, protected_steps_remaining, buff)`
    type Key = (u32, u32, u32);

    fn seed(config: &RouteConfig) -> Self {
        Self {
            buff: 0,
            protected_steps_remaining: config.protected_step_count(),
            encounter_count: 0,
            mass: 1.0,
        }
    }

    fn buff(&self) -> u32 {
        self.buff
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn add_mass(&mut self, mass: f64) {
        self.mass += mass;
    }

    fn with_mass(self, mass: f64) -> Self {
        Self { mass, ..self }
    }

    fn key(&self) -> Self::Key {
        (
            self.encounter_count,
            self.protected_steps_remaining,
            self.buff,
        )
    }

    fn is_protected(&self, _ctx: &StepContext) -> bool {
        self.protected_steps_remaining > 0
    }

    fn advance(self, roll: RollKind, ctx: &StepContext) -> Successor<Self> {
        if roll.is_encounter() {
            return Successor::live(Self {
                buff: 0,
                protected_steps_remaining: ctx.protected_step_count,
                encounter_count: self.encounter_count.saturating_add(1),
                mass: self.mass,
            });
        }
        let protected_steps_remaining = if ctx.next_tile_resets {
            ctx.protected_step_count
        } else {
            self.protected_steps_remaining.saturating_sub(1)
        };
        let buff = if roll.grows_buff() {
            self.buff.saturating_add(ctx.base_rate)
        } else {
            self.buff
        };
        Successor::live(Self {
            buff,
            protected_steps_remaining,
            ..self
        })
    }
}

/// Expand `universe` under `regime` into successors carrying absolute mass.
///
/// Conditional probabilities of the successors sum to one, so the total
/// successor mass equals the universe's mass up to rounding.
#[must_use]
pub fn branch<U: Universe>(universe: U, regime: Regime, ctx: &StepContext) -> Successors<U> {
    let rate = encounter_rate(ctx.base_rate, universe.buff());
    regime
        .rules()
        .iter()
        .map(|rule| {
            let conditional = rule.weight * rule.roll.factor(rate);
            let mut successor = universe.advance(rule.roll, ctx);
            successor.universe = successor.universe.with_mass(universe.mass() * conditional);
            successor
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(tile: u32, bush_entry: bool, next_tile_resets: bool) -> StepContext {
        StepContext {
            tile,
            base_rate: 21,
            protected_step_count: 6,
            bush_entry,
            next_tile_resets,
        }
    }

    fn successor_mass<U: Universe>(successors: &Successors<U>) -> f64 {
        successors.iter().map(|s| s.universe.mass()).sum()
    }

    #[test]
    fn context_reads_config() {
        let cfg = RouteConfig::new(21, 50)
            .with_bush_entry_tiles([1, 6])
            .with_protection_reset_tiles([7]);
        let step = StepContext::for_tile(&cfg, 6);
        assert!(step.bush_entry);
        assert!(step.next_tile_resets);
        assert_eq!(step.protected_step_count, 6);
        let step = StepContext::for_tile(&cfg, 7);
        assert!(!step.bush_entry);
        assert!(!step.next_tile_resets);
    }

    #[test]
    fn first_tile_bush_entry_hit_mass() {
        let cfg = RouteConfig::default();
        let step = StepContext::for_tile(&cfg, 1);
        let seed = FirstEncounterUniverse::seed(&cfg);
        let regime = step.regime_for(&seed);
        assert_eq!(regime, Regime::ProtectedBushEntry);
        let successors = branch(seed, regime, &step);
        assert_eq!(successors.len(), 4);
        let hit: f64 = successors
            .iter()
            .filter(|s| s.just_encountered)
            .map(|s| s.universe.mass)
            .sum();
        assert!((hit - 0.0063).abs() < 1e-12);
        assert!((successor_mass(&successors) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn first_encounter_protection_follows_tile_index() {
        let universe = FirstEncounterUniverse { buff: 0, mass: 1.0 };
        assert!(universe.is_protected(&ctx(6, false, false)));
        assert!(!universe.is_protected(&ctx(7, false, false)));
    }

    #[test]
    fn missed_roll_grows_buff_by_base_rate() {
        let universe = FirstEncounterUniverse {
            buff: 42,
            mass: 0.5,
        };
        let successors = branch(universe, Regime::UnprotectedOrdinary, &ctx(10, false, false));
        let missed = successors
            .iter()
            .find(|s| !s.just_encountered)
            .expect("missed branch");
        assert_eq!(missed.universe.buff, 63);
        let expected = 0.5 * (1.0 - encounter_rate(21, 42));
        assert!((missed.universe.mass - expected).abs() < 1e-12);
    }

    #[test]
    fn count_hit_resets_buff_and_protection() {
        let universe = EncounterCountUniverse {
            buff: 84,
            protected_steps_remaining: 0,
            encounter_count: 2,
            mass: 1.0,
        };
        let successors = branch(universe, Regime::UnprotectedOrdinary, &ctx(20, false, false));
        let hit = successors
            .iter()
            .find(|s| s.universe.encounter_count == 3)
            .expect("hit branch");
        assert!(!hit.just_encountered);
        assert_eq!(hit.universe.buff, 0);
        assert_eq!(hit.universe.protected_steps_remaining, 6);
        assert!((hit.universe.mass - encounter_rate(21, 84)).abs() < 1e-12);
    }

    #[test]
    fn count_protection_decrements_then_floors() {
        let universe = EncounterCountUniverse {
            buff: 0,
            protected_steps_remaining: 1,
            encounter_count: 0,
            mass: 1.0,
        };
        let step = ctx(6, false, false);
        assert_eq!(step.regime_for(&universe), Regime::ProtectedOrdinary);
        for successor in branch(universe, Regime::ProtectedOrdinary, &step) {
            if successor.universe.encounter_count == 0 {
                assert_eq!(successor.universe.protected_steps_remaining, 0);
            }
        }
        let exhausted = EncounterCountUniverse {
            protected_steps_remaining: 0,
            ..universe
        };
        let successors = branch(exhausted, Regime::UnprotectedOrdinary, &step);
        assert_eq!(successors[0].universe.protected_steps_remaining, 0);
    }

    #[test]
    fn reset_tile_restores_protection_on_quiet_branches() {
        let universe = EncounterCountUniverse {
            buff: 21,
            protected_steps_remaining: 0,
            encounter_count: 1,
            mass: 1.0,
        };
        let successors = branch(universe, Regime::UnprotectedBushEntry, &ctx(21, true, true));
        assert_eq!(successors.len(), 3);
        for successor in &successors {
            assert_eq!(successor.universe.protected_steps_remaining, 6);
        }
        assert!((successor_mass(&successors) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn shielded_and_skipped_keep_buff() {
        let universe = EncounterCountUniverse {
            buff: 63,
            protected_steps_remaining: 3,
            encounter_count: 0,
            mass: 1.0,
        };
        let successors = branch(universe, Regime::ProtectedBushEntry, &ctx(4, true, false));
        assert_eq!(successors[0].universe.buff, 63);
        assert!((successors[0].universe.mass - 0.95).abs() < 1e-12);
        assert_eq!(successors[1].universe.buff, 63);
        assert!((successors[1].universe.mass - 0.02).abs() < 1e-12);
        assert_eq!(successors[2].universe.buff, 84);
    }
}
