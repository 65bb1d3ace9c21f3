//! Step classification and the branching rule table
//!
//! Each tile is walked under one of four regimes. A regime owns a static
//! table of [`BranchRule`]s; the branching engine multiplies each rule's
//! weight by the roll factor (`1`, `q` or `p`) to get the conditional
//! probability of the successor.
use serde::{Deserialize, Serialize};

use crate::constants::{
    BUSH_TRANSITION_CHECK_CHANCE, BUSH_TRANSITION_SHIELD_CHANCE, PROTECTED_BUSH_CHECK_CHANCE,
    PROTECTED_BUSH_SHIELD_CHANCE, PROTECTED_CHECK_CHANCE, PROTECTED_SKIP_CHANCE,
};

/// How a single branch resolves the encounter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollKind {
    /// Protected step that never performs the check.
    Skipped,
    /// Check suppressed by the bush-entry transition.
    Shielded,
    /// Check performed without an encounter.
    Missed,
    /// Check performed and the encounter fires.
    Hit,
}

impl RollKind {
    /// Probability factor applied on top of the rule weight.
    #[must_use]
    pub fn factor(self, encounter_rate: f64) -> f64 {
        match self {
            Self::Skipped | Self::Shielded => 1.0,
            Self::Missed => 1.0 - encounter_rate,
            Self::Hit => encounter_rate,
        }
    }

    /// Whether the roll performed a check that grows the buff.
    #[must_use]
    pub const fn grows_buff(self) -> bool {
        matches!(self, Self::Missed)
    }

    #[must_use]
    pub const fn is_encounter(self) -> bool {
        matches!(self, Self::Hit)
    }
}

/// One row of a regime's branching table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchRule {
    pub weight: f64,
    pub roll: RollKind,
}

const fn rule(weight: f64, roll: RollKind) -> BranchRule {
    BranchRule { weight, roll }
}

const PROTECTED_ORDINARY: [BranchRule; 3] = [
    rule(PROTECTED_SKIP_CHANCE, RollKind::Skipped),
    rule(PROTECTED_CHECK_CHANCE, RollKind::Missed),
    rule(PROTECTED_CHECK_CHANCE, RollKind::Hit),
];

const PROTECTED_BUSH_ENTRY: [BranchRule; 4] = [
    rule(PROTECTED_SKIP_CHANCE, RollKind::Skipped),
    rule(PROTECTED_BUSH_SHIELD_CHANCE, RollKind::Shielded),
    rule(PROTECTED_BUSH_CHECK_CHANCE, RollKind::Missed),
    rule(PROTECTED_BUSH_CHECK_CHANCE, RollKind::Hit),
];

const UNPROTECTED_BUSH_ENTRY: [BranchRule; 3] = [
    rule(BUSH_TRANSITION_SHIELD_CHANCE, RollKind::Shielded),
    rule(BUSH_TRANSITION_CHECK_CHANCE, RollKind::Missed),
    rule(BUSH_TRANSITION_CHECK_CHANCE, RollKind::Hit),
];

const UNPROTECTED_ORDINARY: [BranchRule; 2] =
    [rule(1.0, RollKind::Missed), rule(1.0, RollKind::Hit)];

/// Branching regime of a single tile for a single branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    ProtectedOrdinary,
    ProtectedBushEntry,
    UnprotectedBushEntry,
    UnprotectedOrdinary,
}

impl Regime {
    #[must_use]
    pub const fn classify(protected: bool, bush_entry: bool) -> Self {
        match (protected, bush_entry) {
            (true, false) => Self::ProtectedOrdinary,
            (true, true) => Self::ProtectedBushEntry,
            (false, true) => Self::UnprotectedBushEntry,
            (false, false) => Self::UnprotectedOrdinary,
        }
    }

    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::ProtectedOrdinary | Self::ProtectedBushEntry)
    }

    #[must_use]
    pub const fn is_bush_entry(self) -> bool {
        matches!(self, Self::ProtectedBushEntry | Self::UnprotectedBushEntry)
    }

    #[must_use]
    pub const fn rules(self) -> &'static [BranchRule] {
        match self {
            Self::ProtectedOrdinary => &PROTECTED_ORDINARY,
            Self::ProtectedBushEntry => &PROTECTED_BUSH_ENTRY,
            Self::UnprotectedBushEntry => &UNPROTECTED_BUSH_ENTRY,
            Self::UnprotectedOrdinary => &UNPROTECTED_ORDINARY,
        }
    }

    /// Total chance of the encounter firing in this regime at `encounter_rate`.
    #[must_use]
    pub fn hit_chance(self, encounter_rate: f64) -> f64 {
        self.rules()
            .iter()
            .filter(|rule| rule.roll.is_encounter())
            .map(|rule| rule.weight * rule.roll.factor(encounter_rate))
            .sum()
    }
}
