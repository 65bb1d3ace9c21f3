//! Route configuration consumed by the engine
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::constants::{
    DEFAULT_BASE_RATE, DEFAULT_BUSH_ENTRY_TILE, DEFAULT_MAX_TILES, PROTECTED_STEP_BASE,
    PROTECTED_STEP_RATE_DIVISOR,
};
use crate::regime::Regime;

/// Immutable description of the route being walked.
///
/// Tiles are numbered from 1. Every engine component borrows the same value;
/// nothing is derived from process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Raw encounter rate of the area.
    #[serde(alias = "encounter_rate")]
    pub base_rate: u32,
    /// Tiles on which new cover is entered.
    #[serde(default, alias = "new_bush_tiles")]
    pub bush_entry_tiles: BTreeSet<u32>,
    /// Upper bound on simulated tiles.
    #[serde(default = "RouteConfig::default_max_tiles", alias = "step_count")]
    pub max_tiles: u32,
    /// Tiles after which the protection countdown is forced back to full.
    #[serde(default)]
    pub protection_reset_tiles: BTreeSet<u32>,
}

impl RouteConfig {
    const fn default_max_tiles() -> u32 {
        DEFAULT_MAX_TILES
    }

    #[must_use]
    pub fn new(base_rate: u32, max_tiles: u32) -> Self {
        Self {
            base_rate,
            bush_entry_tiles: BTreeSet::new(),
            max_tiles,
            protection_reset_tiles: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_bush_entry_tiles(mut self, tiles: impl IntoIterator<Item = u32>) -> Self {
        self.bush_entry_tiles = tiles.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_protection_reset_tiles(mut self, tiles: impl IntoIterator<Item = u32>) -> Self {
        self.protection_reset_tiles = tiles.into_iter().collect();
        self
    }

    /// Parse and validate a JSON route description.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation
    /// error raised by [`RouteConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of protected steps granted after an encounter or reset.
    #[must_use]
    pub const fn protected_step_count(&self) -> u32 {
        PROTECTED_STEP_BASE.saturating_sub(self.base_rate / PROTECTED_STEP_RATE_DIVISOR)
    }

    #[must_use]
    pub fn is_bush_entry(&self, tile: u32) -> bool {
        self.bush_entry_tiles.contains(&tile)
    }

    #[must_use]
    pub fn is_reset_tile(&self, tile: u32) -> bool {
        self.protection_reset_tiles.contains(&tile)
    }

    /// Regime governing `tile` for a branch whose protection is `protected`.
    #[must_use]
    pub fn regime_for(&self, tile: u32, protected: bool) -> Regime {
        Regime::classify(protected, self.is_bush_entry(tile))
    }

    /// Reject configurations the engine cannot meaningfully walk.
    ///
    /// A zero `max_tiles` is accepted here; first-encounter walks check it
    /// separately because they need at least one tile to report.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_rate == 0 {
            return Err(ConfigError::ZeroBaseRate);
        }
        for (field, tiles) in [
            ("bush_entry_tiles", &self.bush_entry_tiles),
            ("protection_reset_tiles", &self.protection_reset_tiles),
        ] {
            if tiles.contains(&0) {
                return Err(ConfigError::TileOutOfRange { field, tile: 0 });
            }
        }
        Ok(())
    }

    /// Validation for walks that must simulate at least one tile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMaxTiles`] in addition to the checks of
    /// [`RouteConfig::validate`].
    pub fn validate_nonempty(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.max_tiles == 0 {
            return Err(ConfigError::ZeroMaxTiles);
        }
        Ok(())
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_RATE, DEFAULT_MAX_TILES)
            .with_bush_entry_tiles([DEFAULT_BUSH_ENTRY_TILE])
    }
}

/// Errors raised when route configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base encounter rate must be greater than zero")]
    ZeroBaseRate,
    #[error("max tile count must be greater than zero")]
    ZeroMaxTiles,
    #[error("{field} contains tile {tile}; tiles are numbered from 1")]
    TileOutOfRange { field: &'static str, tile: u32 },
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("route config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
