//! Named route presets
use crate::config::{ConfigError, RouteConfig};

/// A named, ready-to-walk route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePreset {
    pub key: &'static str,
    pub description: &'static str,
    base_rate: u32,
    max_tiles: u32,
    bush_entry_tiles: &'static [u32],
    protection_reset_tiles: &'static [u32],
}

impl RoutePreset {
    #[must_use]
    pub fn config(&self) -> RouteConfig {
        RouteConfig::new(self.base_rate, self.max_tiles)
            .with_bush_entry_tiles(self.bush_entry_tiles.iter().copied())
            .with_protection_reset_tiles(self.protection_reset_tiles.iter().copied())
    }
}

// Route 1 enters new grass on tiles 1, 6, 9, 13 and 17 when walked without
// encounters. The second pass starts on tile 22 with fresh protection.
const ROUTE_ONE_BUSHES: &[u32] = &[1, 6, 9, 13, 17];
const ROUTE_ONE_TWO_PASS_BUSHES: &[u32] = &[1, 6, 9, 13, 17, 22, 27, 30, 34, 38];

pub const PRESETS: &[RoutePreset] = &[
    RoutePreset {
        key: "route-one",
        description: "Route 1, single pass through the grass",
        base_rate: 21,
        max_tiles: 200,
        bush_entry_tiles: ROUTE_ONE_BUSHES,
        protection_reset_tiles: &[],
    },
    RoutePreset {
        key: "route-one-two-pass",
        description: "Route 1 walked twice, leaving left out of the second-to-last patch",
        base_rate: 21,
        max_tiles: 42,
        bush_entry_tiles: ROUTE_ONE_TWO_PASS_BUSHES,
        protection_reset_tiles: &[22],
    },
];

/// Look up a preset by key.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPreset`] when no preset has that key.
pub fn find_preset(key: &str) -> Result<&'static RoutePreset, ConfigError> {
    PRESETS
        .iter()
        .find(|preset| preset.key.eq_ignore_ascii_case(key))
        .ok_or_else(|| ConfigError::UnknownPreset(key.to_string()))
}
