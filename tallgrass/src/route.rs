use anyhow::{Context, Result};
use clap::Args;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use tallgrass_core::{RouteConfig, find_preset};

/// Route selection shared by every subcommand.
///
/// Precedence: explicit flags, then `--config` or `--preset`, then defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct RouteArgs {
    /// Built-in route preset (see `tallgrass presets`)
    #[arg(long, conflicts_with = "config")]
    pub preset: Option<String>,

    /// JSON route description to load
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base encounter rate of the area
    #[arg(short = 'e', long)]
    pub encounter_rate: Option<u32>,

    /// Tiles on which a new patch of grass is entered (space or comma separated)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub new_bush_tiles: Option<Vec<u32>>,

    /// Number of tiles to walk
    #[arg(long, visible_alias = "step-count")]
    pub max_tiles: Option<u32>,

    /// Tiles after which protection is reset, e.g. the start of a second pass
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub protection_reset_tiles: Option<Vec<u32>>,
}

pub fn load_route_file(path: &Path) -> Result<RouteConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    RouteConfig::from_json(&json).with_context(|| format!("invalid route in {}", path.display()))
}

/// Build the route from presets, files and flag overrides.
///
/// Validation is left to the engine entry points so each walk applies its
/// own constraints.
pub fn resolve_route(args: &RouteArgs) -> Result<RouteConfig> {
    let mut route = if let Some(path) = &args.config {
        load_route_file(path)?
    } else if let Some(key) = &args.preset {
        find_preset(key)?.config()
    } else {
        RouteConfig::default()
    };

    if let Some(rate) = args.encounter_rate {
        route.base_rate = rate;
    }
    if let Some(tiles) = &args.new_bush_tiles {
        route.bush_entry_tiles = tiles.iter().copied().collect();
    }
    if let Some(max_tiles) = args.max_tiles {
        route.max_tiles = max_tiles;
    }
    if let Some(tiles) = &args.protection_reset_tiles {
        route.protection_reset_tiles = tiles.iter().copied().collect();
    }

    debug!("resolved route: {route:?}");
    Ok(route)
}

/// First-encounter odds model protection by tile index and never apply reset
/// tiles; clear them so the printed route matches what was computed.
pub fn drop_unused_resets(route: &mut RouteConfig) {
    if !route.protection_reset_tiles.is_empty() {
        warn!(
            "ignoring protection reset tiles {:?}; they only affect encounter-count walks",
            route.protection_reset_tiles
        );
        route.protection_reset_tiles.clear();
    }
}
