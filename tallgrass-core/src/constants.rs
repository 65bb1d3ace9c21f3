//! Centralized tuning constants for the encounter engine.
//!
//! These values mirror the fixed-point math of the step-encounter routine
//! being modelled. Keeping them together ensures the odds can only be
//! adjusted via reviewed code changes.

// Encounter rate ------------------------------------------------------------
/// Multiplier applied to the raw area rate to reach fixed point.
pub const RATE_SCALE: u64 = 16;
/// Fixed-point denominator; a numerator of this value is a certain encounter.
pub const RATE_DENOMINATOR: u64 = 1_600;
/// The buff contributes `buff * RATE_SCALE / BUFF_DIVISOR` to the numerator.
pub const BUFF_DIVISOR: u64 = 200;

// Protection ----------------------------------------------------------------
/// Upper bound of the protected-step countdown before the rate is applied.
pub const PROTECTED_STEP_BASE: u32 = 8;
/// Every tenth of base rate shortens the protected window by one step.
pub const PROTECTED_STEP_RATE_DIVISOR: u32 = 10;

// Branch weights ------------------------------------------------------------
/// Chance that a protected step skips the encounter check entirely.
pub const PROTECTED_SKIP_CHANCE: f64 = 0.95;
/// Chance that a protected step performs the check anyway.
pub const PROTECTED_CHECK_CHANCE: f64 = 0.05;
/// Independent chance that entering new cover shields the step from a check.
pub const BUSH_TRANSITION_SHIELD_CHANCE: f64 = 0.40;
/// Complement of [`BUSH_TRANSITION_SHIELD_CHANCE`].
pub const BUSH_TRANSITION_CHECK_CHANCE: f64 = 0.60;
/// Protected check shielded by the bush transition (5% * 40%).
pub const PROTECTED_BUSH_SHIELD_CHANCE: f64 = 0.02;
/// Protected check that survives the bush transition (5% * 60%).
pub const PROTECTED_BUSH_CHECK_CHANCE: f64 = 0.03;

// Termination ---------------------------------------------------------------
/// First-encounter walks stop once this much mass has encountered.
pub const CONVERGENCE_THRESHOLD: f64 = 0.9999;
/// Distribution drift above this is logged as a warning.
pub const DRIFT_WARN_THRESHOLD: f64 = 1e-4;

// Defaults ------------------------------------------------------------------
pub const DEFAULT_BASE_RATE: u32 = 21;
pub const DEFAULT_MAX_TILES: u32 = 200;
pub const DEFAULT_BUSH_ENTRY_TILE: u32 = 1;
