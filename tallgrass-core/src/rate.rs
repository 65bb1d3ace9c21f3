//! Encounter rate model
use crate::constants::{BUFF_DIVISOR, RATE_DENOMINATOR, RATE_SCALE};

/// Clamped fixed-point encounter numerator out of [`RATE_DENOMINATOR`].
///
/// The buff term uses integer division; truncating it is part of the
/// modelled mechanic and must not be replaced by rounding.
#[must_use]
pub fn encounter_rate_numerator(base_rate: u32, buff: u32) -> u64 {
    let numerator = u64::from(base_rate) * RATE_SCALE + u64::from(buff) * RATE_SCALE / BUFF_DIVISOR;
    numerator.min(RATE_DENOMINATOR)
}

/// Probability of an encounter on a checked roll for the given base rate and buff.
#[must_use]
pub fn encounter_rate(base_rate: u32, buff: u32) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let numerator = encounter_rate_numerator(base_rate, buff) as f64;
    #[allow(clippy::cast_precision_loss)]
    let denominator = RATE_DENOMINATOR as f64;
    numerator / denominator
}
