//! State merger: collapses equivalent universes into one
//!
//! Without merging, every tile multiplies the population by up to four.
//! Universes with equal keys behave identically from here on, so summing
//! their mass bounds the population by the range of the key fields.
use std::collections::BTreeMap;

use crate::branching::{Successor, Universe};

/// Population produced by one merge pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged<U> {
    /// Live universes ordered by merge key.
    pub population: Vec<U>,
    /// Mass carried by successors that encountered and left the walk.
    pub retired_mass: f64,
}

/// Merge successors of a tile, retiring the ones flagged `just_encountered`.
#[must_use]
pub fn merge_successors<U, I>(successors: I) -> Merged<U>
where
    U: Universe,
    I: IntoIterator<Item = Successor<U>>,
{
    let mut retired_mass = 0.0;
    let live = successors.into_iter().filter_map(|successor| {
        if successor.just_encountered {
            retired_mass += successor.universe.mass();
            None
        } else {
            Some(successor.universe)
        }
    });
    let population = merge_population(live);
    Merged {
        population,
        retired_mass,
    }
}

/// Sum the mass of universes sharing a key and drop empty ones.
#[must_use]
pub fn merge_population<U, I>(universes: I) -> Vec<U>
where
    U: Universe,
    I: IntoIterator<Item = U>,
{
    let mut by_key: BTreeMap<U::Key, U> = BTreeMap::new();
    for universe in universes {
        if universe.mass() <= 0.0 {
            continue;
        }
        by_key
            .entry(universe.key())
            .and_modify(|merged| merged.add_mass(universe.mass()))
            .or_insert(universe);
    }
    by_key.into_values().collect()
}
