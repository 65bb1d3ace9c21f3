use tallgrass_core::{
    EncounterCountUniverse, EncounterCountWalk, FirstEncounterWalk, RouteConfig, encounter_rate,
    merge_population,
};

fn sample_routes() -> Vec<RouteConfig> {
    let mut routes = Vec::new();
    for base_rate in [1, 5, 10, 21, 35, 50, 79, 100, 180] {
        routes.push(RouteConfig::new(base_rate, 120));
        routes.push(RouteConfig::new(base_rate, 120).with_bush_entry_tiles([1, 6, 9, 13, 17]));
        routes.push(
            RouteConfig::new(base_rate, 120)
                .with_bush_entry_tiles([1, 4, 22, 30])
                .with_protection_reset_tiles([22, 60]),
        );
    }
    routes
}

#[test]
fn first_encounter_mass_is_conserved_every_tile() {
    for cfg in sample_routes() {
        let mut walk = FirstEncounterWalk::new(&cfg);
        while let Some(row) = walk.next() {
            let drift = (walk.walk().live_mass() + row.cumulative_chance - 1.0).abs();
            assert!(
                drift <= 1e-6 * f64::from(row.tile),
                "rate {} tile {} drift {drift}",
                cfg.base_rate,
                row.tile
            );
            assert!(row.exact_chance >= 0.0);
        }
    }
}

#[test]
fn count_mass_is_conserved_every_tile() {
    for cfg in sample_routes() {
        let mut walk = EncounterCountWalk::new(&cfg);
        while let Some(step) = walk.step() {
            let drift = walk.walk().mass_drift();
            assert!(
                drift <= 1e-6 * f64::from(step.tile),
                "rate {} tile {} drift {drift}",
                cfg.base_rate,
                step.tile
            );
        }
    }
}

#[test]
fn count_distribution_sums_to_one_for_long_routes() {
    for tiles in [1, 10, 50, 120, 200] {
        let cfg = RouteConfig::new(21, tiles).with_bush_entry_tiles([1, 6, 9, 13, 17]);
        let dist = EncounterCountWalk::new(&cfg).run();
        let sum: f64 = dist.by_count.values().sum();
        assert!((sum - 1.0).abs() <= 1e-4, "{tiles} tiles sum to {sum}");
        assert!(dist.drift() <= 1e-4);
    }
}

#[test]
fn zero_encounter_mass_never_grows_with_route_length() {
    let mut previous = 1.0;
    for tiles in 0..=60 {
        let cfg = RouteConfig::new(21, tiles)
            .with_bush_entry_tiles([1, 6, 9, 13, 17, 22, 27])
            .with_protection_reset_tiles([22]);
        let zero = EncounterCountWalk::new(&cfg).run().probability(0);
        assert!(
            zero <= previous + 1e-15,
            "P(0) rose from {previous} to {zero} at {tiles} tiles"
        );
        previous = zero;
    }
}

#[test]
fn protected_window_lasts_exactly_the_protected_steps() {
    // with no bushes the protected regime hits 5% of the raw rate
    let cfg = RouteConfig::new(21, 7);
    let rows: Vec<_> = FirstEncounterWalk::new(&cfg).collect();
    let first = rows[0].exact_chance;
    assert!((first - 0.05 * encounter_rate(21, 0)).abs() < 1e-12);
    for row in &rows[..6] {
        assert!(row.exact_chance < 0.02, "tile {} not protected", row.tile);
    }
    assert!(rows[6].exact_chance > 0.15, "tile 7 still protected");
}

#[test]
fn merging_a_finished_population_changes_nothing() {
    let cfg = RouteConfig::new(21, 80).with_bush_entry_tiles([1, 6, 9]);
    let mut walk = EncounterCountWalk::new(&cfg);
    while walk.step().is_some() {}
    let population: Vec<EncounterCountUniverse> = walk.walk().population().to_vec();
    assert_eq!(merge_population(population.clone()), population);
}
