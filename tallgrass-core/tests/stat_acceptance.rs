use tallgrass_core::{
    RouteConfig, encounter_count_odds, find_preset, first_encounter_odds, sample_route,
};

const SAMPLE_SIZE: u64 = 20_000;
const TOLERANCE: f64 = 0.02;

#[test]
fn sampled_first_encounters_track_exact_odds() {
    let cfg = find_preset("route-one").expect("preset").config();
    let report = first_encounter_odds(&cfg).expect("valid route");
    let summary = sample_route(&cfg, SAMPLE_SIZE, 0xACED);

    for row in report.tiles.iter().take(20) {
        let observed = summary.cumulative_chance(row.tile);
        assert!(
            (observed - row.cumulative_chance).abs() <= TOLERANCE,
            "tile {} cumulative drifted: observed {observed:.4}, exact {:.4}",
            row.tile,
            row.cumulative_chance
        );
    }
}

#[test]
fn sampled_encounter_counts_track_exact_distribution() {
    let cfg = find_preset("route-one-two-pass").expect("preset").config();
    let dist = encounter_count_odds(&cfg).expect("valid route");
    let summary = sample_route(&cfg, SAMPLE_SIZE, 0x5EED);

    for count in 0..=6 {
        let observed = summary.count_chance(count);
        let exact = dist.probability(count);
        assert!(
            (observed - exact).abs() <= TOLERANCE,
            "count {count} drifted: observed {observed:.4}, exact {exact:.4}"
        );
    }
}

#[test]
fn sampled_high_rate_route_tracks_exact_distribution() {
    let cfg = RouteConfig::new(45, 30).with_bush_entry_tiles([1, 3, 8, 15]);
    let dist = encounter_count_odds(&cfg).expect("valid route");
    let summary = sample_route(&cfg, SAMPLE_SIZE, 99);

    let observed_mean: f64 = summary
        .encounter_counts
        .iter()
        .map(|(&count, &n)| {
            #[allow(clippy::cast_precision_loss)]
            let share = n as f64 / SAMPLE_SIZE as f64;
            f64::from(count) * share
        })
        .sum();
    assert!(
        (observed_mean - dist.mean()).abs() <= 0.1,
        "mean drifted: observed {observed_mean:.3}, exact {:.3}",
        dist.mean()
    );
}

#[test]
fn sampled_first_encounters_ignore_reset_tiles_like_exact_odds() {
    let cfg = RouteConfig::new(21, 30)
        .with_bush_entry_tiles([1])
        .with_protection_reset_tiles([5]);
    let report = first_encounter_odds(&cfg).expect("valid route");
    let summary = sample_route(&cfg, SAMPLE_SIZE, 0xBEEF);

    for row in &report.tiles {
        let observed = summary.cumulative_chance(row.tile);
        assert!(
            (observed - row.cumulative_chance).abs() <= TOLERANCE,
            "tile {} cumulative drifted: observed {observed:.4}, exact {:.4}",
            row.tile,
            row.cumulative_chance
        );
    }

    let dist = encounter_count_odds(&cfg).expect("valid route");
    for count in 0..=4 {
        let observed = summary.count_chance(count);
        let exact = dist.probability(count);
        assert!(
            (observed - exact).abs() <= TOLERANCE,
            "count {count} drifted: observed {observed:.4}, exact {exact:.4}"
        );
    }
}
