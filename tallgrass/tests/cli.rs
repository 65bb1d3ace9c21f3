use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "tallgrass-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_lists_presets() {
    let exe = env!("CARGO_BIN_EXE_tallgrass");
    let output = Command::new(exe)
        .arg("presets")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available presets"));
    assert!(stdout.contains("route-one"));
}

#[test]
fn cli_first_encounter_matches_reference_first_tile() {
    let exe = env!("CARGO_BIN_EXE_tallgrass");
    let output = Command::new(exe)
        .args(["first-encounter", "-e", "21", "--new-bush-tiles", "1"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Tile: 1 Exact Chance: 0.0063 Cumulative Chance: 0.0063"));
    assert!(stdout.contains("Tile: 42 "));
    assert!(!stdout.contains("Tile: 43 "));
}

#[test]
fn cli_encounter_count_writes_json_file() {
    let exe = env!("CARGO_BIN_EXE_tallgrass");
    let output_path = temp_path("count");
    let status = Command::new(exe)
        .args([
            "encounter-count",
            "--preset",
            "route-one-two-pass",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(value["route"]["max_tiles"], 42);
    let total = value["result"]["total_mass"].as_f64().expect("total mass");
    assert!((total - 1.0).abs() < 1e-9);
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_rejects_zero_encounter_rate() {
    let exe = env!("CARGO_BIN_EXE_tallgrass");
    let output = Command::new(exe)
        .args(["encounter-count", "--encounter-rate", "0"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("base encounter rate"));
}

#[test]
fn cli_loads_route_config_file() {
    let exe = env!("CARGO_BIN_EXE_tallgrass");
    let route_path = temp_path("route.json");
    std::fs::write(
        &route_path,
        r#"{"encounter_rate": 21, "new_bush_tiles": [1], "step_count": 10}"#,
    )
    .expect("write route");
    let output = Command::new(exe)
        .args(["encounter-count", "--report", "csv", "--config"])
        .arg(&route_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("encounter_count,probability"));
    assert!(lines.next().is_some_and(|line| line.starts_with("0,0.3641")));
    let _ = std::fs::remove_file(route_path);
}

#[test]
fn cli_rejected_route_leaves_no_output_file() {
    let exe = env!("CARGO_BIN_EXE_tallgrass");
    let output_path = temp_path("rejected.json");
    let status = Command::new(exe)
        .args(["encounter-count", "-e", "0", "--report", "json", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(!status.success());
    assert!(!output_path.exists());
}
