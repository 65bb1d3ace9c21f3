use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use tallgrass_core::{
    EncounterDistribution, FirstEncounterReport, PRESETS, RouteConfig, SampleSummary, WalkStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable tables
    Console,
    Json,
    Markdown,
    Csv,
}

#[derive(Serialize)]
struct JsonReport<'a, T: Serialize> {
    route: &'a RouteConfig,
    result: &'a T,
}

#[derive(Serialize)]
struct JsonSampleReport<'a, T: Serialize> {
    route: &'a RouteConfig,
    exact: &'a T,
    sampled: &'a SampleSummary,
}

/// Probabilities below this print in scientific notation.
const SCIENTIFIC_BELOW: f64 = 1e-4;

fn format_probability(p: f64) -> String {
    if p != 0.0 && p.abs() < SCIENTIFIC_BELOW {
        format!("{p:.3e}")
    } else {
        format!("{p:.4}")
    }
}

fn status_label(status: WalkStatus) -> &'static str {
    match status {
        WalkStatus::Running => "running",
        WalkStatus::Converged => "converged",
        WalkStatus::ExhaustedSteps => "reached tile limit",
    }
}

fn write_json<T: Serialize>(out: &mut dyn Write, route: &RouteConfig, result: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &JsonReport { route, result })?;
    writeln!(out)?;
    Ok(())
}

fn write_route_summary(out: &mut dyn Write, route: &RouteConfig) -> Result<()> {
    writeln!(
        out,
        "Encounter rate: {}  Protected steps: {}  Tiles: {}",
        route.base_rate,
        route.protected_step_count(),
        route.max_tiles
    )?;
    writeln!(out, "New bush tiles: {:?}", route.bush_entry_tiles)?;
    if !route.protection_reset_tiles.is_empty() {
        writeln!(
            out,
            "Protection reset tiles: {:?}",
            route.protection_reset_tiles
        )?;
    }
    Ok(())
}

fn write_console_sample_heading(out: &mut dyn Write, sampled: &SampleSummary) -> Result<()> {
    let heading = format!(
        "🎲 Sampled vs exact ({} walks, seed {})",
        sampled.trials, sampled.seed
    );
    writeln!(out, "{}", heading.bright_cyan().bold())?;
    Ok(())
}

fn write_markdown_sample_summary(
    out: &mut dyn Write,
    route: &RouteConfig,
    sampled: &SampleSummary,
) -> Result<()> {
    writeln!(
        out,
        "- **Encounter rate**: {}\n- **Tiles**: {}\n- **Walks**: {}\n- **Seed**: {}\n",
        route.base_rate, route.max_tiles, sampled.trials, sampled.seed
    )?;
    Ok(())
}

pub fn write_first_encounter(
    out: &mut dyn Write,
    format: ReportFormat,
    route: &RouteConfig,
    report: &FirstEncounterReport,
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, route, report)?,
        ReportFormat::Csv => {
            writeln!(out, "tile,exact_chance,cumulative_chance")?;
            for row in &report.tiles {
                writeln!(
                    out,
                    "{},{},{}",
                    row.tile, row.exact_chance, row.cumulative_chance
                )?;
            }
        }
        ReportFormat::Markdown => {
            writeln!(out, "# First Encounter Odds\n")?;
            writeln!(
                out,
                "- **Encounter rate**: {}\n- **Protected steps**: {}\n- **Status**: {}\n",
                route.base_rate,
                report.protected_step_count,
                status_label(report.status)
            )?;
            writeln!(out, "| Tile | Exact | Cumulative |")?;
            writeln!(out, "|---:|---:|---:|")?;
            for row in &report.tiles {
                writeln!(
                    out,
                    "| {} | {:.4} | {:.4} |",
                    row.tile, row.exact_chance, row.cumulative_chance
                )?;
            }
        }
        ReportFormat::Console => {
            writeln!(out, "{}", "🌿 First Encounter Odds".bright_green().bold())?;
            writeln!(out, "{}", "=======================".green())?;
            write_route_summary(out, route)?;
            writeln!(out)?;
            for row in &report.tiles {
                writeln!(
                    out,
                    "Tile: {} Exact Chance: {:.4} Cumulative Chance: {:.4}",
                    row.tile, row.exact_chance, row.cumulative_chance
                )?;
            }
            writeln!(out)?;
            writeln!(out, "Status: {}", status_label(report.status))?;
            for threshold in [0.5, 0.9, 0.99] {
                if let Some(tile) = report.tile_reaching(threshold) {
                    writeln!(out, "{:.0}% by tile {tile}", threshold * 100.0)?;
                }
            }
            if let Some(mean) = report.expected_tile() {
                writeln!(out, "Expected first encounter tile: {mean:.2}")?;
            }
        }
    }
    Ok(())
}

pub fn write_encounter_counts(
    out: &mut dyn Write,
    format: ReportFormat,
    route: &RouteConfig,
    distribution: &EncounterDistribution,
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, route, distribution)?,
        ReportFormat::Csv => {
            writeln!(out, "encounter_count,probability")?;
            for (count, p) in &distribution.by_count {
                writeln!(out, "{count},{p}")?;
            }
        }
        ReportFormat::Markdown => {
            writeln!(out, "# Encounter Count Odds\n")?;
            writeln!(
                out,
                "- **Encounter rate**: {}\n- **Tiles**: {}\n- **Mean encounters**: {:.3}\n",
                route.base_rate,
                route.max_tiles,
                distribution.mean()
            )?;
            writeln!(out, "| Encounters | Probability |")?;
            writeln!(out, "|---:|---:|")?;
            for (count, p) in &distribution.by_count {
                writeln!(out, "| {count} | {} |", format_probability(*p))?;
            }
            writeln!(
                out,
                "\n_Sanity check: cumulative probability = {}_",
                distribution.total_mass
            )?;
        }
        ReportFormat::Console => {
            writeln!(out, "{}", "🌿 Encounter Count Odds".bright_green().bold())?;
            writeln!(out, "{}", "=======================".green())?;
            write_route_summary(out, route)?;
            writeln!(out)?;
            for (count, p) in &distribution.by_count {
                writeln!(out, "{count} - {}", format_probability(*p))?;
            }
            writeln!(out)?;
            writeln!(out, "Mean encounters: {:.3}", distribution.mean())?;
            writeln!(
                out,
                "Sanity check. Cumulative probability = {}",
                distribution.total_mass
            )?;
        }
    }
    Ok(())
}

/// Side-by-side exact and sampled first-encounter odds.
pub fn write_sampled_first_encounter(
    out: &mut dyn Write,
    format: ReportFormat,
    route: &RouteConfig,
    report: &FirstEncounterReport,
    sampled: &SampleSummary,
) -> Result<()> {
    match format {
        ReportFormat::Json => {
            let json = JsonSampleReport {
                route,
                exact: report,
                sampled,
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => {
            writeln!(
                out,
                "tile,exact_chance,sampled_chance,exact_cumulative,sampled_cumulative"
            )?;
            for row in &report.tiles {
                writeln!(
                    out,
                    "{},{},{},{},{}",
                    row.tile,
                    row.exact_chance,
                    sampled.first_encounter_chance(row.tile),
                    row.cumulative_chance,
                    sampled.cumulative_chance(row.tile)
                )?;
            }
        }
        ReportFormat::Markdown => {
            writeln!(out, "# Sampled vs Exact First Encounter Odds\n")?;
            write_markdown_sample_summary(out, route, sampled)?;
            writeln!(out, "| Tile | Exact | Sampled | Delta |")?;
            writeln!(out, "|---:|---:|---:|---:|")?;
            for row in &report.tiles {
                let observed = sampled.cumulative_chance(row.tile);
                writeln!(
                    out,
                    "| {} | {:.4} | {:.4} | {:+.4} |",
                    row.tile,
                    row.cumulative_chance,
                    observed,
                    observed - row.cumulative_chance
                )?;
            }
        }
        ReportFormat::Console => {
            write_console_sample_heading(out, sampled)?;
            for row in &report.tiles {
                let observed = sampled.cumulative_chance(row.tile);
                writeln!(
                    out,
                    "Tile: {} Exact Cumulative: {:.4} Sampled Cumulative: {:.4} Delta: {:+.4}",
                    row.tile,
                    row.cumulative_chance,
                    observed,
                    observed - row.cumulative_chance
                )?;
            }
        }
    }
    Ok(())
}

/// Side-by-side exact and sampled encounter-count odds.
pub fn write_sampled_encounter_counts(
    out: &mut dyn Write,
    format: ReportFormat,
    route: &RouteConfig,
    distribution: &EncounterDistribution,
    sampled: &SampleSummary,
) -> Result<()> {
    match format {
        ReportFormat::Json => {
            let json = JsonSampleReport {
                route,
                exact: distribution,
                sampled,
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => {
            writeln!(out, "encounter_count,exact,sampled")?;
            for (count, p) in &distribution.by_count {
                writeln!(out, "{count},{p},{}", sampled.count_chance(*count))?;
            }
        }
        ReportFormat::Markdown => {
            writeln!(out, "# Sampled vs Exact Encounter Count Odds\n")?;
            write_markdown_sample_summary(out, route, sampled)?;
            writeln!(out, "| Encounters | Exact | Sampled | Delta |")?;
            writeln!(out, "|---:|---:|---:|---:|")?;
            for (count, p) in &distribution.by_count {
                let observed = sampled.count_chance(*count);
                writeln!(
                    out,
                    "| {count} | {} | {} | {:+.4} |",
                    format_probability(*p),
                    format_probability(observed),
                    observed - p
                )?;
            }
        }
        ReportFormat::Console => {
            write_console_sample_heading(out, sampled)?;
            for (count, p) in &distribution.by_count {
                let observed = sampled.count_chance(*count);
                writeln!(
                    out,
                    "{count} - exact {} sampled {} delta {:+.4}",
                    format_probability(*p),
                    format_probability(observed),
                    observed - p
                )?;
            }
        }
    }
    Ok(())
}

pub fn write_presets(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Available presets:")?;
    for preset in PRESETS {
        writeln!(out, "  {:25} - {}", preset.key, preset.description)?;
    }
    Ok(())
}
