mod reports;
mod route;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tallgrass_core::{encounter_count_odds, first_encounter_odds, sample_route};

use reports::ReportFormat;
use route::{RouteArgs, drop_unused_resets, resolve_route};

#[derive(Debug, Parser)]
#[command(name = "tallgrass", version)]
#[command(about = "Exact wild-encounter odds for walking through tall grass")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console, global = true)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chance of the first encounter landing on each tile
    FirstEncounter(RouteArgs),
    /// Distribution over the number of encounters along the whole route
    EncounterCount(RouteArgs),
    /// Cross-check the exact odds against seeded Monte Carlo walks
    Sample(SampleArgs),
    /// List built-in route presets
    Presets,
}

#[derive(Debug, Clone, Args)]
struct SampleArgs {
    #[command(flatten)]
    route: RouteArgs,

    /// Compare first-encounter odds instead of encounter counts
    #[arg(long)]
    first_encounter: bool,

    /// Number of sampled walks
    #[arg(long, default_value_t = 10_000)]
    trials: u64,

    /// Seed for the sampling RNG
    #[arg(long, default_value_t = 1337)]
    seed: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let start_time = Instant::now();
    let mut rendered = Vec::new();
    render_report(cli, &mut rendered)?;
    write_output(cli.output.as_deref(), &rendered)?;
    info!("finished in {:?}", start_time.elapsed());
    Ok(())
}

/// Run the selected command and render its report into `out`.
fn render_report(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Command::FirstEncounter(args) => {
            let mut route = resolve_route(args)?;
            drop_unused_resets(&mut route);
            let report = first_encounter_odds(&route)?;
            reports::write_first_encounter(out, cli.report, &route, &report)
        }
        Command::EncounterCount(args) => {
            let route = resolve_route(args)?;
            let distribution = encounter_count_odds(&route)?;
            reports::write_encounter_counts(out, cli.report, &route, &distribution)
        }
        Command::Sample(args) => {
            let mut route = resolve_route(&args.route)?;
            if args.first_encounter {
                drop_unused_resets(&mut route);
                let report = first_encounter_odds(&route)?;
                let sampled = sample_route(&route, args.trials, args.seed);
                reports::write_sampled_first_encounter(out, cli.report, &route, &report, &sampled)
            } else {
                let distribution = encounter_count_odds(&route)?;
                let sampled = sample_route(&route, args.trials, args.seed);
                reports::write_sampled_encounter_counts(
                    out,
                    cli.report,
                    &route,
                    &distribution,
                    &sampled,
                )
            }
        }
        Command::Presets => reports::write_presets(out),
    }
}

/// Write a finished report to `path`, or stdout when no path is given.
///
/// The file is only created once the report rendered successfully.
fn write_output(path: Option<&Path>, report: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(report)
                .and_then(|()| writer.flush())
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let mut stdout = stdout().lock();
            stdout.write_all(report)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
