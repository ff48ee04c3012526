use std::path::PathBuf;

use clap::Parser;

use rikiki_bench::config::{BenchmarkConfig, ResolvedOutputs};
use rikiki_bench::logging::init_logging;
use rikiki_bench::tournament::TournamentRunner;

/// Tournament benchmarking harness for Rikiki bots.
#[derive(Debug, Parser)]
#[command(
    name = "rikiki-bench",
    author,
    version,
    about = "Deterministic Rikiki tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of matches to play.
    #[arg(long, value_name = "MATCHES")]
    matches: Option<usize>,

    /// Override the RNG seed for match generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the largest hand size in the schedule.
    #[arg(long, value_name = "CARDS")]
    max_hand: Option<usize>,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,

    /// Log backward-induction tie counts regardless of config.
    #[arg(long)]
    log_search_details: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.count = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }

    if let Some(max_hand) = cli.max_hand {
        config.schedule.max_hand = max_hand;
    }

    if cli.log_search_details {
        config.logging.search_details = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let matches = config.matches.count;
    let rounds = config.schedule.build().len();

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agents ({matches} match{}, {rounds} rounds each)",
        if matches == 1 { "" } else { "es" }
    );

    let runner = TournamentRunner::new(config.clone(), outputs.clone())?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} matches, {} rounds -> {} rows at {}",
        summary.matches_played,
        summary.rounds_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
