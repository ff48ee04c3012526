use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

const BID_TARGET: &str = "rikiki_bot::bid";
const PLAY_TARGET: &str = "rikiki_bot::play";
const SEARCH_TARGET: &str = "rikiki_bot::search";
const ROUND_TARGET: &str = "rikiki_bench::round";

/// Keeps the background log writer alive; drop it to flush.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Installs a JSON subscriber writing round and decision events to
/// `telemetry_<run_id>.jsonl` beside the summary.
///
/// `RUST_LOG` takes precedence over the configured directives.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = telemetry_path(outputs, run_id);
    if let Some(dir) = telemetry_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(logging)?,
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // Integration tests may already have installed a global subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
    tracing::info!(
        target: "rikiki_bench::run",
        run_id,
        decision_details = logging.decision_details,
        search_details = logging.search_details,
        "structured logging enabled"
    );

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}

fn telemetry_path(outputs: &ResolvedOutputs, run_id: &str) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(format!("telemetry_{run_id}.jsonl"))
}

/// Global level from the config, with the engine's decision and search
/// targets switched on or off independently of it.
pub(crate) fn build_filter(logging: &LoggingConfig) -> Result<EnvFilter> {
    let level = logging.level().unwrap_or(Level::INFO);
    let decision_level = if logging.decision_details { "info" } else { "off" };
    let search_level = if logging.search_details { "debug" } else { "off" };

    let mut filter = EnvFilter::new(level.as_str());
    for (target, target_level) in [
        (BID_TARGET, decision_level),
        (PLAY_TARGET, decision_level),
        (SEARCH_TARGET, search_level),
        (ROUND_TARGET, "info"),
    ] {
        let directive: Directive = format!("{target}={target_level}")
            .parse()
            .with_context(|| format!("building log directive for {target}"))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}
