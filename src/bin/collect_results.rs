//! Collect sweep results into tables.
//!
//! Writes the report to stdout and to `results.txt` (or `results.tex` with
//! `--latex`) inside the input directory, plus `step_time_stats.csv`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sweep_report::collect::collect_results;
use sweep_report::report::{OutputFormat, ReportConfig};
use sweep_report::{Registry, SelectionMethod};

#[derive(Parser, Debug)]
#[command(
    name = "collect-results",
    version,
    about = "Summarize a hyperparameter sweep into results tables"
)]
struct Cli {
    /// Sweep output directory containing one subdirectory per run
    #[arg(long)]
    input_dir: PathBuf,

    /// Emit a LaTeX document instead of plain text
    #[arg(long, default_value_t = false)]
    latex: bool,

    /// JSON registry of datasets and algorithms replacing the built-in one
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Selection methods to report (iid, loo, oracle); all by default
    #[arg(long = "method")]
    methods: Vec<SelectionMethod>,
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let registry = match &cli.registry {
        Some(path) => Registry::from_json_file(path)
            .with_context(|| format!("failed to load registry: {}", path.display()))?,
        None => Registry::domainbed(),
    };
    let format = if cli.latex {
        OutputFormat::Latex
    } else {
        OutputFormat::Plain
    };
    let config = ReportConfig::builder()
        .registry(registry)
        .format(format)
        .methods(cli.methods)
        .build();

    collect_results(&cli.input_dir, &config, &mut std::io::stdout().lock())
        .with_context(|| format!("failed to collect results: {}", cli.input_dir.display()))?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
