//! Results collection for a sweep output directory
//!
//! Loads every run under the directory, builds the report and writes it to
//! the given sink and next to the inputs, together with the step-time CSV.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::experiment::RecordStore;
use crate::report::{build_report, Renderer, ReportConfig};
use crate::Result;

/// File name of the step-time side file.
pub const STEP_TIME_FILE: &str = "step_time_stats.csv";

/// Files written by [`collect_results`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFiles {
    /// `results.txt` or `results.tex`
    pub report: PathBuf,
    /// `step_time_stats.csv`
    pub step_times: PathBuf,
}

/// Summarize the sweep in `input_dir`.
///
/// The rendered report goes to `out` and to `input_dir/results.{txt,tex}`;
/// step-time statistics go to `input_dir/step_time_stats.csv`.
///
/// # Errors
///
/// Returns `Error::Io` if the directory cannot be read or an output file
/// cannot be written, and propagates report and CSV errors.
pub fn collect_results<W: Write>(
    input_dir: &Path,
    config: &ReportConfig,
    out: &mut W,
) -> Result<CollectedFiles> {
    let store = RecordStore::load_dir(input_dir)?;
    let report = build_report(store.records(), config)?;

    let mut rendered = Vec::new();
    Renderer::for_config(config).write_report(&mut rendered, &report, config)?;
    out.write_all(&rendered)?;
    out.flush()?;

    let report_path = input_dir.join(config.format().results_file());
    fs::write(&report_path, &rendered)?;

    let step_times_path = input_dir.join(STEP_TIME_FILE);
    report
        .step_times
        .write_csv(BufWriter::new(File::create(&step_times_path)?))?;

    info!(
        report = %report_path.display(),
        step_times = %step_times_path.display(),
        "wrote results"
    );

    Ok(CollectedFiles {
        report: report_path,
        step_times: step_times_path,
    })
}
