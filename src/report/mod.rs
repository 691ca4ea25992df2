//! Result tables
//!
//! Turns a sweep's records into the tables of a results report:
//!
//! ```text
//! records ──group by run──> sweep_acc per run (SelectionMethod)
//!         ──filter_equals──> per-dataset tables  (mean ± stderr per test env)
//!         ──trial first───> averages table      (mean ± stderr across trial seeds)
//! records ──step_time─────> step-time table + CSV
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sweep_report::experiment::Record;
//! use sweep_report::query::Q;
//! use sweep_report::report::{build_report, ReportConfig};
//!
//! # fn main() -> sweep_report::Result<()> {
//! let records = Q::new(vec![
//!     Record::builder("VLCS", "ERM", 0).in_acc(1, 0.9).out_acc(0, 0.7).build(),
//! ]);
//! let report = build_report(&records, &ReportConfig::default())?;
//! let vlcs = &report.methods[0].dataset_tables[0];
//! assert_eq!(vlcs.cell("ERM", "C").unwrap().text, "70.0 +/- 0.0");
//! assert_eq!(vlcs.cell("ERM", "Avg").unwrap().text, "X");
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod config;
mod render;
mod stats;
mod table;
mod timing;

pub use aggregate::{select_runs, Aggregator, SelectedRun};
pub use config::{OutputFormat, ReportConfig, ReportConfigBuilder};
pub use render::Renderer;
pub use stats::{format_mean, lenient_row_average, strict_row_average, Cell, MeanStderr, MISSING};
pub use table::Table;
pub use timing::{StepTimeStat, StepTimeSummary};

use tracing::info;

use crate::experiment::Record;
use crate::query::Q;
use crate::selection::SelectionMethod;
use crate::Result;

/// Tables for one selection method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReport {
    /// Selection method the outcomes were computed with
    pub method: SelectionMethod,
    /// One table per dataset, in column order
    pub dataset_tables: Vec<Table>,
    /// Per-(algorithm, dataset) averages
    pub averages: Table,
}

/// Every table of a results report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Output format the cells were formatted for
    pub format: OutputFormat,
    /// Number of input records
    pub total_records: usize,
    /// Row order shared by every table
    pub algorithms: Vec<String>,
    /// Datasets reported, in column order
    pub datasets: Vec<String>,
    /// Per-method tables, in configured method order
    pub methods: Vec<MethodReport>,
    /// Step-time statistics
    pub step_times: StepTimeSummary,
    /// Step-time table; `None` when no record measured step time
    pub timing: Option<Table>,
}

/// Build every table for `records` under `config`.
///
/// # Errors
///
/// Propagates query errors; well-formed records never produce one.
pub fn build_report(records: &Q<Record>, config: &ReportConfig) -> Result<Report> {
    let registry = config.registry();
    let algorithms = registry.order_algorithms(&records.map(|r| r.algorithm().to_string()));
    let datasets = registry.order_datasets(&records.map(|r| r.dataset().to_string()));
    let aggregator = Aggregator::new(config);

    let mut methods = Vec::with_capacity(config.methods().len());
    for &method in config.methods() {
        let selected = select_runs(records, method);
        methods.push(MethodReport {
            method,
            dataset_tables: aggregator.dataset_tables(&selected, &datasets, &algorithms, method)?,
            averages: aggregator.averages_table(&selected, &datasets, &algorithms, method)?,
        });
    }

    let step_times = StepTimeSummary::from_records(records);
    let timing = (!step_times.is_empty())
        .then(|| step_times.table(&datasets, &algorithms, config.format()));

    info!(
        records = records.len(),
        algorithms = algorithms.len(),
        datasets = datasets.len(),
        methods = methods.len(),
        "built report"
    );

    Ok(Report {
        format: config.format(),
        total_records: records.len(),
        algorithms,
        datasets,
        methods,
        step_times,
        timing,
    })
}
