//! # sweep-report: Results Collection for Hyperparameter Sweeps
//!
//! sweep-report reads the checkpoints logged by many independent training
//! runs, picks one test accuracy per run with a model selection method, and
//! summarizes the outcomes as mean ± standard error tables.
//!
//! ## Pipeline
//!
//! - **Query**: `Q<T>`, an immutable sequence with dotted-path projection,
//!   filtering, grouping, deduplication and reductions
//! - **Selection**: `SelectionMethod` (training-domain validation,
//!   leave-one-domain-out, oracle) turns a run into one scalar
//! - **Report**: per-dataset, averages and step-time tables, rendered as plain
//!   text or LaTeX
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sweep_report::experiment::RecordStore;
//! use sweep_report::report::{build_report, Renderer, ReportConfig};
//!
//! let store = RecordStore::load_dir("sweeps/pacs")?;
//! let config = ReportConfig::default();
//! let report = build_report(store.records(), &config)?;
//!
//! let mut stdout = std::io::stdout();
//! Renderer::for_config(&config).write_report(&mut stdout, &report, &config)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod collect;
pub mod error;
pub mod experiment;
pub mod query;
pub mod registry;
pub mod report;
pub mod selection;

pub use collect::collect_results;
pub use error::{Error, Result};
pub use experiment::{Record, RecordStore};
pub use query::{Field, Q};
pub use registry::Registry;
pub use selection::SelectionMethod;
