//! Experiment records
//!
//! Typed view of the checkpoints logged by a hyperparameter sweep.
//!
//! ## Schema Overview
//!
//! ```text
//! Sweep (dataset, algorithm, test_env) ──< Run (+ trial_seed, hparams_seed)
//!                                              │
//!                                              └──< Record (one per checkpoint, by step)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use sweep_report::experiment::Record;
//!
//! let checkpoint = Record::builder("PACS", "ERM", 0)
//!     .trial_seed(1)
//!     .step(300)
//!     .in_acc(1, 0.82)
//!     .out_acc(0, 0.79)
//!     .build();
//!
//! assert_eq!(checkpoint.run_key().trial_seed, 1);
//! assert_eq!(checkpoint.out_acc(0), Some(0.79));
//! ```

mod record;
mod run_key;
mod store;

pub use record::{EnvAccuracy, Record, RecordBuilder, RunArgs};
pub use run_key::{RunKey, SweepKey};
pub use store::{read_records, LoadSummary, RecordStore, RESULTS_FILE};
