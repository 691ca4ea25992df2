//! Two-level aggregation of selected run outcomes
//!
//! 1. Per-dataset tables: one cell per (algorithm, test environment) with
//!    the mean and standard error over every run of that sweep.
//! 2. Averages table: one cell per (algorithm, dataset). Outcomes are first
//!    averaged within each trial seed across test environments, then the
//!    mean and standard error are taken across trial seeds, so the error bar
//!    reflects seed-level noise and datasets with many environments are not
//!    overweighted.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use super::stats::{format_mean, strict_row_average};
use super::table::Table;
use super::ReportConfig;
use crate::experiment::{Record, RunKey};
use crate::query::{Field, Lookup, Q};
use crate::selection::SelectionMethod;
use crate::Result;

/// Outcome of one run under one selection method.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRun {
    /// Run identity
    pub key: RunKey,
    /// Test accuracy picked by the selection method
    pub sweep_acc: f64,
}

impl Lookup for SelectedRun {
    fn lookup(&self, path: &str) -> Option<Field> {
        Some(match path {
            "dataset" => Field::from(self.key.dataset.as_str()),
            "algorithm" => Field::from(self.key.algorithm.as_str()),
            "test_env" => Field::from(self.key.test_env),
            "trial_seed" => Field::Int(self.key.trial_seed),
            "hparams_seed" => Field::Int(self.key.hparams_seed),
            "sweep_acc" => Field::Float(self.sweep_acc),
            _ => return None,
        })
    }
}

/// Group records into runs and keep the runs with a defined outcome.
#[must_use]
pub fn select_runs(records: &Q<Record>, method: SelectionMethod) -> Q<SelectedRun> {
    let runs = records.group_by_key(Record::run_key);
    let selected: Q<SelectedRun> = runs
        .map(|key, run| {
            method.sweep_acc(run).map(|sweep_acc| SelectedRun {
                key: key.clone(),
                sweep_acc,
            })
        })
        .iter()
        .flatten()
        .cloned()
        .collect();
    debug!(
        method = method.slug(),
        runs = runs.len(),
        selected = selected.len(),
        "selected run outcomes"
    );
    selected
}

/// Builds result tables from selected outcomes.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    config: &'a ReportConfig,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator over the given configuration.
    #[must_use]
    pub const fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Per-dataset table: rows are algorithms, columns are test environments
    /// (labelled by the registry) plus "Avg".
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the dataset is not in the registry.
    pub fn dataset_table(
        &self,
        selected: &Q<SelectedRun>,
        dataset: &str,
        algorithms: &[String],
        method: SelectionMethod,
    ) -> Result<Table> {
        let info = self.config.registry().dataset(dataset).ok_or_else(|| {
            crate::Error::InvalidInput(format!("dataset '{dataset}' is not in the registry"))
        })?;
        let format = self.config.format();

        let mut cells = Vec::with_capacity(algorithms.len());
        for algorithm in algorithms {
            let mut row = Vec::with_capacity(info.num_environments() + 1);
            for test_env in 0..info.num_environments() {
                let trial_accs = selected
                    .filter_equals(
                        "dataset, algorithm, test_env",
                        &[Field::from(dataset), Field::from(algorithm.as_str()), Field::from(test_env)],
                    )?
                    .select("sweep_acc")?
                    .numbers()?;
                row.push(format_mean(&trial_accs, format));
            }
            row.push(strict_row_average(&row));
            cells.push(row);
        }

        debug!(dataset, method = method.slug(), rows = cells.len(), "built dataset table");

        Ok(Table {
            section: dataset.to_string(),
            title: format!("Dataset: {dataset}, model selection method: {}", method.name()),
            row_labels: algorithms.to_vec(),
            col_labels: header(&info.environments),
            cells,
        })
    }

    /// One scalar per trial seed: the mean outcome of that seed across all
    /// test environments of `(dataset, algorithm)`. Seeds in first-occurrence
    /// order.
    ///
    /// # Errors
    ///
    /// Propagates query errors; never fails on well-formed `SelectedRun`s.
    pub fn trial_averages(
        selected: &Q<SelectedRun>,
        dataset: &str,
        algorithm: &str,
    ) -> Result<Q<f64>> {
        selected
            .filter_equals("algorithm, dataset", &[Field::from(algorithm), Field::from(dataset)])?
            .group("trial_seed")?
            .iter()
            .map(|(_, trial)| trial.select("sweep_acc")?.numbers()?.mean())
            .collect::<Result<Vec<_>>>()
            .map(Q::new)
    }

    /// Averages table: rows are algorithms, columns are datasets plus "Avg".
    ///
    /// # Errors
    ///
    /// Propagates query errors; never fails on well-formed `SelectedRun`s.
    pub fn averages_table(
        &self,
        selected: &Q<SelectedRun>,
        datasets: &[String],
        algorithms: &[String],
        method: SelectionMethod,
    ) -> Result<Table> {
        let format = self.config.format();

        let mut cells = Vec::with_capacity(algorithms.len());
        for algorithm in algorithms {
            let mut row = Vec::with_capacity(datasets.len() + 1);
            for dataset in datasets {
                let trial_averages = Self::trial_averages(selected, dataset, algorithm)?;
                row.push(format_mean(&trial_averages, format));
            }
            row.push(strict_row_average(&row));
            cells.push(row);
        }

        Ok(Table {
            section: "Averages".to_string(),
            title: format!("Averages, model selection method: {}", method.name()),
            row_labels: algorithms.to_vec(),
            col_labels: header(datasets),
            cells,
        })
    }

    /// Every per-dataset table for one method, in dataset order.
    ///
    /// With the `parallel` feature the tables are built concurrently over the
    /// shared read-only outcomes.
    ///
    /// # Errors
    ///
    /// Returns the first error of any table.
    pub fn dataset_tables(
        &self,
        selected: &Q<SelectedRun>,
        datasets: &[String],
        algorithms: &[String],
        method: SelectionMethod,
    ) -> Result<Vec<Table>> {
        #[cfg(feature = "parallel")]
        let tables = datasets
            .par_iter()
            .map(|dataset| self.dataset_table(selected, dataset, algorithms, method))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let tables = datasets
            .iter()
            .map(|dataset| self.dataset_table(selected, dataset, algorithms, method))
            .collect();

        tables
    }
}

/// Column labels `["Algorithm", columns..., "Avg"]`.
pub(crate) fn header(columns: &[String]) -> Vec<String> {
    std::iter::once("Algorithm".to_string())
        .chain(columns.iter().cloned())
        .chain(std::iter::once("Avg".to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DatasetInfo, Registry};

    fn outcome(dataset: &str, algorithm: &str, test_env: usize, trial_seed: i64, acc: f64) -> SelectedRun {
        SelectedRun {
            key: RunKey {
                dataset: dataset.to_string(),
                algorithm: algorithm.to_string(),
                test_env,
                trial_seed,
                hparams_seed: 0,
            },
            sweep_acc: acc,
        }
    }

    fn toy_config() -> ReportConfig {
        ReportConfig::builder()
            .registry(Registry {
                algorithms: vec!["ERM".to_string()],
                datasets: vec![DatasetInfo::new("Toy", ["a", "b"])],
            })
            .build()
    }

    #[test]
    fn test_selected_run_lookup() {
        let run = outcome("Toy", "ERM", 1, 2, 0.5);
        assert_eq!(run.lookup("test_env"), Some(Field::Int(1)));
        assert_eq!(run.lookup("sweep_acc"), Some(Field::Float(0.5)));
        assert_eq!(run.lookup("args.dataset"), None);
    }

    #[test]
    fn test_dataset_table_cells() {
        let config = toy_config();
        let selected = Q::new(vec![
            outcome("Toy", "ERM", 0, 0, 0.8),
            outcome("Toy", "ERM", 0, 1, 0.9),
            outcome("Toy", "ERM", 1, 0, 0.6),
        ]);
        let table = Aggregator::new(&config)
            .dataset_table(&selected, "Toy", &["ERM".to_string()], SelectionMethod::Oracle)
            .unwrap();
        assert_eq!(table.col_labels, vec!["Algorithm", "a", "b", "Avg"]);
        assert_eq!(table.cell("ERM", "a").unwrap().text, "85.0 +/- 3.5");
        assert_eq!(table.cell("ERM", "b").unwrap().text, "60.0 +/- 0.0");
        assert_eq!(table.cell("ERM", "Avg").unwrap().text, "72.5");
    }

    #[test]
    fn test_missing_environment_invalidates_average() {
        let config = toy_config();
        let selected = Q::new(vec![outcome("Toy", "ERM", 0, 0, 0.8)]);
        let table = Aggregator::new(&config)
            .dataset_table(&selected, "Toy", &["ERM".to_string()], SelectionMethod::Oracle)
            .unwrap();
        assert_eq!(table.cell("ERM", "b").unwrap().text, "X");
        assert_eq!(table.cell("ERM", "Avg").unwrap().text, "X");
    }

    #[test]
    fn test_unknown_dataset_rejected() {
        let config = toy_config();
        let err = Aggregator::new(&config)
            .dataset_table(&Q::default(), "Nope", &[], SelectionMethod::Oracle)
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidInput(_)));
    }

    #[test]
    fn test_trial_averages_first_occurrence_order() {
        let selected = Q::new(vec![
            outcome("Toy", "ERM", 0, 5, 0.2),
            outcome("Toy", "ERM", 0, 1, 0.6),
            outcome("Toy", "ERM", 1, 5, 0.4),
            outcome("Toy", "ERM", 1, 1, 0.8),
            outcome("Toy", "IRM", 1, 1, 0.1),
        ]);
        let averages = Aggregator::trial_averages(&selected, "Toy", "ERM").unwrap();
        let values = averages.to_vec();
        assert_eq!(values.len(), 2);
        assert!((values[0] - 0.3).abs() < 1e-12);
        assert!((values[1] - 0.7).abs() < 1e-12);
    }
}
