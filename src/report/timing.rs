//! Step-time summary
//!
//! Seconds per training step, grouped by (dataset, algorithm) over every
//! checkpoint that measured it. Unlike the accuracy tables this does not
//! depend on a selection method.

use std::collections::BTreeMap;
use std::io::Write;

use super::aggregate::header;
use super::stats::{lenient_row_average, Cell};
use super::table::Table;
use super::OutputFormat;
use crate::experiment::Record;
use crate::query::Q;
use crate::Result;

/// Mean and population standard deviation of step time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTimeStat {
    /// Mean seconds per step
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

/// Step-time statistics keyed by `(dataset, algorithm)`, sorted by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepTimeSummary {
    stats: BTreeMap<(String, String), StepTimeStat>,
}

impl StepTimeSummary {
    /// Summarize every record with a measured `step_time`. Pairs without a
    /// single measurement are left out.
    #[must_use]
    pub fn from_records(records: &Q<Record>) -> Self {
        let grouped =
            records.group_by_key(|r| (r.dataset().to_string(), r.algorithm().to_string()));
        let stats = grouped
            .iter()
            .filter_map(|(key, group)| {
                let times: Q<f64> = group.iter().filter_map(Record::step_time).collect();
                let (Ok(mean), Ok(std)) = (times.mean(), times.std()) else {
                    return None;
                };
                Some((key.clone(), StepTimeStat { mean, std }))
            })
            .collect();
        Self { stats }
    }

    /// Statistic for one `(dataset, algorithm)` pair.
    #[must_use]
    pub fn get(&self, dataset: &str, algorithm: &str) -> Option<StepTimeStat> {
        self.stats
            .get(&(dataset.to_string(), algorithm.to_string()))
            .copied()
    }

    /// Number of `(dataset, algorithm)` pairs with timing data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Check if no record carried a step time.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Iterate in lexicographic `(dataset, algorithm)` order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, StepTimeStat)> {
        self.stats
            .iter()
            .map(|((d, a), s)| (d.as_str(), a.as_str(), *s))
    }

    /// Table with algorithms as rows and datasets as columns. Missing pairs
    /// render as `X` and are left out of the row average.
    #[must_use]
    pub fn table(&self, datasets: &[String], algorithms: &[String], format: OutputFormat) -> Table {
        let cells = algorithms
            .iter()
            .map(|algorithm| {
                let mut row: Vec<Cell> = datasets
                    .iter()
                    .map(|dataset| {
                        self.get(dataset, algorithm).map_or_else(Cell::missing, |s| Cell {
                            value: Some(s.mean),
                            text: format!("{:.3}{}{:.3}", s.mean, format.plus_minus(), s.std),
                        })
                    })
                    .collect();
                row.push(lenient_row_average(&row));
                row
            })
            .collect();

        Table {
            section: "Step Time (seconds)".to_string(),
            title: "Step Time (s)".to_string(),
            row_labels: algorithms.to_vec(),
            col_labels: header(datasets),
            cells,
        }
    }

    /// Write the CSV side file: header plus one row per pair, six decimals,
    /// CRLF line endings.
    ///
    /// # Errors
    ///
    /// Returns `Error::Csv` or `Error::Io` if writing fails.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(out);
        writer.write_record(["Dataset", "Algorithm", "StepTimeMean", "StepTimeStd"])?;
        for (dataset, algorithm, stat) in self.iter() {
            let mean = format!("{:.6}", stat.mean);
            let std = format!("{:.6}", stat.std);
            writer.write_record([dataset, algorithm, mean.as_str(), std.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(dataset: &str, algorithm: &str, step_time: Option<f64>) -> Record {
        let builder = Record::builder(dataset, algorithm, 0);
        match step_time {
            Some(t) => builder.step_time(t).build(),
            None => builder.build(),
        }
    }

    #[test]
    fn test_summary_ignores_unmeasured() {
        let records = Q::new(vec![
            timed("PACS", "ERM", Some(0.1)),
            timed("PACS", "ERM", Some(0.3)),
            timed("PACS", "ERM", None),
            timed("VLCS", "IRM", None),
        ]);
        let summary = StepTimeSummary::from_records(&records);
        assert_eq!(summary.len(), 1);
        let stat = summary.get("PACS", "ERM").unwrap();
        assert!((stat.mean - 0.2).abs() < 1e-12);
        assert!((stat.std - 0.1).abs() < 1e-12);
        assert!(summary.get("VLCS", "IRM").is_none());
    }

    #[test]
    fn test_table_lenient_average() {
        let records = Q::new(vec![
            timed("PACS", "ERM", Some(0.2)),
            timed("VLCS", "ERM", Some(0.4)),
            timed("PACS", "IRM", Some(0.5)),
        ]);
        let summary = StepTimeSummary::from_records(&records);
        let datasets = vec!["OfficeHome".to_string(), "PACS".to_string(), "VLCS".to_string()];
        let algorithms = vec!["ERM".to_string(), "IRM".to_string(), "MMD".to_string()];
        let table = summary.table(&datasets, &algorithms, OutputFormat::Plain);

        assert_eq!(table.cell("ERM", "OfficeHome").unwrap().text, "X");
        assert_eq!(table.cell("ERM", "PACS").unwrap().text, "0.200 +/- 0.000");
        assert_eq!(table.cell("ERM", "Avg").unwrap().text, "0.300");
        assert_eq!(table.cell("IRM", "Avg").unwrap().text, "0.500");
        assert_eq!(table.cell("MMD", "Avg").unwrap().text, "X");
    }

    #[test]
    fn test_csv_sorted_six_decimals() {
        let records = Q::new(vec![
            timed("VLCS", "ERM", Some(0.25)),
            timed("PACS", "IRM", Some(0.5)),
            timed("PACS", "ERM", Some(0.125)),
        ]);
        let mut buf = Vec::new();
        StepTimeSummary::from_records(&records).write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Dataset,Algorithm,StepTimeMean,StepTimeStd\r\n\
             PACS,ERM,0.125000,0.000000\r\n\
             PACS,IRM,0.500000,0.000000\r\n\
             VLCS,ERM,0.250000,0.000000\r\n"
        );
    }

    #[test]
    fn test_csv_quotes_delimiters() {
        let records = Q::new(vec![timed("Toy, v2", "ERM", Some(0.5))]);
        let mut buf = Vec::new();
        StepTimeSummary::from_records(&records).write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("\r\n\"Toy, v2\",ERM,0.500000,0.000000\r\n"));
    }

    #[test]
    fn test_summary_skips_unmeasured_pairs() {
        let records = Q::new(vec![timed("PACS", "ERM", None), timed("PACS", "IRM", Some(0.4))]);
        let summary = StepTimeSummary::from_records(&records);
        assert_eq!(summary.len(), 1);
        assert!(summary.get("PACS", "ERM").is_none());
        assert!(summary.iter().all(|(_, _, s)| s.mean.is_finite() && s.std.is_finite()));
    }
}
