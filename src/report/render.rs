//! Plain-text and LaTeX rendering

use std::io::Write;

use super::table::Table;
use super::{OutputFormat, Report, ReportConfig};
use crate::{Error, Result};

/// Renders tables and whole reports in one output format.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    format: OutputFormat,
}

impl Renderer {
    /// Create a renderer for `format`.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Renderer matching the format a report is built with.
    #[must_use]
    pub const fn for_config(config: &ReportConfig) -> Self {
        Self::new(config.format())
    }

    /// One table row: every cell left-justified and cut to `colwidth`
    /// characters, joined by two spaces (plain) or `&` (LaTeX).
    #[must_use]
    pub fn format_row(&self, cells: &[String], colwidth: usize) -> String {
        let (sep, end) = match self.format {
            OutputFormat::Plain => ("  ", ""),
            OutputFormat::Latex => (" & ", "\\\\"),
        };
        let row = cells
            .iter()
            .map(|cell| {
                let cut: String = cell.chars().take(colwidth).collect();
                format!("{cut:<colwidth$}")
            })
            .collect::<Vec<_>>()
            .join(sep);
        format!("{row} {end}")
    }

    /// Write one labelled table.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if writing fails.
    pub fn write_table<W: Write>(&self, out: &mut W, table: &Table, colwidth: usize) -> Result<()> {
        writeln!(out)?;

        let col_labels: Vec<String> = match self.format {
            OutputFormat::Plain => {
                writeln!(out, "-------- {}", table.title)?;
                table.col_labels.clone()
            }
            OutputFormat::Latex => {
                writeln!(out, "\\begin{{center}}")?;
                writeln!(out, "\\adjustbox{{max width=\\textwidth}}{{%")?;
                writeln!(out, "\\begin{{tabular}}{{l{}}}", "c".repeat(table.num_cols()))?;
                writeln!(out, "\\toprule")?;
                table
                    .col_labels
                    .iter()
                    .map(|label| format!("\\textbf{{{}}}", label.replace('%', "\\%")))
                    .collect()
            }
        };

        writeln!(out, "{}", self.format_row(&col_labels, colwidth))?;
        if self.format == OutputFormat::Latex {
            writeln!(out, "\\midrule")?;
        }

        for (label, row) in table.row_labels.iter().zip(table.texts()) {
            let cells: Vec<String> = std::iter::once(label.clone()).chain(row).collect();
            writeln!(out, "{}", self.format_row(&cells, colwidth))?;
        }

        if self.format == OutputFormat::Latex {
            writeln!(out, "\\bottomrule")?;
            writeln!(out, "\\end{{tabular}}}}")?;
            writeln!(out, "\\end{{center}}")?;
        }
        Ok(())
    }

    /// Write the full report: preamble, one section per selection method
    /// (dataset tables then averages), the step-time table, and the closing
    /// matter.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if the report's cells were formatted for a
    ///   different output format
    /// - `Error::Io` if writing fails
    pub fn write_report<W: Write>(&self, out: &mut W, report: &Report, config: &ReportConfig) -> Result<()> {
        if report.format != self.format {
            return Err(Error::InvalidInput(format!(
                "report was built for {} output but the renderer writes {}",
                report.format, self.format
            )));
        }
        let latex = self.format == OutputFormat::Latex;

        if latex {
            writeln!(out, "\\documentclass{{article}}")?;
            writeln!(out, "\\usepackage{{booktabs}}")?;
            writeln!(out, "\\usepackage{{adjustbox}}")?;
            writeln!(out, "\\begin{{document}}")?;
            writeln!(out, "\\section{{Full DomainBed results}}")?;
            writeln!(out, "% Total records: {}", report.total_records)?;
        } else {
            writeln!(out, "Total records: {}", report.total_records)?;
        }

        for section in &report.methods {
            if latex {
                writeln!(out)?;
                writeln!(out, "\\subsection{{Model selection: {}}}", section.method.name())?;
            }
            for table in &section.dataset_tables {
                self.write_subsection(out, &table.section)?;
                self.write_table(out, table, config.dataset_colwidth())?;
            }
            self.write_subsection(out, &section.averages.section)?;
            self.write_table(out, &section.averages, config.summary_colwidth())?;
        }

        if let Some(timing) = &report.timing {
            self.write_subsection(out, &timing.section)?;
            self.write_table(out, timing, config.summary_colwidth())?;
        }

        if latex {
            writeln!(out, "\\end{{document}}")?;
        }
        out.flush()?;
        Ok(())
    }

    fn write_subsection<W: Write>(&self, out: &mut W, name: &str) -> Result<()> {
        if self.format == OutputFormat::Latex {
            writeln!(out)?;
            writeln!(out, "\\subsubsection{{{name}}}")?;
        }
        Ok(())
    }
}
