//! Cell statistics and formatting

use super::OutputFormat;
use crate::query::Q;

/// Marker for a cell whose statistic cannot be computed.
pub const MISSING: &str = "X";

/// One table cell: the numeric value behind it (if any) and its text.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Mean shown in the cell; `None` renders as `MISSING`
    pub value: Option<f64>,
    /// Formatted text
    pub text: String,
}

impl Cell {
    /// A missing-data cell.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            value: None,
            text: MISSING.to_string(),
        }
    }

    /// Check if the cell holds the missing-data marker.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// Mean and standard error of a set of outcomes, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanStderr {
    /// `100 * mean(values)`
    pub mean: f64,
    /// `100 * std(values) / sqrt(n)`, population std
    pub stderr: f64,
}

impl MeanStderr {
    /// Compute from accuracies in `[0, 1]`; `None` for an empty set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(values: &Q<f64>) -> Option<Self> {
        let mean = values.mean().ok()?;
        let std = values.std().ok()?;
        Some(Self {
            mean: 100.0 * mean,
            stderr: 100.0 * std / (values.len() as f64).sqrt(),
        })
    }
}

/// Format a set of outcomes as `"mean +/- stderr"` (one decimal, percent),
/// or the missing marker when there are none.
#[must_use]
pub fn format_mean(values: &Q<f64>, format: OutputFormat) -> Cell {
    MeanStderr::of(values).map_or_else(Cell::missing, |s| Cell {
        value: Some(s.mean),
        text: format!("{:.1}{}{:.1}", s.mean, format.plus_minus(), s.stderr),
    })
}

/// Trailing "Avg" cell of a per-environment or per-dataset row: the mean of
/// the row's cell means with one decimal; missing if any cell is missing.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn strict_row_average(cells: &[Cell]) -> Cell {
    let means: Option<Vec<f64>> = cells.iter().map(|c| c.value).collect();
    match means {
        Some(means) if !means.is_empty() => {
            let avg = means.iter().sum::<f64>() / means.len() as f64;
            Cell {
                value: Some(avg),
                text: format!("{avg:.1}"),
            }
        }
        _ => Cell::missing(),
    }
}

/// Trailing "Avg" cell of a timing row: the mean of the populated cells with
/// three decimals; missing only if no cell is populated.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn lenient_row_average(cells: &[Cell]) -> Cell {
    let means: Vec<f64> = cells.iter().filter_map(|c| c.value).collect();
    if means.is_empty() {
        return Cell::missing();
    }
    let avg = means.iter().sum::<f64>() / means.len() as f64;
    Cell {
        value: Some(avg),
        text: format!("{avg:.3}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mean_plain_and_latex() {
        let values = Q::new(vec![0.8, 0.9]);
        let plain = format_mean(&values, OutputFormat::Plain);
        assert_eq!(plain.text, "85.0 +/- 3.5");
        let latex = format_mean(&values, OutputFormat::Latex);
        assert_eq!(latex.text, "85.0 $\\pm$ 3.5");
        assert!((plain.value.unwrap() - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_mean_empty_is_missing() {
        let cell = format_mean(&Q::default(), OutputFormat::Plain);
        assert_eq!(cell.text, MISSING);
        assert!(cell.is_missing());
    }

    #[test]
    fn test_strict_average_propagates_missing() {
        let full = [
            format_mean(&Q::new(vec![0.5]), OutputFormat::Plain),
            format_mean(&Q::new(vec![0.7]), OutputFormat::Plain),
        ];
        assert_eq!(strict_row_average(&full).text, "60.0");

        let partial = [full[0].clone(), Cell::missing()];
        assert_eq!(strict_row_average(&partial).text, MISSING);
        assert_eq!(strict_row_average(&[]).text, MISSING);
    }

    #[test]
    fn test_lenient_average_skips_missing() {
        let cells = [
            Cell {
                value: Some(0.1),
                text: "0.100 +/- 0.000".to_string(),
            },
            Cell::missing(),
            Cell {
                value: Some(0.2),
                text: "0.200 +/- 0.000".to_string(),
            },
        ];
        assert_eq!(lenient_row_average(&cells).text, "0.150");
        assert_eq!(lenient_row_average(&[Cell::missing()]).text, MISSING);
    }
}
