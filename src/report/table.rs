//! Labelled result tables

use super::stats::Cell;

/// A rectangular table of cells with row and column labels.
///
/// `col_labels` covers the label column too: `["Algorithm", data columns...,
/// "Avg"]`, so it is one longer than each row of `cells`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Section name (dataset name, `"Averages"`, ...)
    pub section: String,
    /// Header line shown above the table in plain output
    pub title: String,
    /// Row labels (algorithm names)
    pub row_labels: Vec<String>,
    /// Column labels, starting with the row-label column
    pub col_labels: Vec<String>,
    /// Cells, row-major
    pub cells: Vec<Vec<Cell>>,
}

impl Table {
    /// Numeric matrix; `None` where the cell is missing.
    #[must_use]
    pub fn values(&self) -> Vec<Vec<Option<f64>>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.value).collect())
            .collect()
    }

    /// Formatted cell strings.
    #[must_use]
    pub fn texts(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.text.clone()).collect())
            .collect()
    }

    /// Cell at (`row_label`, `col_label`), if both exist.
    #[must_use]
    pub fn cell(&self, row_label: &str, col_label: &str) -> Option<&Cell> {
        let row = self.row_labels.iter().position(|l| l == row_label)?;
        let col = self
            .col_labels
            .iter()
            .skip(1)
            .position(|l| l == col_label)?;
        self.cells.get(row)?.get(col)
    }

    /// Number of data columns (excluding the row-label column).
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.col_labels.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_lookup_skips_label_column() {
        let table = Table {
            section: "Toy".to_string(),
            title: "Dataset: Toy".to_string(),
            row_labels: vec!["ERM".to_string()],
            col_labels: vec!["Algorithm".to_string(), "a".to_string(), "Avg".to_string()],
            cells: vec![vec![
                Cell {
                    value: Some(50.0),
                    text: "50.0 +/- 0.0".to_string(),
                },
                Cell::missing(),
            ]],
        };
        assert_eq!(table.num_cols(), 2);
        assert_eq!(table.cell("ERM", "a").map(|c| c.text.as_str()), Some("50.0 +/- 0.0"));
        assert!(table.cell("ERM", "Avg").unwrap().is_missing());
        assert!(table.cell("ERM", "Algorithm").is_none());
        assert_eq!(table.values(), vec![vec![Some(50.0), None]]);
    }
}
