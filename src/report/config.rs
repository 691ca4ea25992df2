//! Report configuration

use std::fmt;

use crate::registry::Registry;
use crate::selection::SelectionMethod;

/// Output flavour of formatted cells and rendered tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Fixed-width plain text
    #[default]
    Plain,
    /// LaTeX `tabular` with booktabs rules
    Latex,
}

impl OutputFormat {
    /// Separator between a mean and its error.
    #[must_use]
    pub const fn plus_minus(self) -> &'static str {
        match self {
            Self::Plain => " +/- ",
            Self::Latex => " $\\pm$ ",
        }
    }

    /// Name of the report file written next to the inputs.
    #[must_use]
    pub const fn results_file(self) -> &'static str {
        match self {
            Self::Plain => "results.txt",
            Self::Latex => "results.tex",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Latex => write!(f, "latex"),
        }
    }
}

/// Everything the aggregator and renderer need besides the records.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    registry: Registry,
    format: OutputFormat,
    methods: Vec<SelectionMethod>,
    dataset_colwidth: usize,
    summary_colwidth: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ReportConfig {
    /// Create a builder with the built-in registry, plain output and all
    /// selection methods.
    #[must_use]
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Dataset/algorithm registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Selection methods to report, in order.
    #[must_use]
    pub fn methods(&self) -> &[SelectionMethod] {
        &self.methods
    }

    /// Column width of per-dataset tables.
    #[must_use]
    pub const fn dataset_colwidth(&self) -> usize {
        self.dataset_colwidth
    }

    /// Column width of the averages and step-time tables.
    #[must_use]
    pub const fn summary_colwidth(&self) -> usize {
        self.summary_colwidth
    }
}

/// Builder for `ReportConfig`.
#[derive(Debug)]
pub struct ReportConfigBuilder {
    registry: Registry,
    format: OutputFormat,
    methods: Vec<SelectionMethod>,
    dataset_colwidth: usize,
    summary_colwidth: usize,
}

impl Default for ReportConfigBuilder {
    fn default() -> Self {
        Self {
            registry: Registry::domainbed(),
            format: OutputFormat::Plain,
            methods: SelectionMethod::ALL.to_vec(),
            dataset_colwidth: 20,
            summary_colwidth: 25,
        }
    }
}

impl ReportConfigBuilder {
    /// Replace the registry.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the output format.
    #[must_use]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Restrict reporting to these selection methods; an empty list keeps
    /// all of them.
    #[must_use]
    pub fn methods(mut self, methods: Vec<SelectionMethod>) -> Self {
        if !methods.is_empty() {
            self.methods = methods;
        }
        self
    }

    /// Set the per-dataset column width.
    #[must_use]
    pub const fn dataset_colwidth(mut self, width: usize) -> Self {
        self.dataset_colwidth = width;
        self
    }

    /// Set the averages/step-time column width.
    #[must_use]
    pub const fn summary_colwidth(mut self, width: usize) -> Self {
        self.summary_colwidth = width;
        self
    }

    /// Build the `ReportConfig`.
    #[must_use]
    pub fn build(self) -> ReportConfig {
        ReportConfig {
            registry: self.registry,
            format: self.format,
            methods: self.methods,
            dataset_colwidth: self.dataset_colwidth,
            summary_colwidth: self.summary_colwidth,
        }
    }
}
