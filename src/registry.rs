//! Dataset and algorithm registry
//!
//! The registry decides which datasets get a table, how their environment
//! columns are labelled, and the canonical order of algorithm rows. It is
//! plain configuration passed into the report layer; the built-in
//! `Registry::domainbed()` can be replaced by a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::query::Q;
use crate::Result;

/// A dataset and the names of its environments, by environment index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Dataset name as logged in `args.dataset`
    pub name: String,
    /// Environment names; `environments[i]` labels test environment `i`
    pub environments: Vec<String>,
}

impl DatasetInfo {
    /// Create a dataset entry.
    #[must_use]
    pub fn new<S: Into<String>>(name: impl Into<String>, environments: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            environments: environments.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of environments (and therefore of test environments).
    #[must_use]
    pub fn num_environments(&self) -> usize {
        self.environments.len()
    }
}

/// Known datasets and the canonical algorithm order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Canonical algorithm order for table rows
    pub algorithms: Vec<String>,
    /// Datasets that get a results table
    pub datasets: Vec<DatasetInfo>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::domainbed()
    }
}

impl Registry {
    /// Built-in registry of domain-generalization benchmarks and algorithms.
    #[must_use]
    pub fn domainbed() -> Self {
        let algorithms = [
            "ERM", "ERMPlusPlus", "Fish", "IRM", "GroupDRO", "Mixup", "MLDG", "CORAL", "MMD",
            "DANN", "CDANN", "MTL", "SagNet", "ARM", "VREx", "RSC", "SD", "ANDMask", "SANDMask",
            "IGA", "SelfReg", "Fishr", "TRM", "IB_ERM", "IB_IRM", "CAD", "CondCAD", "Transfer",
            "CausIRL_CORAL", "CausIRL_MMD", "EQRM", "RDM", "ADRMX", "URM",
        ];

        let datasets = vec![
            DatasetInfo::new("Debug28", ["0", "1", "2"]),
            DatasetInfo::new("Debug224", ["0", "1", "2"]),
            DatasetInfo::new("ColoredMNIST", ["+90%", "+80%", "-90%"]),
            DatasetInfo::new("RotatedMNIST", ["0", "15", "30", "45", "60", "75"]),
            DatasetInfo::new("VLCS", ["C", "L", "S", "V"]),
            DatasetInfo::new("PACS", ["A", "C", "P", "S"]),
            DatasetInfo::new("OfficeHome", ["A", "C", "P", "R"]),
            DatasetInfo::new("TerraIncognita", ["L100", "L38", "L43", "L46"]),
            DatasetInfo::new("DomainNet", ["clip", "info", "paint", "quick", "real", "sketch"]),
            DatasetInfo::new(
                "SVIRO",
                ["aclass", "escape", "hilux", "i3", "lexus", "tesla", "tiguan", "tucson", "x5", "zoe"],
            ),
            DatasetInfo::new(
                "WILDSCamelyon",
                ["hospital_0", "hospital_1", "hospital_2", "hospital_3", "hospital_4"],
            ),
            DatasetInfo::new(
                "WILDSFMoW",
                ["region_0", "region_1", "region_2", "region_3", "region_4", "region_5"],
            ),
        ];

        Self {
            algorithms: algorithms.iter().map(ToString::to_string).collect(),
            datasets,
        }
    }

    /// Load a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Json` if it
    /// does not describe a registry.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Look up a dataset by name.
    #[must_use]
    pub fn dataset(&self, name: &str) -> Option<&DatasetInfo> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Row order: canonical algorithms (registry order) present in
    /// `encountered`, then unknown names in encountered order.
    #[must_use]
    pub fn order_algorithms(&self, encountered: &Q<String>) -> Vec<String> {
        let encountered = encountered.unique();
        let known = self
            .algorithms
            .iter()
            .filter(|name| encountered.iter().any(|e| e == *name))
            .cloned();
        let unknown = encountered
            .iter()
            .filter(|name| !self.algorithms.contains(*name))
            .cloned();
        known.chain(unknown).collect()
    }

    /// Column order: encountered datasets known to the registry, sorted
    /// lexicographically. Unknown datasets are dropped.
    #[must_use]
    pub fn order_datasets(&self, encountered: &Q<String>) -> Vec<String> {
        encountered
            .unique()
            .sorted()
            .filter(|name| self.dataset(name).is_some())
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Q<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_canonical_algorithms_first() {
        let registry = Registry::domainbed();
        let order = registry.order_algorithms(&names(&["Zeta", "ERM", "Alpha", "ERM"]));
        assert_eq!(order, vec!["ERM", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_canonical_order_follows_registry() {
        let registry = Registry::domainbed();
        let order = registry.order_algorithms(&names(&["CORAL", "IRM", "ERM"]));
        assert_eq!(order, vec!["ERM", "IRM", "CORAL"]);
    }

    #[test]
    fn test_datasets_sorted_and_restricted() {
        let registry = Registry::domainbed();
        let order = registry.order_datasets(&names(&["VLCS", "MyToyData", "PACS", "OfficeHome", "PACS"]));
        assert_eq!(order, vec!["OfficeHome", "PACS", "VLCS"]);
    }

    #[test]
    fn test_environment_names() {
        let registry = Registry::domainbed();
        let pacs = registry.dataset("PACS").unwrap();
        assert_eq!(pacs.num_environments(), 4);
        assert_eq!(pacs.environments[3], "S");
        assert!(registry.dataset("Nope").is_none());
    }

    #[test]
    fn test_registry_json_roundtrip() {
        let registry = Registry {
            algorithms: vec!["ERM".to_string()],
            datasets: vec![DatasetInfo::new("Toy", ["a", "b"])],
        };
        let json = serde_json::to_string(&registry).unwrap();
        let back: Registry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }
}
