//! Dotted-path resolution

use super::Field;

/// Values that can be projected by a dotted key path such as `"args.algorithm"`.
pub trait Lookup {
    /// Resolve `path` to a field value, or `None` if any segment is absent.
    fn lookup(&self, path: &str) -> Option<Field>;
}

impl Lookup for Field {
    fn lookup(&self, path: &str) -> Option<Field> {
        path.split('.')
            .try_fold(self, |node, segment| node.child(segment))
            .cloned()
    }
}

impl Lookup for serde_json::Value {
    fn lookup(&self, path: &str) -> Option<Field> {
        path.split('.')
            .try_fold(self, |node, segment| match node {
                Self::Object(map) => map.get(segment),
                Self::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
            .map(Field::from_json)
    }
}

impl<T: Lookup + ?Sized> Lookup for &T {
    fn lookup(&self, path: &str) -> Option<Field> {
        (**self).lookup(path)
    }
}

/// Split a comma-separated path list (`"dataset, algorithm, test_env"`).
///
/// Whitespace around each path is ignored and empty entries are dropped.
#[must_use]
pub fn split_paths(paths: &str) -> Vec<&str> {
    paths
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paths() {
        assert_eq!(
            split_paths("dataset, algorithm ,test_env"),
            vec!["dataset", "algorithm", "test_env"]
        );
        assert_eq!(split_paths("trial_seed"), vec!["trial_seed"]);
        assert!(split_paths(" , ").is_empty());
    }

    #[test]
    fn test_json_lookup() {
        let value = serde_json::json!({"args": {"algorithm": "ERM", "test_envs": [2]}});
        assert_eq!(value.lookup("args.algorithm"), Some(Field::from("ERM")));
        assert_eq!(value.lookup("args.test_envs.0"), Some(Field::Int(2)));
        assert_eq!(value.lookup("args.missing"), None);
        assert_eq!(value.lookup("args.algorithm.deeper"), None);
    }
}
