//! Run and sweep identity keys

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one training run.
///
/// All checkpoints sharing a `RunKey` belong to the same run and form an
/// ordered-by-step sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunKey {
    /// Dataset name
    pub dataset: String,
    /// Algorithm name
    pub algorithm: String,
    /// Held-out test environment index
    pub test_env: usize,
    /// Trial (replicate) seed
    pub trial_seed: i64,
    /// Hyperparameter sample seed
    pub hparams_seed: i64,
}

impl RunKey {
    /// The sweep this run contributes to.
    #[must_use]
    pub fn sweep_key(&self) -> SweepKey {
        SweepKey {
            dataset: self.dataset.clone(),
            algorithm: self.algorithm.clone(),
            test_env: self.test_env,
        }
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/env{}/trial{}/hp{}",
            self.dataset, self.algorithm, self.test_env, self.trial_seed, self.hparams_seed
        )
    }
}

/// Identity of a sweep: runs sharing dataset, algorithm and test environment
/// across trial and hyperparameter seeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SweepKey {
    /// Dataset name
    pub dataset: String,
    /// Algorithm name
    pub algorithm: String,
    /// Held-out test environment index
    pub test_env: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_key_drops_seeds() {
        let a = RunKey {
            dataset: "PACS".to_string(),
            algorithm: "ERM".to_string(),
            test_env: 1,
            trial_seed: 0,
            hparams_seed: 3,
        };
        let b = RunKey {
            trial_seed: 2,
            hparams_seed: 0,
            ..a.clone()
        };
        assert_ne!(a, b);
        assert_eq!(a.sweep_key(), b.sweep_key());
        assert_eq!(a.to_string(), "PACS/ERM/env1/trial0/hp3");
    }
}
