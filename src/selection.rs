//! Model selection methods
//!
//! A selection method turns the checkpoints of one run into a single test
//! accuracy by choosing the checkpoint that maximizes some validation signal.
//!
//! | Method        | Validation signal per checkpoint                         |
//! |---------------|----------------------------------------------------------|
//! | `IidAccuracy` | mean `env{i}_in_acc` over training environments          |
//! | `LeaveOneOut` | mean `env{i}_out_acc` over training environments         |
//! | `Oracle`      | `env{test_env}_out_acc` itself (uses test information)    |
//!
//! In every case the reported outcome is the chosen checkpoint's
//! `env{test_env}_out_acc`. Checkpoints are scanned in ascending step order
//! and the earliest maximum wins.

use std::fmt;
use std::str::FromStr;

use crate::experiment::Record;
use crate::query::Q;
use crate::Error;

/// The closed set of model selection methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionMethod {
    /// Training-domain validation: in-split accuracy of the training environments
    IidAccuracy,
    /// Leave-one-domain-out: out-split accuracy of the training environments
    LeaveOneOut,
    /// Test-domain validation: selects on the test accuracy itself (upper bound)
    Oracle,
}

impl SelectionMethod {
    /// All methods, in reporting order.
    pub const ALL: [Self; 3] = [Self::IidAccuracy, Self::LeaveOneOut, Self::Oracle];

    /// Label used in table headers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::IidAccuracy => "training-domain validation set",
            Self::LeaveOneOut => "leave-one-domain-out cross-validation",
            Self::Oracle => "test-domain validation set (oracle)",
        }
    }

    /// Short identifier accepted by `FromStr`.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::IidAccuracy => "iid",
            Self::LeaveOneOut => "loo",
            Self::Oracle => "oracle",
        }
    }

    /// Test accuracy of the checkpoint this method selects from one run.
    ///
    /// `run` holds the checkpoints of a single run. Returns `None` when the run
    /// is empty or no checkpoint carries the fields the method needs.
    #[must_use]
    pub fn sweep_acc(self, run: &Q<Record>) -> Option<f64> {
        let checkpoints = run.sorted_by_key(Record::step);
        checkpoints
            .argmax(|record| self.validation_acc(record))
            .and_then(|record| record.out_acc(record.test_env()))
    }

    /// Validation score of one checkpoint, or `None` if it is not eligible.
    #[must_use]
    pub fn validation_acc(self, record: &Record) -> Option<f64> {
        let test_env = record.test_env();
        let test_acc = record.out_acc(test_env)?;
        match self {
            Self::Oracle => Some(test_acc),
            Self::IidAccuracy => mean_over_train_envs(record, |env| record.in_acc(env)),
            Self::LeaveOneOut => mean_over_train_envs(record, |env| record.out_acc(env)),
        }
    }
}

/// Mean of `acc(env)` over every logged environment except the test one.
/// `None` if there is no such environment or any of them lacks the field.
#[allow(clippy::cast_precision_loss)]
fn mean_over_train_envs(record: &Record, acc: impl Fn(usize) -> Option<f64>) -> Option<f64> {
    let test_env = record.test_env();
    let mut sum = 0.0;
    let mut count = 0_usize;
    for env in record.env_indices().filter(|env| *env != test_env) {
        sum += acc(env)?;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownSelectionMethod(s.to_string()))
    }
}
