//! Record - one logged checkpoint of one run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{RunKey, SweepKey};
use crate::query::{Field, Lookup};
use crate::{Error, Result};

/// Run arguments: the fixed identity fields plus free-form hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    dataset: String,
    algorithm: String,
    test_env: usize,
    trial_seed: i64,
    hparams_seed: i64,
    hparams: BTreeMap<String, Field>,
}

impl RunArgs {
    /// Dataset name.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Algorithm name.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Held-out test environment index.
    #[must_use]
    pub const fn test_env(&self) -> usize {
        self.test_env
    }

    /// Trial seed.
    #[must_use]
    pub const fn trial_seed(&self) -> i64 {
        self.trial_seed
    }

    /// Hyperparameter seed.
    #[must_use]
    pub const fn hparams_seed(&self) -> i64 {
        self.hparams_seed
    }

    /// Any other argument (`lr`, `batch_size`, nested `hparams`, ...).
    #[must_use]
    pub fn hparam(&self, name: &str) -> Option<&Field> {
        self.hparams.get(name)
    }

    fn to_field(&self) -> Field {
        let mut map = self.hparams.clone();
        map.insert("dataset".to_string(), Field::from(self.dataset.as_str()));
        map.insert("algorithm".to_string(), Field::from(self.algorithm.as_str()));
        map.insert("test_env".to_string(), Field::from(self.test_env));
        map.insert(
            "test_envs".to_string(),
            Field::List(vec![Field::from(self.test_env)]),
        );
        map.insert("trial_seed".to_string(), Field::Int(self.trial_seed));
        map.insert("hparams_seed".to_string(), Field::Int(self.hparams_seed));
        Field::Map(map)
    }
}

/// In-split and out-split accuracy of one environment at one checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvAccuracy {
    /// `env{i}_in_acc`: accuracy on the training split of environment `i`
    pub in_acc: Option<f64>,
    /// `env{i}_out_acc`: accuracy on the held-out split of environment `i`
    pub out_acc: Option<f64>,
}

/// One logged checkpoint of one run.
///
/// Fixed fields are strongly typed; per-environment accuracies are parsed
/// from the `env{i}_in_acc` / `env{i}_out_acc` naming convention; everything
/// else stays reachable through dotted-path lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord", into = "RawRecord")]
pub struct Record {
    args: RunArgs,
    step: u64,
    step_time: Option<f64>,
    envs: BTreeMap<usize, EnvAccuracy>,
    extra: BTreeMap<String, Field>,
}

impl Record {
    /// Create a builder for a checkpoint of the given run.
    #[must_use]
    pub fn builder(
        dataset: impl Into<String>,
        algorithm: impl Into<String>,
        test_env: usize,
    ) -> RecordBuilder {
        RecordBuilder::new(dataset, algorithm, test_env)
    }

    /// Parse a record from one decoded JSON line.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` if required fields are missing or have
    /// the wrong type.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let raw: RawRecord =
            serde_json::from_value(value).map_err(|e| Error::InvalidRecord(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Run arguments.
    #[must_use]
    pub const fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Dataset name.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.args.dataset
    }

    /// Algorithm name.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.args.algorithm
    }

    /// Held-out test environment index.
    #[must_use]
    pub const fn test_env(&self) -> usize {
        self.args.test_env
    }

    /// Training step of this checkpoint.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Seconds per training step, if measured.
    #[must_use]
    pub const fn step_time(&self) -> Option<f64> {
        self.step_time
    }

    /// `env{env}_in_acc`, if logged.
    #[must_use]
    pub fn in_acc(&self, env: usize) -> Option<f64> {
        self.envs.get(&env).and_then(|e| e.in_acc)
    }

    /// `env{env}_out_acc`, if logged.
    #[must_use]
    pub fn out_acc(&self, env: usize) -> Option<f64> {
        self.envs.get(&env).and_then(|e| e.out_acc)
    }

    /// Indices of all environments with at least one accuracy field, ascending.
    pub fn env_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.envs.keys().copied()
    }

    /// Any other top-level field (`loss`, `epoch`, `mem_gb`, ...).
    #[must_use]
    pub fn extra(&self, name: &str) -> Option<&Field> {
        self.extra.get(name)
    }

    /// Identity of the run this checkpoint belongs to.
    #[must_use]
    pub fn run_key(&self) -> RunKey {
        RunKey {
            dataset: self.args.dataset.clone(),
            algorithm: self.args.algorithm.clone(),
            test_env: self.args.test_env,
            trial_seed: self.args.trial_seed,
            hparams_seed: self.args.hparams_seed,
        }
    }

    /// Identity of the sweep this checkpoint belongs to.
    #[must_use]
    pub fn sweep_key(&self) -> SweepKey {
        SweepKey {
            dataset: self.args.dataset.clone(),
            algorithm: self.args.algorithm.clone(),
            test_env: self.args.test_env,
        }
    }
}

impl Lookup for Record {
    fn lookup(&self, path: &str) -> Option<Field> {
        let (head, rest) = path
            .split_once('.')
            .map_or((path, None), |(h, r)| (h, Some(r)));

        let root = match head {
            "args" => self.args.to_field(),
            "step" => Field::from(self.step),
            "step_time" => Field::from(self.step_time),
            _ => match parse_env_field(head) {
                Some((env, EnvSplit::In)) => Field::from(self.in_acc(env)?),
                Some((env, EnvSplit::Out)) => Field::from(self.out_acc(env)?),
                None => self.extra.get(head)?.clone(),
            },
        };

        match rest {
            Some(rest) => root.lookup(rest),
            None => Some(root),
        }
    }
}

/// Builder for `Record`.
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Create a new builder with the run's identity fields; seeds and step
    /// default to zero.
    #[must_use]
    pub fn new(dataset: impl Into<String>, algorithm: impl Into<String>, test_env: usize) -> Self {
        Self {
            record: Record {
                args: RunArgs {
                    dataset: dataset.into(),
                    algorithm: algorithm.into(),
                    test_env,
                    trial_seed: 0,
                    hparams_seed: 0,
                    hparams: BTreeMap::new(),
                },
                step: 0,
                step_time: None,
                envs: BTreeMap::new(),
                extra: BTreeMap::new(),
            },
        }
    }

    /// Set the trial seed.
    #[must_use]
    pub const fn trial_seed(mut self, seed: i64) -> Self {
        self.record.args.trial_seed = seed;
        self
    }

    /// Set the hyperparameter seed.
    #[must_use]
    pub const fn hparams_seed(mut self, seed: i64) -> Self {
        self.record.args.hparams_seed = seed;
        self
    }

    /// Set the training step.
    #[must_use]
    pub const fn step(mut self, step: u64) -> Self {
        self.record.step = step;
        self
    }

    /// Set the measured seconds per step.
    #[must_use]
    pub const fn step_time(mut self, seconds: f64) -> Self {
        self.record.step_time = Some(seconds);
        self
    }

    /// Set `env{env}_in_acc`.
    #[must_use]
    pub fn in_acc(mut self, env: usize, acc: f64) -> Self {
        self.record.envs.entry(env).or_default().in_acc = Some(acc);
        self
    }

    /// Set `env{env}_out_acc`.
    #[must_use]
    pub fn out_acc(mut self, env: usize, acc: f64) -> Self {
        self.record.envs.entry(env).or_default().out_acc = Some(acc);
        self
    }

    /// Set a free-form run argument.
    #[must_use]
    pub fn hparam(mut self, name: impl Into<String>, value: impl Into<Field>) -> Self {
        self.record.args.hparams.insert(name.into(), value.into());
        self
    }

    /// Set an extra top-level field.
    #[must_use]
    pub fn extra(mut self, name: impl Into<String>, value: impl Into<Field>) -> Self {
        self.record.extra.insert(name.into(), value.into());
        self
    }

    /// Build the `Record`.
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvSplit {
    In,
    Out,
}

/// Parse `env{i}_in_acc` / `env{i}_out_acc`.
fn parse_env_field(name: &str) -> Option<(usize, EnvSplit)> {
    let rest = name.strip_prefix("env")?;
    let (index, suffix) = rest.split_once('_')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let split = match suffix {
        "in_acc" => EnvSplit::In,
        "out_acc" => EnvSplit::Out,
        _ => return None,
    };
    Some((index.parse().ok()?, split))
}

#[derive(Debug, Serialize, Deserialize)]
struct RawArgs {
    dataset: String,
    algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    test_env: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    test_envs: Option<Vec<usize>>,
    trial_seed: i64,
    hparams_seed: i64,
    #[serde(flatten)]
    hparams: BTreeMap<String, Field>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawRecord {
    args: RawArgs,
    step: u64,
    #[serde(default)]
    step_time: Option<f64>,
    #[serde(flatten)]
    rest: BTreeMap<String, Field>,
}

impl TryFrom<RawRecord> for Record {
    type Error = Error;

    fn try_from(raw: RawRecord) -> Result<Self> {
        let test_env = raw
            .args
            .test_env
            .or_else(|| raw.args.test_envs.as_ref().and_then(|envs| envs.first().copied()))
            .ok_or_else(|| {
                Error::InvalidRecord("args has neither test_env nor a non-empty test_envs".to_string())
            })?;

        if let Some(t) = raw.step_time {
            if !t.is_finite() || t < 0.0 {
                return Err(Error::InvalidRecord(format!(
                    "step_time must be a nonnegative number, got {t}"
                )));
            }
        }

        let mut envs: BTreeMap<usize, EnvAccuracy> = BTreeMap::new();
        let mut extra = BTreeMap::new();
        for (name, value) in raw.rest {
            let Some((env, split)) = parse_env_field(&name) else {
                extra.insert(name, value);
                continue;
            };
            if value.is_null() {
                continue;
            }
            let acc = value.as_f64().ok_or_else(|| {
                Error::InvalidRecord(format!("{name} must be numeric, got {}", value.kind()))
            })?;
            let slot = envs.entry(env).or_default();
            match split {
                EnvSplit::In => slot.in_acc = Some(acc),
                EnvSplit::Out => slot.out_acc = Some(acc),
            }
        }

        Ok(Self {
            args: RunArgs {
                dataset: raw.args.dataset,
                algorithm: raw.args.algorithm,
                test_env,
                trial_seed: raw.args.trial_seed,
                hparams_seed: raw.args.hparams_seed,
                hparams: raw.args.hparams,
            },
            step: raw.step,
            step_time: raw.step_time,
            envs,
            extra,
        })
    }
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        let mut rest = record.extra;
        for (env, acc) in record.envs {
            if let Some(v) = acc.in_acc {
                rest.insert(format!("env{env}_in_acc"), Field::Float(v));
            }
            if let Some(v) = acc.out_acc {
                rest.insert(format!("env{env}_out_acc"), Field::Float(v));
            }
        }
        Self {
            args: RawArgs {
                dataset: record.args.dataset,
                algorithm: record.args.algorithm,
                test_env: None,
                test_envs: Some(vec![record.args.test_env]),
                trial_seed: record.args.trial_seed,
                hparams_seed: record.args.hparams_seed,
                hparams: record.args.hparams,
            },
            step: record.step,
            step_time: record.step_time,
            rest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn logged_line() -> serde_json::Value {
        json!({
            "args": {
                "dataset": "PACS",
                "algorithm": "ERM",
                "test_envs": [2],
                "trial_seed": 1,
                "hparams_seed": 4,
                "hparams": {"lr": 5e-5, "batch_size": 32}
            },
            "step": 300,
            "step_time": 0.21,
            "loss": 0.42,
            "env0_in_acc": 0.91,
            "env0_out_acc": 0.88,
            "env2_in_acc": 0.71,
            "env2_out_acc": 0.69
        })
    }

    #[test]
    fn test_from_json_typed_fields() {
        let record = Record::from_json(logged_line()).unwrap();
        assert_eq!(record.dataset(), "PACS");
        assert_eq!(record.algorithm(), "ERM");
        assert_eq!(record.test_env(), 2);
        assert_eq!(record.args().trial_seed(), 1);
        assert_eq!(record.args().hparams_seed(), 4);
        assert_eq!(record.step(), 300);
        assert_eq!(record.step_time(), Some(0.21));
        assert_eq!(record.in_acc(0), Some(0.91));
        assert_eq!(record.out_acc(2), Some(0.69));
        assert_eq!(record.out_acc(1), None);
        assert_eq!(record.env_indices().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(record.extra("loss"), Some(&Field::Float(0.42)));
    }

    #[test]
    fn test_dotted_lookup() {
        let record = Record::from_json(logged_line()).unwrap();
        assert_eq!(record.lookup("args.algorithm"), Some(Field::from("ERM")));
        assert_eq!(record.lookup("args.test_env"), Some(Field::Int(2)));
        assert_eq!(record.lookup("args.hparams.batch_size"), Some(Field::Int(32)));
        assert_eq!(record.lookup("env0_in_acc"), Some(Field::Float(0.91)));
        assert_eq!(record.lookup("env1_in_acc"), None);
        assert_eq!(record.lookup("step"), Some(Field::Int(300)));
        assert_eq!(record.lookup("nope"), None);
    }

    #[test]
    fn test_scalar_test_env_accepted() {
        let mut line = logged_line();
        line["args"]["test_envs"] = serde_json::Value::Null;
        line["args"]["test_env"] = json!(0);
        let record = Record::from_json(line).unwrap();
        assert_eq!(record.test_env(), 0);
    }

    #[test]
    fn test_missing_args_field_rejected() {
        let mut line = logged_line();
        line["args"].as_object_mut().unwrap().remove("algorithm");
        assert!(matches!(Record::from_json(line), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_negative_step_time_rejected() {
        let mut line = logged_line();
        line["step_time"] = json!(-1.0);
        assert!(matches!(Record::from_json(line), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_null_step_time_is_unmeasured() {
        let mut line = logged_line();
        line["step_time"] = serde_json::Value::Null;
        let record = Record::from_json(line).unwrap();
        assert_eq!(record.step_time(), None);
    }

    #[test]
    fn test_parse_env_field() {
        assert_eq!(parse_env_field("env12_out_acc"), Some((12, EnvSplit::Out)));
        assert_eq!(parse_env_field("env0_in_acc"), Some((0, EnvSplit::In)));
        assert_eq!(parse_env_field("env_in_acc"), None);
        assert_eq!(parse_env_field("env0_in_f1"), None);
        assert_eq!(parse_env_field("envx_in_acc"), None);
    }

    #[test]
    fn test_builder() {
        let record = Record::builder("VLCS", "CORAL", 3)
            .trial_seed(2)
            .hparams_seed(7)
            .step(100)
            .in_acc(0, 0.5)
            .out_acc(3, 0.4)
            .hparam("lr", 1e-3)
            .build();
        let key = record.run_key();
        assert_eq!(key.trial_seed, 2);
        assert_eq!(key.hparams_seed, 7);
        assert_eq!(record.lookup("args.lr"), Some(Field::Float(1e-3)));
        assert_eq!(record.sweep_key(), key.sweep_key());
    }
}
