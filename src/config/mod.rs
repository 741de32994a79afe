//! Configuration cascade.
//!
//! Every run resolves its configuration the same way: built-in defaults,
//! then environment roots, then the config file, then trailing `--key value`
//! overrides from the command line. Later layers win key by key, and the
//! whole resolution is a pure function of those inputs, so re-invoking with
//! the same arguments always lands on the same settings.

mod env;
mod file;
mod overrides;

pub(crate) use env::EnvOverlay;
pub use overrides::{parse_tail, TailOpts};

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ConfigError;

/// Known keys and their built-in defaults, in presentation order.
///
/// An empty `tool_root` means tools resolve on `PATH`; an empty `be_name`
/// derives the backend name from the backend dimensions. An empty wrapper
/// command spawns tools directly.
const KEYS: &[(&str, &str)] = &[
    ("exp_root", "exp"),
    ("data_root", "data"),
    ("corpus_root", "corpus"),
    ("tool_root", ""),
    ("feat_name", "fbank80"),
    ("feat_config", "conf/fbank80.yaml"),
    ("nj", "16"),
    ("nnet_name", "xvec_resnet34.v1"),
    ("num_epochs", "70"),
    ("batch_size", "128"),
    ("use_gpu", "false"),
    ("chunk_length", "12800"),
    ("lda_dim", "200"),
    ("plda_type", "splda"),
    ("plda_y_dim", "150"),
    ("plda_z_dim", "200"),
    ("be_name", ""),
    ("train_data", "train"),
    ("enroll_data", "enroll"),
    ("test_data", "test"),
    ("trials", "trials"),
    ("snorm", "false"),
    ("coh_data", "cohort"),
    ("coh_nbest", "400"),
    ("coh_nbest_discard", "0"),
    ("cpu_cmd", "run.pl"),
    ("cuda_cmd", "run.pl --gpu 1"),
];

fn is_known_key(key: &str) -> bool {
    KEYS.iter().any(|(name, _)| *name == key)
}

/// Accumulated `key=value` bindings, one layer applied after another.
///
/// Known keys live in `values` and end up in [`RunConfig`]. A config file may
/// also bind scratch names that only exist for `${name}` interpolation in
/// later lines; those are dropped once resolution finishes. CLI overrides
/// never create scratch names, so a mistyped `--key` fails loudly.
#[derive(Debug)]
pub(crate) struct Bindings {
    values: BTreeMap<String, String>,
    scratch: BTreeMap<String, String>,
}

impl Bindings {
    fn defaults() -> Self {
        let values = KEYS
            .iter()
            .map(|(name, default)| ((*name).to_string(), (*default).to_string()))
            .collect();
        Bindings {
            values,
            scratch: BTreeMap::new(),
        }
    }

    /// Look a name up for interpolation. Known keys shadow scratch names.
    pub(crate) fn lookup(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .or_else(|| self.scratch.get(name))
            .map(String::as_str)
    }

    fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Bind from a config file: unknown names become scratch bindings.
    pub(crate) fn bind(&mut self, key: &str, value: String) {
        if is_known_key(key) {
            self.values.insert(key.to_string(), value);
        } else {
            self.scratch.insert(key.to_string(), value);
        }
    }

    /// Bind from the command line: unknown names are an error.
    pub(crate) fn bind_known(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if !is_known_key(key) {
            return Err(ConfigError::UnknownKey {
                key: key.to_string(),
            });
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// PLDA flavor trained by the backend stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PldaType {
    Frplda,
    Splda,
    Plda,
}

impl fmt::Display for PldaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PldaType::Frplda => "frplda",
            PldaType::Splda => "splda",
            PldaType::Plda => "plda",
        };
        f.write_str(label)
    }
}

fn parse_plda_type(key: &str, value: &str) -> Result<PldaType, ConfigError> {
    match value {
        "frplda" => Ok(PldaType::Frplda),
        "splda" => Ok(PldaType::Splda),
        "plda" => Ok(PldaType::Plda),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "one of frplda, splda, plda",
        }),
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: "an unsigned integer",
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub exp_root: PathBuf,
    pub data_root: PathBuf,
    pub corpus_root: PathBuf,
    pub tool_root: Option<PathBuf>,
    pub feat_name: String,
    pub feat_config: PathBuf,
    pub nj: u32,
    pub nnet_name: String,
    pub num_epochs: u32,
    pub batch_size: u32,
    pub use_gpu: bool,
    pub chunk_length: u32,
    pub lda_dim: u32,
    pub plda_type: PldaType,
    pub plda_y_dim: u32,
    pub plda_z_dim: u32,
    pub be_name: String,
    pub train_data: String,
    pub enroll_data: String,
    pub test_data: String,
    pub trials: String,
    pub snorm: bool,
    pub coh_data: String,
    pub coh_nbest: u32,
    pub coh_nbest_discard: u32,
    pub cpu_cmd: String,
    pub cuda_cmd: String,
}

impl RunConfig {
    fn from_bindings(bindings: &Bindings) -> Result<Self, ConfigError> {
        let lda_dim = parse_u32("lda_dim", bindings.value("lda_dim"))?;
        let plda_type = parse_plda_type("plda_type", bindings.value("plda_type"))?;
        let plda_y_dim = parse_u32("plda_y_dim", bindings.value("plda_y_dim"))?;

        let be_name = match bindings.value("be_name") {
            "" => format!("lda{lda_dim}_{plda_type}_y{plda_y_dim}"),
            explicit => explicit.to_string(),
        };
        let tool_root = match bindings.value("tool_root") {
            "" => None,
            root => Some(PathBuf::from(root)),
        };

        Ok(RunConfig {
            exp_root: PathBuf::from(bindings.value("exp_root")),
            data_root: PathBuf::from(bindings.value("data_root")),
            corpus_root: PathBuf::from(bindings.value("corpus_root")),
            tool_root,
            feat_name: bindings.value("feat_name").to_string(),
            feat_config: PathBuf::from(bindings.value("feat_config")),
            nj: parse_u32("nj", bindings.value("nj"))?,
            nnet_name: bindings.value("nnet_name").to_string(),
            num_epochs: parse_u32("num_epochs", bindings.value("num_epochs"))?,
            batch_size: parse_u32("batch_size", bindings.value("batch_size"))?,
            use_gpu: parse_bool("use_gpu", bindings.value("use_gpu"))?,
            chunk_length: parse_u32("chunk_length", bindings.value("chunk_length"))?,
            lda_dim,
            plda_type,
            plda_y_dim,
            plda_z_dim: parse_u32("plda_z_dim", bindings.value("plda_z_dim"))?,
            be_name,
            train_data: bindings.value("train_data").to_string(),
            enroll_data: bindings.value("enroll_data").to_string(),
            test_data: bindings.value("test_data").to_string(),
            trials: bindings.value("trials").to_string(),
            snorm: parse_bool("snorm", bindings.value("snorm"))?,
            coh_data: bindings.value("coh_data").to_string(),
            coh_nbest: parse_u32("coh_nbest", bindings.value("coh_nbest"))?,
            coh_nbest_discard: parse_u32("coh_nbest_discard", bindings.value("coh_nbest_discard"))?,
            cpu_cmd: bindings.value("cpu_cmd").to_string(),
            cuda_cmd: bindings.value("cuda_cmd").to_string(),
        })
    }

    /// Resolved settings as `(key, value)` pairs in the key-table order.
    /// `xvrun config` prints these; derived values appear filled in.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let tool_root = self
            .tool_root
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        vec![
            ("exp_root", self.exp_root.display().to_string()),
            ("data_root", self.data_root.display().to_string()),
            ("corpus_root", self.corpus_root.display().to_string()),
            ("tool_root", tool_root),
            ("feat_name", self.feat_name.clone()),
            ("feat_config", self.feat_config.display().to_string()),
            ("nj", self.nj.to_string()),
            ("nnet_name", self.nnet_name.clone()),
            ("num_epochs", self.num_epochs.to_string()),
            ("batch_size", self.batch_size.to_string()),
            ("use_gpu", self.use_gpu.to_string()),
            ("chunk_length", self.chunk_length.to_string()),
            ("lda_dim", self.lda_dim.to_string()),
            ("plda_type", self.plda_type.to_string()),
            ("plda_y_dim", self.plda_y_dim.to_string()),
            ("plda_z_dim", self.plda_z_dim.to_string()),
            ("be_name", self.be_name.clone()),
            ("train_data", self.train_data.clone()),
            ("enroll_data", self.enroll_data.clone()),
            ("test_data", self.test_data.clone()),
            ("trials", self.trials.clone()),
            ("snorm", self.snorm.to_string()),
            ("coh_data", self.coh_data.clone()),
            ("coh_nbest", self.coh_nbest.to_string()),
            ("coh_nbest_discard", self.coh_nbest_discard.to_string()),
            ("cpu_cmd", self.cpu_cmd.clone()),
            ("cuda_cmd", self.cuda_cmd.clone()),
        ]
    }
}

/// Resolve the cascade using the real process environment.
pub fn resolve(
    config_file: Option<&Path>,
    overrides: &[(String, String)],
) -> Result<RunConfig, ConfigError> {
    resolve_with_env(&EnvOverlay::from_process_env(), config_file, overrides)
}

pub(crate) fn resolve_with_env(
    env: &EnvOverlay,
    config_file: Option<&Path>,
    overrides: &[(String, String)],
) -> Result<RunConfig, ConfigError> {
    let mut bindings = Bindings::defaults();
    env.apply(&mut bindings);
    if let Some(path) = config_file {
        file::apply_file(&mut bindings, path)?;
    }
    for (key, value) in overrides {
        bindings.bind_known(key, value)?;
    }
    RunConfig::from_bindings(&bindings)
}
