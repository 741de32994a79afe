//! Error types shared across the runner.
//!
//! Configuration problems and pipeline problems exit with different codes,
//! so they stay separate types and `main` maps them at the top level.

use std::path::PathBuf;

use thiserror::Error;

use crate::dispatch::JobStatus;
use crate::stage::Stage;

/// Errors raised while resolving the configuration cascade.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}:{line}: unbound variable ${{{name}}}", .path.display())]
    UnboundVariable {
        path: PathBuf,
        line: usize,
        name: String,
    },

    #[error("include depth exceeded at {} (limit {limit})", .path.display())]
    IncludeDepth { path: PathBuf, limit: usize },

    #[error("unknown configuration key {key:?} (run `xvrun config` to list known keys)")]
    UnknownKey { key: String },

    #[error("invalid value {value:?} for {key} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("missing value for --{key}")]
    MissingValue { key: String },

    #[error("invalid arguments: {message}")]
    InvalidArgs { message: String },
}

/// Errors raised while building or dispatching pipeline jobs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("tool {name:?} not found (set tool_root or install it on PATH)")]
    ToolNotFound {
        name: String,
        #[source]
        source: Option<which::Error>,
    },

    #[error("invalid job {task}: {reason}")]
    InvalidJob { task: String, reason: String },

    #[error("create log directory {}: {source}", .path.display())]
    CreateLogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spawn {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stage {} ({}): {task} failed with {status}", .stage.index(), .stage.name())]
    StageFailed {
        stage: Stage,
        task: String,
        status: JobStatus,
    },
}
