//! Typed builders for the external recipe tools.
//!
//! The runner never implements signal processing or model estimation. Each
//! module here marshals resolved configuration into the argument list of one
//! opaque executable and hands back a [`JobSpec`](crate::dispatch::JobSpec).
//! Builders validate what they can see (counts, dimensions, dataset names);
//! whether a tool's inputs exist on disk is the tool's own business.

pub(crate) mod backend;
pub(crate) mod extract;
pub(crate) mod features;
pub(crate) mod prepare;
pub(crate) mod train;

use std::path::{Path, PathBuf};

use crate::config::RunConfig;
use crate::error::PipelineError;

/// Resolves tool names to runnable paths.
///
/// With `tool_root` set, tools live under that directory; otherwise they
/// resolve on `PATH`. Strict resolution fails up front when a tool is
/// missing, so a run never dies halfway through on a typoed install. The
/// lenient mode keeps names symbolic for `plan` on machines without the
/// toolchain.
pub struct ToolResolver {
    root: Option<PathBuf>,
    require_present: bool,
}

impl ToolResolver {
    pub fn strict(config: &RunConfig) -> Self {
        ToolResolver {
            root: config.tool_root.clone(),
            require_present: true,
        }
    }

    pub fn lenient(config: &RunConfig) -> Self {
        ToolResolver {
            root: config.tool_root.clone(),
            require_present: false,
        }
    }

    pub fn resolve(&self, name: &str) -> Result<PathBuf, PipelineError> {
        if let Some(root) = &self.root {
            let candidate = root.join(name);
            if self.require_present && !candidate.is_file() {
                return Err(PipelineError::ToolNotFound {
                    name: name.to_string(),
                    source: None,
                });
            }
            return Ok(candidate);
        }
        if self.require_present {
            which::which(name).map_err(|source| PipelineError::ToolNotFound {
                name: name.to_string(),
                source: Some(source),
            })
        } else {
            Ok(PathBuf::from(name))
        }
    }
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Dataset names become path components, so they must be plain names.
pub(crate) fn validate_dataset_name(task: &str, name: &str) -> Result<(), PipelineError> {
    let plain = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
    if plain {
        return Ok(());
    }
    Err(PipelineError::InvalidJob {
        task: task.to_string(),
        reason: format!("dataset name {name:?} is not a plain directory name"),
    })
}

pub(crate) fn require(task: &str, condition: bool, reason: &str) -> Result<(), PipelineError> {
    if condition {
        return Ok(());
    }
    Err(PipelineError::InvalidJob {
        task: task.to_string(),
        reason: reason.to_string(),
    })
}
