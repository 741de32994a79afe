//! Environment layer of the cascade.
//!
//! Site installs export `XVRUN_TOOL_ROOT` and `XVRUN_CORPUS_ROOT` once (the
//! shell-profile collaborator every recipe sources) instead of repeating the
//! roots in every config file. The layer sits between the defaults and the
//! config file, so both the file and the CLI can still override it.

use super::Bindings;

pub(crate) const TOOL_ROOT_ENV: &str = "XVRUN_TOOL_ROOT";
pub(crate) const CORPUS_ROOT_ENV: &str = "XVRUN_CORPUS_ROOT";

#[derive(Debug, Default)]
pub(crate) struct EnvOverlay {
    pub(crate) tool_root: Option<String>,
    pub(crate) corpus_root: Option<String>,
}

impl EnvOverlay {
    pub(crate) fn from_process_env() -> Self {
        EnvOverlay {
            tool_root: read(TOOL_ROOT_ENV),
            corpus_root: read(CORPUS_ROOT_ENV),
        }
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        EnvOverlay::default()
    }

    pub(crate) fn apply(&self, bindings: &mut Bindings) {
        if let Some(tool_root) = &self.tool_root {
            bindings.bind("tool_root", tool_root.clone());
        }
        if let Some(corpus_root) = &self.corpus_root {
            bindings.bind("corpus_root", corpus_root.clone());
        }
    }
}

fn read(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
