//! Config file layer: `key=value` lines with includes and interpolation.
//!
//! Files use one assignment per line. `${name}` expands from everything
//! bound so far (defaults, environment, earlier lines), so a file can derive
//! values from values. `include <path>` pulls in another file relative to
//! the including one before later lines apply, giving shared site settings
//! a single home.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::Bindings;
use crate::error::ConfigError;

const MAX_INCLUDE_DEPTH: usize = 8;

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("regex for ${name}"))
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("regex for keys"))
}

pub(super) fn apply_file(bindings: &mut Bindings, path: &Path) -> Result<(), ConfigError> {
    apply_at_depth(bindings, path, 0)
}

fn apply_at_depth(bindings: &mut Bindings, path: &Path, depth: usize) -> Result<(), ConfigError> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(ConfigError::IncludeDepth {
            path: path.to_path_buf(),
            limit: MAX_INCLUDE_DEPTH,
        });
    }
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("include ") {
            let target = interpolate(rest.trim(), bindings, path, line_no)?;
            let target = Path::new(&target);
            let resolved = if target.is_absolute() {
                target.to_path_buf()
            } else {
                path.parent().unwrap_or(Path::new(".")).join(target)
            };
            apply_at_depth(bindings, &resolved, depth + 1)?;
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("expected key=value, got {line:?}"),
            });
        };
        let key = key.trim();
        if !key_pattern().is_match(key) {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("invalid key {key:?}"),
            });
        }
        let key = key.replace('-', "_");
        let value = unquote(value.trim());
        let value = interpolate(value, bindings, path, line_no)?;
        bindings.bind(&key, value);
    }
    Ok(())
}

/// Drop `#` comments: whole-line, or trailing when preceded by whitespace.
fn strip_comment(line: &str) -> &str {
    let mut prev_was_space = true;
    for (pos, ch) in line.char_indices() {
        if ch == '#' && prev_was_space {
            return &line[..pos];
        }
        prev_was_space = ch.is_whitespace();
    }
    line
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Expand every `${name}` against the bindings accumulated so far.
fn interpolate(
    value: &str,
    bindings: &Bindings,
    path: &Path,
    line: usize,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for caps in var_pattern().captures_iter(value) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let Some(bound) = bindings.lookup(name) else {
            return Err(ConfigError::UnboundVariable {
                path: path.to_path_buf(),
                line,
                name: name.to_string(),
            });
        };
        out.push_str(&value[last..whole.0]);
        out.push_str(bound);
        last = whole.1;
    }
    out.push_str(&value[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_with_env, EnvOverlay};
    use std::path::PathBuf;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn file_overrides_defaults_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write(
            dir.path(),
            "run.conf",
            "nnet_name=xvec_file.v1\ntool_root=/opt/from-file\n",
        );
        let env = EnvOverlay {
            tool_root: Some("/opt/from-env".to_string()),
            corpus_root: None,
        };
        let config = resolve_with_env(&env, Some(&conf), &[]).unwrap();
        assert_eq!(config.nnet_name, "xvec_file.v1");
        assert_eq!(config.tool_root, Some(PathBuf::from("/opt/from-file")));
    }

    #[test]
    fn interpolation_reads_earlier_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write(
            dir.path(),
            "run.conf",
            "feat_name=fbank64\nfeat_config=conf/${feat_name}.yaml\n",
        );
        let config = resolve_with_env(&EnvOverlay::empty(), Some(&conf), &[]).unwrap();
        assert_eq!(config.feat_config, PathBuf::from("conf/fbank64.yaml"));
    }

    #[test]
    fn scratch_names_interpolate_but_stay_out_of_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write(
            dir.path(),
            "run.conf",
            "suffix=.ft\nnnet_name=xvec_resnet34${suffix}\n",
        );
        let config = resolve_with_env(&EnvOverlay::empty(), Some(&conf), &[]).unwrap();
        assert_eq!(config.nnet_name, "xvec_resnet34.ft");
        assert!(config.entries().iter().all(|(key, _)| *key != "suffix"));
    }

    #[test]
    fn includes_resolve_relative_to_the_including_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "site.conf", "nj=48\ntool_root=/site/bin\n");
        let conf = write(dir.path(), "run.conf", "include site.conf\nnj=8\n");
        let config = resolve_with_env(&EnvOverlay::empty(), Some(&conf), &[]).unwrap();
        // later lines win over the include
        assert_eq!(config.nj, 8);
        assert_eq!(config.tool_root, Some(PathBuf::from("/site/bin")));
    }

    #[test]
    fn include_cycles_hit_the_depth_cap() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write(dir.path(), "loop.conf", "include loop.conf\n");
        let err = resolve_with_env(&EnvOverlay::empty(), Some(&conf), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::IncludeDepth { .. }));
    }

    #[test]
    fn unbound_variable_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write(dir.path(), "run.conf", "nnet_name=xvec${flavor}\n");
        let err = resolve_with_env(&EnvOverlay::empty(), Some(&conf), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::UnboundVariable { name, line, .. }
            if name == "flavor" && line == 1));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.conf");
        let err = resolve_with_env(&EnvOverlay::empty(), Some(&missing), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { path } if path == missing));
    }

    #[test]
    fn comments_blanks_and_quotes_are_handled() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write(
            dir.path(),
            "run.conf",
            "# site defaults\n\ncuda_cmd=\"queue.pl --gpu 1\"\nnj=24 # per-host cap\n",
        );
        let config = resolve_with_env(&EnvOverlay::empty(), Some(&conf), &[]).unwrap();
        assert_eq!(config.cuda_cmd, "queue.pl --gpu 1");
        assert_eq!(config.nj, 24);
    }

    #[test]
    fn malformed_lines_carry_file_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write(dir.path(), "run.conf", "nj=16\njust words\n");
        let err = resolve_with_env(&EnvOverlay::empty(), Some(&conf), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line, .. } if line == 2));
    }

    #[test]
    fn dashed_keys_alias_underscored_ones() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write(dir.path(), "run.conf", "nnet-name=xvec_dashed\n");
        let config = resolve_with_env(&EnvOverlay::empty(), Some(&conf), &[]).unwrap();
        assert_eq!(config.nnet_name, "xvec_dashed");
    }
}
