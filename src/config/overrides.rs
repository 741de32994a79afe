//! Trailing-argument parsing for the pipeline subcommands.
//!
//! After the subcommand name, everything is `--key value` (or `--key=value`)
//! pairs, so any configuration key can be flipped per invocation without a
//! config file edit. `--stage` and `--config-file` are reserved for the
//! runner itself, plus a few bare flags scoped per command; the remaining
//! pairs become the last layer of the cascade. Dashes and underscores in key
//! names are interchangeable.

use std::path::PathBuf;
use std::slice::Iter;

use crate::error::ConfigError;

/// Parsed tail of a `run`/`plan`/`config` invocation.
#[derive(Debug)]
pub struct TailOpts {
    pub stage: u32,
    pub config_file: Option<PathBuf>,
    pub verbose: bool,
    pub json: bool,
    pub help: bool,
    pub overrides: Vec<(String, String)>,
}

impl Default for TailOpts {
    fn default() -> Self {
        TailOpts {
            stage: 1,
            config_file: None,
            verbose: false,
            json: false,
            help: false,
            overrides: Vec::new(),
        }
    }
}

/// Parses the trailing arguments of one subcommand. `flags` names the bare
/// flags that subcommand accepts; the others are rejected rather than
/// silently swallowed.
pub fn parse_tail(args: &[String], flags: &[&str]) -> Result<TailOpts, ConfigError> {
    let mut opts = TailOpts::default();
    let mut iter = args.iter();
    while let Some(token) = iter.next() {
        if token == "-h" || token == "--help" {
            opts.help = true;
            continue;
        }
        let Some(body) = token.strip_prefix("--") else {
            return Err(ConfigError::InvalidArgs {
                message: format!("expected --key value pairs, got {token:?}"),
            });
        };
        if body.is_empty() {
            return Err(ConfigError::InvalidArgs {
                message: "unexpected bare --".to_string(),
            });
        }
        let (raw_key, eq_value) = match body.split_once('=') {
            Some((key, value)) => (key, Some(value.to_string())),
            None => (body, None),
        };
        let key = raw_key.replace('-', "_");

        if key == "verbose" || key == "json" {
            if !flags.contains(&key.as_str()) {
                return Err(ConfigError::InvalidArgs {
                    message: format!("--{key} is not accepted by this command"),
                });
            }
            reject_value(&key, eq_value.as_deref())?;
            if key == "verbose" {
                opts.verbose = true;
            } else {
                opts.json = true;
            }
        } else if key == "stage" {
            let value = take_value(&key, eq_value, &mut iter)?;
            opts.stage = parse_stage(&value)?;
        } else if key == "config_file" {
            let value = take_value(&key, eq_value, &mut iter)?;
            opts.config_file = Some(PathBuf::from(value));
        } else {
            let value = take_value(&key, eq_value, &mut iter)?;
            opts.overrides.push((key, value));
        }
    }
    Ok(opts)
}

/// `--key=value` wins; otherwise the next token is the value, whatever it
/// looks like, so values that start with dashes pass through unescaped.
fn take_value(
    key: &str,
    eq_value: Option<String>,
    iter: &mut Iter<'_, String>,
) -> Result<String, ConfigError> {
    if let Some(value) = eq_value {
        return Ok(value);
    }
    iter.next().cloned().ok_or_else(|| ConfigError::MissingValue {
        key: key.to_string(),
    })
}

fn reject_value(key: &str, eq_value: Option<&str>) -> Result<(), ConfigError> {
    if eq_value.is_some() {
        return Err(ConfigError::InvalidArgs {
            message: format!("flag --{key} takes no value"),
        });
    }
    Ok(())
}

fn parse_stage(value: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: "stage".to_string(),
        value: value.to_string(),
        expected: "a positive integer",
    };
    let stage: u32 = value.parse().map_err(|_| invalid())?;
    if stage == 0 {
        return Err(invalid());
    }
    Ok(stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn pairs_parse_with_space_or_equals() {
        let opts = parse_tail(&args(&["--nnet-name", "xvec_a", "--nj=40"]), &[]).unwrap();
        assert_eq!(
            opts.overrides,
            vec![
                ("nnet_name".to_string(), "xvec_a".to_string()),
                ("nj".to_string(), "40".to_string()),
            ]
        );
    }

    #[test]
    fn reserved_flags_are_extracted_in_any_position() {
        let opts = parse_tail(
            &args(&[
                "--use-gpu",
                "true",
                "--stage",
                "4",
                "--config-file",
                "conf/site.conf",
                "--verbose",
            ]),
            &["verbose"],
        )
        .unwrap();
        assert_eq!(opts.stage, 4);
        assert_eq!(opts.config_file, Some(PathBuf::from("conf/site.conf")));
        assert!(opts.verbose);
        assert_eq!(
            opts.overrides,
            vec![("use_gpu".to_string(), "true".to_string())]
        );
    }

    #[test]
    fn stage_defaults_to_one() {
        let opts = parse_tail(&[], &[]).unwrap();
        assert_eq!(opts.stage, 1);
        assert!(opts.overrides.is_empty());
    }

    #[test]
    fn stage_zero_is_rejected() {
        let err = parse_tail(&args(&["--stage", "0"]), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "stage"));
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = parse_tail(&args(&["--nnet-name"]), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue { key } if key == "nnet_name"));
    }

    #[test]
    fn non_flag_tokens_are_rejected() {
        let err = parse_tail(&args(&["stage", "2"]), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgs { .. }));
    }

    #[test]
    fn help_and_json_are_bare_flags() {
        let opts = parse_tail(&args(&["--json", "--help"]), &["json"]).unwrap();
        assert!(opts.json);
        assert!(opts.help);

        let err = parse_tail(&args(&["--json=yes"]), &["json"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgs { .. }));
    }

    #[test]
    fn bare_flags_outside_the_command_surface_are_rejected() {
        let err = parse_tail(&args(&["--json"]), &["verbose"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgs { message } if message.contains("--json")));

        let err = parse_tail(&args(&["--verbose"]), &["json"]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidArgs { message } if message.contains("--verbose"))
        );
    }

    #[test]
    fn values_may_start_with_dashes() {
        let opts = parse_tail(&args(&["--cuda-cmd", "--gpu 1"]), &[]).unwrap();
        assert_eq!(
            opts.overrides,
            vec![("cuda_cmd".to_string(), "--gpu 1".to_string())]
        );
    }
}
