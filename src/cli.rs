//! CLI argument parsing for the recipe runner.
//!
//! Only the subcommand layer is clap's job. Everything after the subcommand
//! name follows the recipe convention of free-form `--key value` pairs, so
//! those tokens are collected verbatim and parsed by the configuration
//! layer, where reserved flags and override keys live side by side.
use clap::{Parser, Subcommand};

/// Root CLI entrypoint for the staged pipeline runner.
#[derive(Parser, Debug)]
#[command(
    name = "xvrun",
    version,
    about = "Staged recipe runner for x-vector speaker verification pipelines",
    after_help = "Commands:\n  run     Run the pipeline stages from the gate onward\n  plan    Show the stages and commands a run would dispatch\n  config  Print the fully resolved configuration\n  stages  List the stage table and re-run costs\n\nExamples:\n  xvrun run --config-file conf/sre.conf\n  xvrun run --stage 4 --use-gpu true --nj 32\n  xvrun plan --stage 4 --config-file conf/sre.conf\n  xvrun config --config-file conf/sre.conf --json\n  xvrun stages",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Run(TailArgs),
    Plan(TailArgs),
    Config(TailArgs),
    Stages,
}

/// Raw trailing tokens for the pair-style subcommands.
#[derive(Parser, Debug)]
#[command(about = "Accepts --stage N, --config-file PATH, and --key value overrides")]
pub struct TailArgs {
    /// `--key value` pairs; see `xvrun config` for the key table
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "ARGS"
    )]
    pub args: Vec<String>,
}

/// Usage text for the shared `--key value` tail, printed on `--help` after
/// a subcommand name.
pub const TAIL_USAGE: &str = "usage: xvrun <run|plan|config> [options] [--key value ...]

options:
  --stage N            start stage; stages before N are skipped (default 1)
  --config-file PATH   key=value config file applied before CLI overrides
  --verbose            transcript of stage decisions on stderr (run only)
  --json               machine-readable output (plan and config only)
  --key value          override any configuration key (last value wins);
                       dashes and underscores in keys are interchangeable

resolution order: defaults, then XVRUN_TOOL_ROOT/XVRUN_CORPUS_ROOT from the
environment, then the config file, then --key value overrides.

run `xvrun config` for the full key table and `xvrun stages` for the stage
table.";
