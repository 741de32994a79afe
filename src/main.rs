use clap::Parser;

mod cli;
mod config;
mod dispatch;
mod error;
mod paths;
mod pipeline;
mod stage;
mod tools;
mod util;
mod workflow;

use cli::{Command, RootArgs};
use config::parse_tail;
use error::{ConfigError, PipelineError};

fn main() {
    init_tracing();
    let root = RootArgs::parse();
    if let Err(err) = dispatch_command(root.command) {
        eprintln!("xvrun: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

fn dispatch_command(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Run(tail) => {
            let opts = parse_tail(&tail.args, &["verbose"])?;
            workflow::run_run(&opts)
        }
        Command::Plan(tail) => {
            let opts = parse_tail(&tail.args, &["json"])?;
            workflow::run_plan(&opts)
        }
        Command::Config(tail) => {
            let opts = parse_tail(&tail.args, &["json"])?;
            workflow::run_config(&opts)
        }
        Command::Stages => workflow::run_stage_list(),
    }
}

/// Configuration mistakes exit 2; a failed stage propagates the tool's own
/// exit code; anything else is 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(PipelineError::StageFailed { status, .. }) = err.downcast_ref::<PipelineError>() {
        return status.process_exit_code();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    1
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_env("XVRUN_LOG")
        .unwrap_or_else(|_| "xvrun=warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod exit_code_tests {
    use super::*;
    use crate::dispatch::JobStatus;
    use crate::stage::Stage;

    #[test]
    fn stage_failures_propagate_the_child_code() {
        let err: anyhow::Error = PipelineError::StageFailed {
            stage: Stage::Features,
            task: "features.test".to_string(),
            status: JobStatus::exited(42),
        }
        .into();
        assert_eq!(exit_code(&err), 42);
    }

    #[test]
    fn signal_deaths_map_to_one() {
        let err: anyhow::Error = PipelineError::StageFailed {
            stage: Stage::Score,
            task: "score.test".to_string(),
            status: JobStatus {
                code: None,
                signal: Some(9),
            },
        }
        .into();
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn config_errors_exit_two() {
        let err: anyhow::Error = ConfigError::UnknownKey {
            key: "nnet_nme".to_string(),
        }
        .into();
        assert_eq!(exit_code(&err), 2);

        let err: anyhow::Error = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&err), 1);
    }
}
