//! The `xvrun run` command: walk the stages and dispatch their jobs.
//!
//! The loop is deliberately dumb. It never inspects artifacts or tracks
//! completion; the stage gate decides what runs and the first failing job
//! ends the run with that job's exit status. Jobs for a stage are built
//! only once the gate admits it, so a failure never half-constructs later
//! stages.

use anyhow::Result;

use crate::cli;
use crate::config::{self, RunConfig, TailOpts};
use crate::dispatch::{Dispatcher, ProcessDispatcher};
use crate::error::PipelineError;
use crate::paths::ExpPaths;
use crate::pipeline;
use crate::stage::{StageCounter, STAGES};
use crate::tools::ToolResolver;

pub fn run_run(opts: &TailOpts) -> Result<()> {
    if opts.help {
        println!("{}", cli::TAIL_USAGE);
        return Ok(());
    }
    let config = config::resolve(opts.config_file.as_deref(), &opts.overrides)?;
    let counter = StageCounter::new(opts.stage);
    let paths = ExpPaths::new(&config);
    let tools = ToolResolver::strict(&config);
    let dispatcher = ProcessDispatcher::from_config(&config)?;

    let summary = run_stages(&config, &paths, &tools, counter, &dispatcher, opts.verbose)?;
    println!(
        "pipeline complete ({} stage(s) run, {} skipped)",
        summary.ran, summary.skipped
    );
    Ok(())
}

#[derive(Debug)]
pub(crate) struct RunSummary {
    pub(crate) ran: usize,
    pub(crate) skipped: usize,
}

pub(crate) fn run_stages(
    config: &RunConfig,
    paths: &ExpPaths,
    tools: &ToolResolver,
    counter: StageCounter,
    dispatcher: &dyn Dispatcher,
    verbose: bool,
) -> Result<RunSummary> {
    let mut summary = RunSummary { ran: 0, skipped: 0 };
    for stage in STAGES {
        if !counter.should_run(stage) {
            tracing::info!(stage = %stage, start = counter.start(), "stage skipped");
            if verbose {
                eprintln!("run: skip stage {} ({})", stage.index(), stage);
            }
            summary.skipped += 1;
            continue;
        }
        let jobs = pipeline::stage_jobs(stage, config, paths, tools)?;
        if verbose {
            eprintln!(
                "run: stage {} ({}): {} job(s)",
                stage.index(),
                stage,
                jobs.len()
            );
        }
        for job in &jobs {
            let status = dispatcher.dispatch(job)?;
            if !status.success() {
                return Err(PipelineError::StageFailed {
                    stage,
                    task: job.task.clone(),
                    status,
                }
                .into());
            }
        }
        tracing::info!(stage = %stage, jobs = jobs.len(), "stage complete");
        summary.ran += 1;
    }
    Ok(summary)
}
