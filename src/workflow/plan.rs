//! The `xvrun plan` command: show what a run would dispatch, without
//! spawning anything.
//!
//! Planning resolves the same cascade as `run` and prints every stage with
//! its gate decision and the exact wrapper command lines. Tool names stay
//! symbolic, so a plan renders on machines without the toolchain installed.

use anyhow::Result;
use serde::Serialize;

use crate::cli;
use crate::config::{self, TailOpts};
use crate::dispatch::ProcessDispatcher;
use crate::paths::ExpPaths;
use crate::pipeline;
use crate::stage::{StageCounter, STAGES};
use crate::tools::ToolResolver;
use crate::util::format_command_line;

#[derive(Debug, Serialize)]
struct PlannedJob {
    task: String,
    routing: &'static str,
    nj: Option<u32>,
    command: String,
    output_dir: String,
}

#[derive(Debug, Serialize)]
struct PlannedStage {
    stage: u32,
    name: &'static str,
    run: bool,
    jobs: Vec<PlannedJob>,
}

pub fn run_plan(opts: &TailOpts) -> Result<()> {
    if opts.help {
        println!("{}", cli::TAIL_USAGE);
        return Ok(());
    }
    let config = config::resolve(opts.config_file.as_deref(), &opts.overrides)?;
    let counter = StageCounter::new(opts.stage);
    let paths = ExpPaths::new(&config);
    let tools = ToolResolver::lenient(&config);
    let dispatcher = ProcessDispatcher::from_config(&config)?;

    let mut planned = Vec::with_capacity(STAGES.len());
    for stage in STAGES {
        let run = counter.should_run(stage);
        let jobs = if run {
            pipeline::stage_jobs(stage, &config, &paths, &tools)?
                .iter()
                .map(|job| PlannedJob {
                    task: job.task.clone(),
                    routing: job.routing.label(),
                    nj: job.nj,
                    command: format_command_line(&dispatcher.preview_argv(job)),
                    output_dir: job.output_dir.display().to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };
        planned.push(PlannedStage {
            stage: stage.index(),
            name: stage.name(),
            run,
            jobs,
        });
    }

    if opts.json {
        let text = serde_json::to_string_pretty(&planned)?;
        println!("{text}");
        return Ok(());
    }
    for stage in &planned {
        if !stage.run {
            println!(
                "stage {} ({}): skip (start stage is {})",
                stage.stage,
                stage.name,
                counter.start()
            );
            continue;
        }
        println!("stage {} ({}): {} job(s)", stage.stage, stage.name, stage.jobs.len());
        for job in &stage.jobs {
            let shards = match job.nj {
                Some(nj) => format!(" nj={nj}"),
                None => String::new(),
            };
            println!("  [{}{}] {}", job.routing, shards, job.command);
        }
    }
    Ok(())
}
