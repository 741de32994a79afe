//! Job dispatch through the configured wrapper commands.
//!
//! A job names a tool, its arguments, a shard count, and a routing class.
//! Dispatch picks the wrapper for that class (`cpu_cmd` or `cuda_cmd`),
//! prepends it to the tool command line as
//! `wrapper... [JOB=1:nj] <log> <tool> <args...>`, and waits for it. The
//! wrapper owns scheduling, sharding, and log capture; the runner only
//! reads the final exit status. An empty wrapper spawns the tool directly.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::config::RunConfig;
use crate::error::{ConfigError, PipelineError};
use crate::util::format_command_line;

/// Which wrapper a job is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    Cpu,
    Accelerator,
}

impl Routing {
    pub fn label(self) -> &'static str {
        match self {
            Routing::Cpu => "cpu",
            Routing::Accelerator => "cuda",
        }
    }
}

/// One external tool invocation, fully determined before dispatch.
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Short label used in logs and failure reports, e.g. `features.train`.
    pub task: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Shard count passed to the wrapper as `JOB=1:nj`; `None` for a
    /// single unsharded invocation.
    pub nj: Option<u32>,
    pub routing: Routing,
    pub log_path: PathBuf,
    pub output_dir: PathBuf,
}

/// How a dispatched job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobStatus {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl JobStatus {
    pub fn from_exit_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;
        JobStatus {
            code: status.code(),
            signal,
        }
    }

    #[cfg(test)]
    pub(crate) fn exited(code: i32) -> Self {
        JobStatus {
            code: Some(code),
            signal: None,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code the runner itself should exit with after this failure.
    /// Signal deaths have no code to propagate and map to 1.
    pub fn process_exit_code(&self) -> i32 {
        self.code.unwrap_or(1)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => f.write_str("unknown status"),
        }
    }
}

/// Seam between the stage loop and process spawning.
pub trait Dispatcher {
    fn dispatch(&self, job: &JobSpec) -> Result<JobStatus, PipelineError>;
}

/// Dispatcher that spawns real processes through the configured wrappers.
#[derive(Debug)]
pub struct ProcessDispatcher {
    cpu_cmd: Vec<String>,
    cuda_cmd: Vec<String>,
}

impl ProcessDispatcher {
    pub fn from_config(config: &RunConfig) -> Result<Self, ConfigError> {
        Ok(ProcessDispatcher {
            cpu_cmd: parse_wrapper("cpu_cmd", &config.cpu_cmd)?,
            cuda_cmd: parse_wrapper("cuda_cmd", &config.cuda_cmd)?,
        })
    }

    fn wrapper(&self, routing: Routing) -> &[String] {
        match routing {
            Routing::Cpu => &self.cpu_cmd,
            Routing::Accelerator => &self.cuda_cmd,
        }
    }

    /// The exact argv a job would run with, for `plan` output.
    pub fn preview_argv(&self, job: &JobSpec) -> Vec<String> {
        assemble_argv(self.wrapper(job.routing), job)
    }
}

fn parse_wrapper(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    shell_words::split(raw).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected: "a shell-quoted command",
    })
}

/// Build the final argv. The wrapper contract puts the shard range first,
/// then the log path, then the unmodified tool command line.
fn assemble_argv(wrapper: &[String], job: &JobSpec) -> Vec<String> {
    let program = job.program.to_string_lossy().into_owned();
    if wrapper.is_empty() {
        let mut argv = Vec::with_capacity(1 + job.args.len());
        argv.push(program);
        argv.extend(job.args.iter().cloned());
        return argv;
    }
    let mut argv = wrapper.to_vec();
    if let Some(nj) = job.nj {
        argv.push(format!("JOB=1:{nj}"));
    }
    argv.push(job.log_path.to_string_lossy().into_owned());
    argv.push(program);
    argv.extend(job.args.iter().cloned());
    argv
}

impl Dispatcher for ProcessDispatcher {
    fn dispatch(&self, job: &JobSpec) -> Result<JobStatus, PipelineError> {
        if let Some(dir) = job.log_path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| PipelineError::CreateLogDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let argv = assemble_argv(self.wrapper(job.routing), job);
        tracing::debug!(task = %job.task, command = %format_command_line(&argv), "dispatch");
        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .status()
            .map_err(|source| PipelineError::Spawn {
                program: argv[0].clone(),
                source,
            })?;
        let status = JobStatus::from_exit_status(status);
        tracing::info!(task = %job.task, %status, "job finished");
        Ok(status)
    }
}
