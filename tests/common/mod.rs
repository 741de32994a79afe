//! Shared test infrastructure for integration tests.
//!
//! Each rig gets a private workspace with stub tools that record their argv
//! to a shared file and exit cleanly, plus stub wrappers that honor the
//! `[JOB=1:nj] <log> <cmd...>` calling convention. Tests drive the real
//! binary against that workspace and assert on the recorded invocations.

// Helpers are shared across test binaries; not every binary uses all of them.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Every external tool the pipeline dispatches.
pub const TOOLS: &[&str] = &[
    "prep-dataset",
    "make-fbank",
    "train-xvector",
    "extract-xvectors",
    "train-backend",
    "score-plda",
];

pub struct TestRig {
    pub temp: TempDir,
    /// Working directory the binary runs in; `data/` and `exp/` land here.
    pub root: PathBuf,
    /// Stub tool install dir, used as `tool_root`.
    pub bin_dir: PathBuf,
    /// Append-only log of every stub invocation, one argv per line.
    pub record: PathBuf,
}

impl TestRig {
    pub fn new() -> anyhow::Result<Self> {
        let temp = TempDir::new()?;
        let root = temp.path().join("work");
        let bin_dir = temp.path().join("bin");
        let record = temp.path().join("record.log");
        fs::create_dir_all(root.join("conf"))?;
        fs::create_dir_all(&bin_dir)?;
        fs::write(&record, "")?;

        let rig = TestRig {
            temp,
            root,
            bin_dir,
            record,
        };
        for tool in TOOLS {
            rig.install_tool(tool, 0)?;
        }
        rig.install_wrapper("cpu-queue")?;
        rig.install_wrapper("cuda-queue")?;
        rig.write_conf()?;
        Ok(rig)
    }

    /// Install a stub tool that records its argv and exits with `exit_code`.
    /// Reinstalling an existing name replaces it.
    pub fn install_tool(&self, name: &str, exit_code: i32) -> anyhow::Result<()> {
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"{name} $*\" >> \"{record}\"\nexit {exit_code}\n",
            record = self.record.display(),
        );
        self.install_script(name, &script)
    }

    /// Install a stub wrapper that strips the shard range, captures the tool
    /// output into the log path, and propagates the tool's exit status.
    fn install_wrapper(&self, name: &str) -> anyhow::Result<()> {
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"{name} $*\" >> \"{record}\"\ncase \"$1\" in JOB=1:*) shift ;; esac\nlog=$1; shift\nmkdir -p \"$(dirname \"$log\")\"\nexec \"$@\" > \"$log\" 2>&1\n",
            record = self.record.display(),
        );
        self.install_script(name, &script)
    }

    fn install_script(&self, name: &str, contents: &str) -> anyhow::Result<()> {
        let path = self.bin_dir.join(name);
        fs::write(&path, contents)?;
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms)?;
        Ok(())
    }

    fn write_conf(&self) -> anyhow::Result<()> {
        let contents = format!(
            "tool_root={bin}\ncpu_cmd={bin}/cpu-queue\ncuda_cmd={bin}/cuda-queue\nnj=2\n",
            bin = self.bin_dir.display(),
        );
        fs::write(self.root.join("conf/test.conf"), contents)?;
        Ok(())
    }

    /// Run the binary in the rig workspace with a scrubbed environment.
    pub fn xvrun(&self, args: &[&str]) -> anyhow::Result<Output> {
        self.xvrun_env(args, &[])
    }

    pub fn xvrun_env(&self, args: &[&str], envs: &[(&str, &str)]) -> anyhow::Result<Output> {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_xvrun"));
        cmd.args(args)
            .current_dir(&self.root)
            .env_remove("XVRUN_TOOL_ROOT")
            .env_remove("XVRUN_CORPUS_ROOT")
            .env_remove("XVRUN_LOG");
        for (key, value) in envs {
            cmd.env(key, value);
        }
        Ok(cmd.output()?)
    }

    /// Run `xvrun run --config-file conf/test.conf <extra...>`.
    pub fn run_pipeline(&self, extra: &[&str]) -> anyhow::Result<Output> {
        let mut args = vec!["run", "--config-file", "conf/test.conf"];
        args.extend_from_slice(extra);
        self.xvrun(&args)
    }

    /// Every recorded stub invocation, in order.
    pub fn recorded(&self) -> anyhow::Result<Vec<String>> {
        Ok(fs::read_to_string(&self.record)?
            .lines()
            .map(str::to_string)
            .collect())
    }

    /// Recorded invocations of the tools themselves, wrapper lines dropped.
    pub fn recorded_tools(&self) -> anyhow::Result<Vec<String>> {
        Ok(self
            .recorded()?
            .into_iter()
            .filter(|line| TOOLS.iter().any(|tool| line.starts_with(tool)))
            .collect())
    }

    /// First token of each recorded tool line, for order assertions.
    pub fn recorded_tool_names(&self) -> anyhow::Result<Vec<String>> {
        Ok(self
            .recorded_tools()?
            .iter()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect())
    }

    /// Parse `xvrun config --json` with the rig conf plus extra args.
    pub fn config_json(&self, extra: &[&str]) -> anyhow::Result<serde_json::Value> {
        let mut args = vec!["config", "--config-file", "conf/test.conf", "--json"];
        args.extend_from_slice(extra);
        let output = self.xvrun(&args)?;
        anyhow::ensure!(
            output.status.success(),
            "config failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
