//! The `xvrun config` command: print the fully resolved configuration.
//!
//! What this prints is exactly what `run` would see, including derived
//! values, so override questions get settled by reading output instead of
//! tracing the cascade by hand.

use anyhow::Result;

use crate::cli;
use crate::config::{self, TailOpts};

pub fn run_config(opts: &TailOpts) -> Result<()> {
    if opts.help {
        println!("{}", cli::TAIL_USAGE);
        return Ok(());
    }
    let config = config::resolve(opts.config_file.as_deref(), &opts.overrides)?;
    if opts.json {
        let text = serde_json::to_string_pretty(&config)?;
        println!("{text}");
        return Ok(());
    }
    for (key, value) in config.entries() {
        println!("{key}={value}");
    }
    Ok(())
}
