//! Subcommand entry points.
//!
//! Each entry point resolves the configuration cascade for its own
//! invocation and stays small; process spawning sits behind the dispatcher
//! seam so the stage loop is testable without a toolchain installed.
mod config_cmd;
mod plan;
mod run;
mod stages_cmd;

pub use config_cmd::run_config;
pub use plan::run_plan;
pub use run::run_run;
pub use stages_cmd::run_stage_list;
