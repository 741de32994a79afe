//! Feature extraction: `make-fbank`.

use super::{path_arg, require, validate_dataset_name, ToolResolver};
use crate::config::RunConfig;
use crate::dispatch::{JobSpec, Routing};
use crate::error::PipelineError;
use crate::paths::ExpPaths;

pub(crate) const MAKE_FBANK_BIN: &str = "make-fbank";

/// Build the sharded filterbank job for one dataset.
pub(crate) fn make_fbank_job(
    config: &RunConfig,
    paths: &ExpPaths,
    tools: &ToolResolver,
    dataset: &str,
) -> Result<JobSpec, PipelineError> {
    let task = format!("features.{dataset}");
    validate_dataset_name(&task, dataset)?;
    require(&task, config.nj >= 1, "nj must be at least 1")?;

    let output_dir = paths.features_dir(&config.feat_name, dataset);
    let log_path = paths.job_log(&output_dir, "features", true);
    let args = vec![
        "--config".to_string(),
        path_arg(&config.feat_config),
        "--nj".to_string(),
        config.nj.to_string(),
        "--data".to_string(),
        path_arg(&paths.data_dir(dataset)),
        "--out".to_string(),
        path_arg(&output_dir),
    ];
    Ok(JobSpec {
        task,
        program: tools.resolve(MAKE_FBANK_BIN)?,
        args,
        nj: Some(config.nj),
        routing: Routing::Cpu,
        log_path,
        output_dir,
    })
}
