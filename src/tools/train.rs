//! Embedding network training: `train-xvector`.

use super::{path_arg, require, ToolResolver};
use crate::config::RunConfig;
use crate::dispatch::{JobSpec, Routing};
use crate::error::PipelineError;
use crate::paths::ExpPaths;

pub(crate) const TRAIN_XVECTOR_BIN: &str = "train-xvector";

/// Build the single long-running network training job.
pub(crate) fn train_xvector_job(
    config: &RunConfig,
    paths: &ExpPaths,
    tools: &ToolResolver,
) -> Result<JobSpec, PipelineError> {
    let task = "train-nnet".to_string();
    require(&task, config.num_epochs >= 1, "num_epochs must be at least 1")?;
    require(&task, config.batch_size >= 1, "batch_size must be at least 1")?;

    let output_dir = paths.nnet_dir(&config.nnet_name);
    let log_path = paths.job_log(&output_dir, "train-nnet", false);
    let mut args = vec![
        "--data".to_string(),
        path_arg(&paths.data_dir(&config.train_data)),
        "--feats".to_string(),
        path_arg(&paths.features_dir(&config.feat_name, &config.train_data)),
        "--epochs".to_string(),
        config.num_epochs.to_string(),
        "--batch-size".to_string(),
        config.batch_size.to_string(),
        "--out".to_string(),
        path_arg(&output_dir),
    ];
    if config.use_gpu {
        args.push("--use-gpu".to_string());
        args.push("true".to_string());
    }
    Ok(JobSpec {
        task,
        program: tools.resolve(TRAIN_XVECTOR_BIN)?,
        args,
        nj: None,
        routing: if config.use_gpu {
            Routing::Accelerator
        } else {
            Routing::Cpu
        },
        log_path,
        output_dir,
    })
}
