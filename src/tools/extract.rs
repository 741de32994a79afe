//! Embedding extraction: `extract-xvectors`.

use super::{path_arg, require, validate_dataset_name, ToolResolver};
use crate::config::RunConfig;
use crate::dispatch::{JobSpec, Routing};
use crate::error::PipelineError;
use crate::paths::ExpPaths;

pub(crate) const EXTRACT_XVECTORS_BIN: &str = "extract-xvectors";

/// Build the sharded extraction job for one dataset.
///
/// On GPU the tool additionally receives the utterance chunk length, which
/// bounds accelerator memory during the forward pass.
pub(crate) fn extract_xvectors_job(
    config: &RunConfig,
    paths: &ExpPaths,
    tools: &ToolResolver,
    dataset: &str,
) -> Result<JobSpec, PipelineError> {
    let task = format!("extract.{dataset}");
    validate_dataset_name(&task, dataset)?;
    require(&task, config.nj >= 1, "nj must be at least 1")?;
    if config.use_gpu {
        require(&task, config.chunk_length >= 1, "chunk_length must be at least 1")?;
    }

    let output_dir = paths.xvector_dir(&config.nnet_name, dataset);
    let log_path = paths.job_log(&output_dir, "extract", true);
    let mut args = vec![
        "--nnet".to_string(),
        path_arg(&paths.nnet_model_path(&config.nnet_name)),
        "--data".to_string(),
        path_arg(&paths.data_dir(dataset)),
        "--feats".to_string(),
        path_arg(&paths.features_dir(&config.feat_name, dataset)),
        "--nj".to_string(),
        config.nj.to_string(),
        "--out".to_string(),
        path_arg(&output_dir),
    ];
    if config.use_gpu {
        args.push("--use-gpu".to_string());
        args.push("true".to_string());
        args.push("--chunk-length".to_string());
        args.push(config.chunk_length.to_string());
    }
    Ok(JobSpec {
        task,
        program: tools.resolve(EXTRACT_XVECTORS_BIN)?,
        args,
        nj: Some(config.nj),
        routing: if config.use_gpu {
            Routing::Accelerator
        } else {
            Routing::Cpu
        },
        log_path,
        output_dir,
    })
}
