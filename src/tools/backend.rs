//! Backend estimation and trial scoring: `train-backend` and `score-plda`.

use super::{path_arg, require, validate_dataset_name, ToolResolver};
use crate::config::RunConfig;
use crate::dispatch::{JobSpec, Routing};
use crate::error::PipelineError;
use crate::paths::ExpPaths;

pub(crate) const TRAIN_BACKEND_BIN: &str = "train-backend";
pub(crate) const SCORE_PLDA_BIN: &str = "score-plda";

/// Build the LDA/PLDA estimation job over the training embeddings.
pub(crate) fn train_backend_job(
    config: &RunConfig,
    paths: &ExpPaths,
    tools: &ToolResolver,
) -> Result<JobSpec, PipelineError> {
    let task = "train-backend".to_string();
    require(&task, config.lda_dim >= 1, "lda_dim must be at least 1")?;
    require(&task, config.plda_y_dim >= 1, "plda_y_dim must be at least 1")?;
    require(&task, config.plda_z_dim >= 1, "plda_z_dim must be at least 1")?;
    require(
        &task,
        config.plda_y_dim <= config.lda_dim,
        "plda_y_dim cannot exceed lda_dim",
    )?;

    let output_dir = paths.be_dir(&config.nnet_name, &config.be_name);
    let log_path = paths.job_log(&output_dir, "train-backend", false);
    let args = vec![
        "--vectors".to_string(),
        path_arg(&paths.xvector_dir(&config.nnet_name, &config.train_data)),
        "--lda-dim".to_string(),
        config.lda_dim.to_string(),
        "--plda-type".to_string(),
        config.plda_type.to_string(),
        "--y-dim".to_string(),
        config.plda_y_dim.to_string(),
        "--z-dim".to_string(),
        config.plda_z_dim.to_string(),
        "--out".to_string(),
        path_arg(&output_dir),
    ];
    Ok(JobSpec {
        task,
        program: tools.resolve(TRAIN_BACKEND_BIN)?,
        args,
        nj: None,
        routing: Routing::Cpu,
        log_path,
        output_dir,
    })
}

/// Build the trial scoring job, with optional cohort normalization.
pub(crate) fn score_plda_job(
    config: &RunConfig,
    paths: &ExpPaths,
    tools: &ToolResolver,
) -> Result<JobSpec, PipelineError> {
    let task = format!("score.{}", config.test_data);
    validate_dataset_name(&task, &config.test_data)?;
    validate_dataset_name(&task, &config.enroll_data)?;

    let output_dir = paths.scores_dir(&config.nnet_name, &config.be_name, &config.test_data);
    let log_path = paths.job_log(&output_dir, "score", false);
    let mut args = vec![
        "--backend".to_string(),
        path_arg(&paths.be_dir(&config.nnet_name, &config.be_name)),
        "--enroll".to_string(),
        path_arg(&paths.xvector_dir(&config.nnet_name, &config.enroll_data)),
        "--test".to_string(),
        path_arg(&paths.xvector_dir(&config.nnet_name, &config.test_data)),
        "--trials".to_string(),
        path_arg(&paths.trials_path(&config.test_data, &config.trials)),
    ];
    if config.snorm {
        validate_dataset_name(&task, &config.coh_data)?;
        require(&task, config.coh_nbest >= 1, "coh_nbest must be at least 1")?;
        require(
            &task,
            config.coh_nbest_discard < config.coh_nbest,
            "coh_nbest_discard must be smaller than coh_nbest",
        )?;
        args.push("--coh-vectors".to_string());
        args.push(path_arg(&paths.xvector_dir(&config.nnet_name, &config.coh_data)));
        args.push("--coh-nbest".to_string());
        args.push(config.coh_nbest.to_string());
        args.push("--coh-nbest-discard".to_string());
        args.push(config.coh_nbest_discard.to_string());
    }
    args.push("--scores".to_string());
    args.push(path_arg(&paths.score_file(
        &config.nnet_name,
        &config.be_name,
        &config.test_data,
    )));
    Ok(JobSpec {
        task,
        program: tools.resolve(SCORE_PLDA_BIN)?,
        args,
        nj: None,
        routing: Routing::Cpu,
        log_path,
        output_dir,
    })
}
