//! Mapping from stages to the jobs they dispatch.

use crate::config::RunConfig;
use crate::dispatch::JobSpec;
use crate::error::PipelineError;
use crate::paths::ExpPaths;
use crate::stage::Stage;
use crate::tools::{backend, extract, features, prepare, train, ToolResolver};

/// Datasets touched by the per-dataset stages, in recipe order, deduped.
/// The cohort set rides along only when score normalization is on.
pub(crate) fn recipe_datasets(config: &RunConfig) -> Vec<&str> {
    let mut names = vec![config.train_data.as_str()];
    for name in [&config.enroll_data, &config.test_data] {
        if !names.contains(&name.as_str()) {
            names.push(name);
        }
    }
    if config.snorm && !names.contains(&config.coh_data.as_str()) {
        names.push(&config.coh_data);
    }
    names
}

/// Build every job one stage dispatches, in dispatch order.
pub(crate) fn stage_jobs(
    stage: Stage,
    config: &RunConfig,
    paths: &ExpPaths,
    tools: &ToolResolver,
) -> Result<Vec<JobSpec>, PipelineError> {
    match stage {
        Stage::Prepare => recipe_datasets(config)
            .into_iter()
            .map(|dataset| prepare::prep_dataset_job(config, paths, tools, dataset))
            .collect(),
        Stage::Features => recipe_datasets(config)
            .into_iter()
            .map(|dataset| features::make_fbank_job(config, paths, tools, dataset))
            .collect(),
        Stage::TrainNnet => Ok(vec![train::train_xvector_job(config, paths, tools)?]),
        Stage::Extract => recipe_datasets(config)
            .into_iter()
            .map(|dataset| extract::extract_xvectors_job(config, paths, tools, dataset))
            .collect(),
        Stage::TrainBackend => Ok(vec![backend::train_backend_job(config, paths, tools)?]),
        Stage::Score => Ok(vec![backend::score_plda_job(config, paths, tools)?]),
    }
}
