//! Corpus preparation: `prep-dataset`.

use super::{path_arg, validate_dataset_name, ToolResolver};
use crate::config::RunConfig;
use crate::dispatch::{JobSpec, Routing};
use crate::error::PipelineError;
use crate::paths::ExpPaths;

pub(crate) const PREP_DATASET_BIN: &str = "prep-dataset";

/// Build the job that turns one raw corpus subset into a data directory.
pub(crate) fn prep_dataset_job(
    config: &RunConfig,
    paths: &ExpPaths,
    tools: &ToolResolver,
    dataset: &str,
) -> Result<JobSpec, PipelineError> {
    let task = format!("prepare.{dataset}");
    validate_dataset_name(&task, dataset)?;

    let output_dir = paths.data_dir(dataset);
    let log_path = paths.job_log(&output_dir, "prepare", false);
    let args = vec![
        "--corpus".to_string(),
        path_arg(&config.corpus_root.join(dataset)),
        "--out".to_string(),
        path_arg(&output_dir),
    ];
    Ok(JobSpec {
        task,
        program: tools.resolve(PREP_DATASET_BIN)?,
        args,
        nj: None,
        routing: Routing::Cpu,
        log_path,
        output_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_with_env, EnvOverlay};

    #[test]
    fn args_point_at_corpus_subset_and_data_dir() {
        let config = resolve_with_env(&EnvOverlay::empty(), None, &[]).unwrap();
        let paths = ExpPaths::new(&config);
        let tools = ToolResolver::lenient(&config);
        let job = prep_dataset_job(&config, &paths, &tools, "train").unwrap();

        assert_eq!(job.task, "prepare.train");
        assert_eq!(job.args, vec!["--corpus", "corpus/train", "--out", "data/train"]);
        assert_eq!(job.nj, None);
        assert_eq!(job.routing, Routing::Cpu);
        assert_eq!(
            job.log_path,
            std::path::PathBuf::from("data/train/log/prepare.log")
        );
    }

    #[test]
    fn bad_dataset_names_never_reach_dispatch() {
        let config = resolve_with_env(&EnvOverlay::empty(), None, &[]).unwrap();
        let paths = ExpPaths::new(&config);
        let tools = ToolResolver::lenient(&config);
        let err = prep_dataset_job(&config, &paths, &tools, "../etc").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidJob { .. }));
    }
}
