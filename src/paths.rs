//! Typed paths into the experiment layout.
//!
//! Every artifact lives at `<exp_root>/<kind>/<model>/<dataset>`, so a tool
//! re-run lands on exactly the same directory and overwrites it in place.
//! Centralizing path construction keeps producers and consumers agreeing on
//! that layout without passing strings around.

use std::path::{Path, PathBuf};

use crate::config::RunConfig;

/// Convenience wrapper for locating experiment artifacts.
#[derive(Debug, Clone)]
pub struct ExpPaths {
    exp_root: PathBuf,
    data_root: PathBuf,
}

impl ExpPaths {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            exp_root: config.exp_root.clone(),
            data_root: config.data_root.clone(),
        }
    }

    /// Return the data directory for a dataset, e.g. `data/train`.
    pub fn data_dir(&self, dataset: &str) -> PathBuf {
        self.data_root.join(dataset)
    }

    /// Return the trial list inside a dataset's data directory.
    pub fn trials_path(&self, dataset: &str, trials: &str) -> PathBuf {
        self.data_dir(dataset).join(trials)
    }

    /// Return the feature directory for one dataset,
    /// e.g. `exp/features/fbank80/train`.
    pub fn features_dir(&self, feat_name: &str, dataset: &str) -> PathBuf {
        self.exp_root.join("features").join(feat_name).join(dataset)
    }

    /// Return the network training directory, e.g. `exp/nnets/<nnet_name>`.
    pub fn nnet_dir(&self, nnet_name: &str) -> PathBuf {
        self.exp_root.join("nnets").join(nnet_name)
    }

    /// Return the trained model file inside the network directory.
    pub fn nnet_model_path(&self, nnet_name: &str) -> PathBuf {
        self.nnet_dir(nnet_name).join("final.nnet")
    }

    /// Return the embedding directory for one dataset,
    /// e.g. `exp/xvectors/<nnet_name>/test`.
    pub fn xvector_dir(&self, nnet_name: &str, dataset: &str) -> PathBuf {
        self.exp_root.join("xvectors").join(nnet_name).join(dataset)
    }

    /// Return the backend directory, e.g. `exp/be/<nnet_name>/<be_name>`.
    pub fn be_dir(&self, nnet_name: &str, be_name: &str) -> PathBuf {
        self.exp_root.join("be").join(nnet_name).join(be_name)
    }

    /// Return the scores directory for one test set.
    pub fn scores_dir(&self, nnet_name: &str, be_name: &str, dataset: &str) -> PathBuf {
        self.exp_root
            .join("scores")
            .join(nnet_name)
            .join(be_name)
            .join(dataset)
    }

    /// Return the score file written by the scoring tool.
    pub fn score_file(&self, nnet_name: &str, be_name: &str, dataset: &str) -> PathBuf {
        self.scores_dir(nnet_name, be_name, dataset).join("plda.scores")
    }

    /// Return the log path for a task under its output directory.
    ///
    /// Parallel tasks keep the literal `JOB` marker in the file name; the
    /// dispatch wrapper substitutes the job index per shard.
    pub fn job_log(&self, output_dir: &Path, task: &str, parallel: bool) -> PathBuf {
        let file = if parallel {
            format!("{task}.JOB.log")
        } else {
            format!("{task}.log")
        };
        output_dir.join("log").join(file)
    }
}
