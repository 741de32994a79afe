//! Pipeline stages and the stage gate.
//!
//! Stages run in a fixed order. The runner never tracks completion state on
//! disk; resumption is the operator re-invoking with `--stage N`, which skips
//! every earlier stage and re-runs everything from N on. Re-running a stage
//! overwrites its outputs in place, so skipping forward is the only state
//! the gate needs.

use std::fmt;

/// One block of the recipe, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    Features,
    TrainNnet,
    Extract,
    TrainBackend,
    Score,
}

/// Canonical execution order. `run` and `plan` both walk this array.
pub const STAGES: [Stage; 6] = [
    Stage::Prepare,
    Stage::Features,
    Stage::TrainNnet,
    Stage::Extract,
    Stage::TrainBackend,
    Stage::Score,
];

impl Stage {
    /// 1-based stage number used by the `--stage` gate.
    pub fn index(self) -> u32 {
        match self {
            Stage::Prepare => 1,
            Stage::Features => 2,
            Stage::TrainNnet => 3,
            Stage::Extract => 4,
            Stage::TrainBackend => 5,
            Stage::Score => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Prepare => "prepare",
            Stage::Features => "features",
            Stage::TrainNnet => "train-nnet",
            Stage::Extract => "extract",
            Stage::TrainBackend => "train-backend",
            Stage::Score => "score",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Stage::Prepare => "build data directories from the raw corpus",
            Stage::Features => "compute filterbank features for every dataset",
            Stage::TrainNnet => "train the x-vector embedding network",
            Stage::Extract => "extract x-vectors for every dataset",
            Stage::TrainBackend => "train the LDA/PLDA scoring backend",
            Stage::Score => "score enrollment against test trials",
        }
    }

    /// What re-running the stage costs, shown by `xvrun stages`.
    pub fn resume_note(self) -> &'static str {
        match self {
            Stage::Prepare => "cheap; rebuilds data directories in place",
            Stage::Features => "recomputes features for all datasets",
            Stage::TrainNnet => "expensive; restarts network training from scratch",
            Stage::Extract => "re-extracts embeddings with the current network",
            Stage::TrainBackend => "cheap; refits the backend on current embeddings",
            Stage::Score => "cheap; rescores the current trial list",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The single gate value set once at startup from `--stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageCounter(u32);

impl StageCounter {
    pub fn new(start: u32) -> Self {
        StageCounter(start)
    }

    pub fn start(self) -> u32 {
        self.0
    }

    /// A stage runs exactly when the counter is at or below its number.
    pub fn should_run(self, stage: Stage) -> bool {
        self.0 <= stage.index()
    }
}
