// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the trained network and the run settings.
//
// Files written to the output directory:
//   dense_network.mpk.gz — network weights (named MessagePack,
//                          gzipped, half precision)
//   run_config.json      — every setting of the run, including
//                          the layer sizes needed to rebuild the
//                          network before loading its weights
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{HalfPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::run_use_case::RunConfig;
use crate::ml::model::DenseNet;

const MODEL_STEM:  &str = "dense_network";
const CONFIG_FILE: &str = "run_config.json";

type WeightsRecorder = NamedMpkGzFileRecorder<HalfPrecisionSettings>;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates `dir` (and parents) if it does not exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the weights to `{dir}/dense_network.mpk.gz` and return that path.
    pub fn save_model<B: Backend>(&self, model: &DenseNet<B>) -> Result<PathBuf> {
        // the recorder appends its own extension
        let stem = self.dir.join(MODEL_STEM);

        WeightsRecorder::new()
            .record(model.clone().into_record(), stem.clone())
            .with_context(|| format!("Failed to save network to '{}'", stem.display()))?;

        let path = stem.with_extension("mpk.gz");
        tracing::debug!("Saved network weights to '{}'", path.display());
        Ok(path)
    }

    /// Load saved weights into `model`, which must have the same layer sizes.
    /// No command reloads a network; this reads back what `run` wrote.
    pub fn load_model<B: Backend>(&self, model: DenseNet<B>, device: &B::Device) -> Result<DenseNet<B>> {
        let stem = self.dir.join(MODEL_STEM);

        let record = WeightsRecorder::new()
            .load(stem.clone(), device)
            .with_context(|| {
                format!("Cannot load network weights '{}'. Has `run` been executed?", stem.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &RunConfig) -> Result<PathBuf> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(path)
    }

    pub fn load_config(&self) -> Result<RunConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }
}
