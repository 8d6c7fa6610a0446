//! services/trainer/src/lib.rs
//!
//! Offline training: read the labelled CSV, hold out a test split, grow the
//! forest and write the model artifact the web service loads at startup.

pub mod config;

use diabetes_core::{ArtifactError, Dataset, DatasetError, ForestError, ModelArtifact, RandomForest};
use std::path::Path;
use tracing::info;

use crate::config::{ConfigError, TrainerConfig};

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("Training error: {0}")]
    Forest(#[from] ForestError),
    #[error("Model artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// What a training run produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_accuracy: f64,
}

/// Trains on an in-memory dataset. The forest is grown on the training split
/// only and scored on the held-out rows.
pub fn train(dataset: &Dataset, config: &TrainerConfig) -> Result<(ModelArtifact, TrainingReport), TrainError> {
    let (train, test) = dataset.train_test_split(config.test_ratio, config.seed)?;
    info!(train_rows = train.len(), test_rows = test.len(), "Dataset split");

    let forest = RandomForest::fit(&train.samples, &train.labels, &config.forest_params())?;
    let test_accuracy = forest.accuracy(&test.samples, &test.labels);
    info!(trees = forest.trees().len(), "Forest trained");
    info!("Test accuracy: {:.4}", test_accuracy);

    let report = TrainingReport {
        train_rows: train.len(),
        test_rows: test.len(),
        test_accuracy,
    };
    Ok((ModelArtifact::new(forest, Some(test_accuracy)), report))
}

/// Reads `config.dataset_path`, trains and writes the artifact to `config.model_path`.
pub async fn run(config: &TrainerConfig) -> Result<TrainingReport, TrainError> {
    info!(path = %config.dataset_path.display(), "Reading dataset");
    let text = tokio::fs::read_to_string(&config.dataset_path).await?;
    let dataset = Dataset::from_csv(&text)?;
    info!(rows = dataset.len(), "Dataset loaded");

    let (artifact, report) = train(&dataset, config)?;
    write_artifact(&artifact, &config.model_path).await?;
    info!(path = %config.model_path.display(), "Model saved");
    Ok(report)
}

async fn write_artifact(artifact: &ModelArtifact, path: &Path) -> Result<(), TrainError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, artifact.to_json()?).await?;
    Ok(())
}
