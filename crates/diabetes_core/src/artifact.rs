//! crates/diabetes_core/src/artifact.rs
//!
//! The on-disk form of a trained model, written by the trainer and read once
//! by the web service at startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::FEATURE_NAMES;
use crate::forest::{ForestError, RandomForest};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
    #[error("artifact was trained on features {found:?}, expected {expected:?}")]
    FeatureOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error(transparent)]
    Forest(#[from] ForestError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    /// Held-out accuracy measured by the trainer, if it had a test split.
    pub test_accuracy: Option<f64>,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(forest: RandomForest, test_accuracy: Option<f64>) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained_at: Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            test_accuracy,
            forest,
        }
    }

    /// Parses and validates an artifact. The feature order must match
    /// `FEATURE_NAMES` exactly; a reordered model would silently mispredict.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion(artifact.format_version));
        }
        if artifact.feature_names != FEATURE_NAMES {
            return Err(ArtifactError::FeatureOrder {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: artifact.feature_names,
            });
        }
        artifact.forest.validate()?;
        Ok(artifact)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ArtifactError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ForestParams;

    fn tiny_forest() -> RandomForest {
        let samples = vec![
            [0.0, 90.0, 70.0, 20.0, 80.0, 25.0, 0.3, 30.0],
            [0.0, 95.0, 70.0, 20.0, 80.0, 25.0, 0.3, 30.0],
            [0.0, 180.0, 70.0, 20.0, 80.0, 25.0, 0.3, 30.0],
            [0.0, 185.0, 70.0, 20.0, 80.0, 25.0, 0.3, 30.0],
        ];
        let params = ForestParams {
            n_trees: 3,
            ..ForestParams::default()
        };
        RandomForest::fit(&samples, &[0, 0, 1, 1], &params).unwrap()
    }

    #[test]
    fn written_artifacts_load_back() {
        let artifact = ModelArtifact::new(tiny_forest(), Some(0.75));
        let bytes = artifact.to_json().unwrap();
        let loaded = ModelArtifact::from_json(&bytes).unwrap();
        assert_eq!(loaded.forest, artifact.forest);
        assert_eq!(loaded.test_accuracy, Some(0.75));
    }

    #[test]
    fn rejects_reordered_features() {
        let mut artifact = ModelArtifact::new(tiny_forest(), None);
        artifact.feature_names.swap(0, 7);
        let bytes = artifact.to_json().unwrap();
        assert!(matches!(
            ModelArtifact::from_json(&bytes),
            Err(ArtifactError::FeatureOrder { .. })
        ));
    }

    #[test]
    fn rejects_unknown_versions_and_garbage() {
        let mut artifact = ModelArtifact::new(tiny_forest(), None);
        artifact.format_version = 99;
        let bytes = artifact.to_json().unwrap();
        assert!(matches!(
            ModelArtifact::from_json(&bytes),
            Err(ArtifactError::UnsupportedVersion(99))
        ));

        assert!(matches!(
            ModelArtifact::from_json(b"not json"),
            Err(ArtifactError::Json(_))
        ));
    }
}
