//! services/api/src/adapters/model.rs
//!
//! The classifier adapter: loads the trained forest artifact from disk once and
//! implements the `Classifier` port on top of it.

use diabetes_core::artifact::ModelArtifact;
use diabetes_core::domain::FeatureVector;
use diabetes_core::forest::RandomForest;
use diabetes_core::ports::{Classifier, PortError, PortResult};
use std::path::Path;
use tracing::info;

use crate::error::ApiError;

/// A read-only random forest, safe to share across requests.
pub struct ForestClassifier {
    forest: RandomForest,
}

impl ForestClassifier {
    pub fn new(forest: RandomForest) -> Self {
        Self { forest }
    }

    /// Reads and validates the artifact written by the trainer.
    pub async fn load(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let artifact = ModelArtifact::from_json(&bytes)?;
        info!(
            path = %path.display(),
            trees = artifact.forest.trees().len(),
            trained_at = %artifact.trained_at,
            test_accuracy = ?artifact.test_accuracy,
            "Model artifact loaded"
        );
        Ok(Self::new(artifact.forest))
    }
}

impl Classifier for ForestClassifier {
    fn class_probabilities(&self, features: &FeatureVector) -> PortResult<[f64; 2]> {
        self.forest
            .predict_proba(features.values())
            .ok_or_else(|| PortError::Unexpected("classifier walked off a malformed tree".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diabetes_core::forest::ForestParams;
    use std::io::Write;

    fn forest() -> RandomForest {
        let samples = vec![
            [1.0, 85.0, 66.0, 29.0, 0.0, 26.6, 0.35, 31.0],
            [1.0, 89.0, 66.0, 23.0, 94.0, 28.1, 0.17, 21.0],
            [6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.63, 50.0],
            [8.0, 183.0, 64.0, 0.0, 0.0, 23.3, 0.67, 32.0],
        ];
        let params = ForestParams {
            n_trees: 5,
            ..ForestParams::default()
        };
        RandomForest::fit(&samples, &[0, 0, 1, 1], &params).unwrap()
    }

    #[tokio::test]
    async fn loads_a_trainer_artifact() {
        let forest = forest();
        let bytes = ModelArtifact::new(forest.clone(), None).to_json().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        let classifier = ForestClassifier::load(file.path()).await.unwrap();
        let features = FeatureVector::new([6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.63, 50.0]).unwrap();
        let [p0, p1] = classifier.class_probabilities(&features).unwrap();
        assert_eq!(Some([p0, p1]), forest.predict_proba(features.values()));
    }

    #[tokio::test]
    async fn missing_or_corrupt_files_are_errors() {
        let missing = ForestClassifier::load(Path::new("/definitely/not/here.json")).await;
        assert!(matches!(missing, Err(ApiError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"format_version\": 1}").unwrap();
        let corrupt = ForestClassifier::load(file.path()).await;
        assert!(matches!(corrupt, Err(ApiError::Artifact(_))));
    }
}
