//! crates/diabetes_core/src/prediction.rs
//!
//! The prediction component: turns a feature vector into a labelled,
//! rounded probability pair using whichever classifier it was built with.

use std::sync::Arc;

use crate::domain::{FeatureVector, Label, Prediction};
use crate::ports::{Classifier, PortResult};

/// Shared, read-only handle to the loaded classifier.
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn predict(&self, features: &FeatureVector) -> PortResult<Prediction> {
        let [_, p_class_one] = self.classifier.class_probabilities(features)?;

        // The label is derived from the rounded value so the two always agree on screen.
        let p_diabetic = round2(p_class_one.clamp(0.0, 1.0));
        let p_not_diabetic = round2(1.0 - p_diabetic);
        let label = if p_diabetic >= 0.5 {
            Label::Diabetic
        } else {
            Label::NotDiabetic
        };

        Ok(Prediction {
            label,
            p_diabetic,
            p_not_diabetic,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{ForestParams, RandomForest};
    use crate::ports::PortError;

    struct Fixed([f64; 2]);

    impl Classifier for Fixed {
        fn class_probabilities(&self, _features: &FeatureVector) -> PortResult<[f64; 2]> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn class_probabilities(&self, _features: &FeatureVector) -> PortResult<[f64; 2]> {
            Err(PortError::Unexpected("boom".into()))
        }
    }

    fn features() -> FeatureVector {
        FeatureVector::new([2.0, 120.0, 70.0, 30.0, 80.0, 28.5, 0.3, 35.0]).unwrap()
    }

    fn predict_with(probs: [f64; 2]) -> Prediction {
        Predictor::new(Arc::new(Fixed(probs)))
            .predict(&features())
            .unwrap()
    }

    #[test]
    fn rounds_to_two_decimals_and_sums_to_one() {
        let p = predict_with([0.3333, 0.6667]);
        assert_eq!(p.p_diabetic, 0.67);
        assert_eq!(p.p_not_diabetic, 0.33);
        assert_eq!(p.label, Label::Diabetic);
        assert!((p.p_diabetic + p.p_not_diabetic - 1.0).abs() < 1e-9);
    }

    #[test]
    fn label_follows_rounded_probability() {
        // 0.497 rounds up to 0.50, which is on the diabetic side of the threshold.
        let p = predict_with([0.503, 0.497]);
        assert_eq!(p.p_diabetic, 0.5);
        assert_eq!(p.label, Label::Diabetic);

        let p = predict_with([0.51, 0.49]);
        assert_eq!(p.label, Label::NotDiabetic);
        assert_eq!(p.p_not_diabetic, 0.51);
    }

    /// Routes the port through a real trained forest.
    struct ForestBacked(RandomForest);

    impl Classifier for ForestBacked {
        fn class_probabilities(&self, features: &FeatureVector) -> PortResult<[f64; 2]> {
            self.0
                .predict_proba(features.values())
                .ok_or_else(|| PortError::Unexpected("malformed tree".into()))
        }
    }

    #[test]
    fn identical_inputs_give_identical_predictions() {
        let samples: Vec<_> = (0..40)
            .map(|i| {
                let glucose = if i % 2 == 0 { 160.0 + i as f64 } else { 80.0 + i as f64 };
                [(i % 5) as f64, glucose, 70.0, 30.0, 80.0, 28.5, 0.3, 20.0 + i as f64]
            })
            .collect();
        let labels: Vec<u8> = (0..40).map(|i| u8::from(i % 2 == 0)).collect();
        let params = ForestParams {
            n_trees: 20,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(&samples, &labels, &params).unwrap();
        let predictor = Predictor::new(Arc::new(ForestBacked(forest)));

        let first = predictor.predict(&features()).unwrap();
        for _ in 0..5 {
            assert_eq!(predictor.predict(&features()).unwrap(), first);
        }
        // A clone shares the same classifier.
        assert_eq!(predictor.clone().predict(&features()).unwrap(), first);
        assert!((first.p_diabetic + first.p_not_diabetic - 1.0).abs() < 1e-9);
    }

    #[test]
    fn classifier_errors_propagate() {
        let err = Predictor::new(Arc::new(Broken)).predict(&features()).unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
