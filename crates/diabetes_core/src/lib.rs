pub mod artifact;
pub mod dataset;
pub mod domain;
pub mod forest;
pub mod ports;
pub mod prediction;

pub use artifact::{ArtifactError, ModelArtifact};
pub use dataset::{Dataset, DatasetError};
pub use domain::{
    FeatureParseError, FeatureVector, Label, NewUser, Prediction, User, UserCredentials,
    FEATURE_COUNT, FEATURE_NAMES,
};
pub use forest::{ForestError, ForestParams, RandomForest};
pub use ports::{Classifier, PortError, PortResult, UserStore};
pub use prediction::Predictor;
