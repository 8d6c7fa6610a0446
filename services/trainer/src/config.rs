//! services/trainer/src/config.rs
//!
//! Training settings, read from environment variables (and `.env` outside tests).

use diabetes_core::ForestParams;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub log_level: Level,
    pub seed: u64,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub test_ratio: f64,
}

impl TrainerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dataset_path = lookup("DATASET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("diabetes.csv"));
        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("diabetes_model.json"));

        let log_level = parse_or(&lookup, "RUST_LOG", Level::INFO)?;
        let seed = parse_or(&lookup, "TRAIN_SEED", 42u64)?;
        let n_trees = parse_or(&lookup, "TREE_COUNT", 100usize)?;
        if n_trees == 0 {
            return Err(ConfigError::InvalidValue(
                "TREE_COUNT".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let max_depth = match lookup("MAX_DEPTH") {
            None => None,
            Some(v) => Some(v.parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue("MAX_DEPTH".to_string(), format!("'{v}' is not a depth"))
            })?),
        };

        let test_ratio = parse_or(&lookup, "TEST_RATIO", 0.2f64)?;
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            return Err(ConfigError::InvalidValue(
                "TEST_RATIO".to_string(),
                format!("{test_ratio} is not between 0 and 1"),
            ));
        }

        Ok(Self {
            dataset_path,
            model_path,
            log_level,
            seed,
            n_trees,
            max_depth,
            test_ratio,
        })
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            seed: self.seed,
            ..ForestParams::default()
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), format!("'{v}' could not be parsed"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<TrainerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TrainerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.dataset_path, PathBuf::from("diabetes.csv"));
        assert_eq!(config.model_path, PathBuf::from("diabetes_model.json"));
        assert_eq!(config.seed, 42);
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.test_ratio, 0.2);
        assert_eq!(config.forest_params().min_samples_split, 2);
    }

    #[test]
    fn overrides_flow_into_forest_params() {
        let config = from_pairs(&[("TRAIN_SEED", "7"), ("TREE_COUNT", "10"), ("MAX_DEPTH", "4")]).unwrap();
        let params = config.forest_params();
        assert_eq!(params.seed, 7);
        assert_eq!(params.n_trees, 10);
        assert_eq!(params.max_depth, Some(4));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(from_pairs(&[("TREE_COUNT", "0")]).is_err());
        assert!(from_pairs(&[("TEST_RATIO", "1.5")]).is_err());
        assert!(from_pairs(&[("TRAIN_SEED", "abc")]).is_err());
        assert!(from_pairs(&[("RUST_LOG", "loud")]).is_err());
    }
}
