//! crates/diabetes_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of clinical measurements the classifier consumes.
pub const FEATURE_COUNT: usize = 8;

/// Feature names in the exact order the classifier was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

//=========================================================================================
// Users
//=========================================================================================

// Represents a registered user - safe to pass around the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub contact: Option<String>,
    pub handle: String,
}

/// A validated registration, ready to be persisted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub contact: Option<String>,
    pub handle: String,
    pub password_hash: String,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub handle: String,
    pub password_hash: String,
}

//=========================================================================================
// Prediction
//=========================================================================================

/// The ordered 8-number input to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Builds a vector, rejecting NaN and infinite values.
    pub fn new(values: [f64; FEATURE_COUNT]) -> Result<Self, FeatureParseError> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(FeatureParseError::NotFinite {
                field: FEATURE_NAMES[index],
            });
        }
        Ok(Self(values))
    }

    /// Parses raw form values given in feature order. `None` means the field was absent.
    pub fn parse(raw: [Option<&str>; FEATURE_COUNT]) -> Result<Self, FeatureParseError> {
        let mut values = [0.0; FEATURE_COUNT];
        for (index, (slot, input)) in values.iter_mut().zip(raw).enumerate() {
            let field = FEATURE_NAMES[index];
            let text = input
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(FeatureParseError::Missing { field })?;
            *slot = text.parse::<f64>().map_err(|_| FeatureParseError::NotANumber {
                field,
                value: text.to_string(),
            })?;
        }
        Self::new(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureParseError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

impl FeatureParseError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::NotANumber { field, .. } | Self::NotFinite { field } => {
                field
            }
        }
    }
}

/// Outcome class of a prediction. Class index 1 of the classifier is `Diabetic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Diabetic,
    NotDiabetic,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Diabetic => f.write_str("Diabetic"),
            Label::NotDiabetic => f.write_str("Not Diabetic"),
        }
    }
}

/// A finished prediction, as shown on the result page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub p_diabetic: f64,
    pub p_not_diabetic: f64,
}
