//! crates/diabetes_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific implementations like the database or the model format.

use async_trait::async_trait;

use crate::domain::{FeatureVector, NewUser, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflicts with an existing item: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The credential store. Uniqueness of email and handle is the store's job.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with `PortError::Conflict` if the email or handle is taken.
    async fn create_user(&self, new_user: &NewUser) -> PortResult<User>;

    async fn get_user_by_handle(&self, handle: &str) -> PortResult<UserCredentials>;

    async fn count_users(&self) -> PortResult<i64>;
}

/// A trained binary classifier.
pub trait Classifier: Send + Sync {
    /// Returns `[p(class 0), p(class 1)]` for a single feature vector.
    fn class_probabilities(&self, features: &FeatureVector) -> PortResult<[f64; 2]>;
}
