//! services/api/src/web/state.rs
//!
//! Defines the application's shared state, created once at startup and
//! handed to every request handler.

use diabetes_core::ports::{Classifier, UserStore};
use diabetes_core::Predictor;
use std::sync::Arc;

use crate::accounts::AccountService;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state. Per-browser state lives in the session instead.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub predictor: Predictor,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            accounts: AccountService::new(users),
            predictor: Predictor::new(classifier),
        }
    }
}
