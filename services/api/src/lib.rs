//! services/api/src/lib.rs
//!
//! The web service for the diabetes predictor: adapters for SQLite and the
//! trained model, account handling, configuration and the HTTP layer.

pub mod accounts;
pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
