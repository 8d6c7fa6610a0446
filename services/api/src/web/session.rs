//! services/api/src/web/session.rs
//!
//! The per-browser context. Wraps the server-held `tower_sessions::Session` with
//! typed accessors so handlers never touch raw session keys.

use axum::{extract::FromRequestParts, http::request::Parts};
use diabetes_core::Prediction;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use tower_sessions::{cookie::Key, session, Session};

const USER_KEY: &str = "user_id";
const PREDICTION_KEY: &str = "prediction";
const FLASH_KEY: &str = "_flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashLevel {
    Success,
    Danger,
    Warning,
    Info,
}

impl FlashLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
            FlashLevel::Warning => "warning",
            FlashLevel::Info => "info",
        }
    }
}

/// A one-time notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// The logged-in handle, placed in request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

pub struct SessionContext(Session);

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}

impl SessionContext {
    pub async fn current_user(&self) -> Result<Option<String>, session::Error> {
        self.0.get(USER_KEY).await
    }

    /// Marks the session as authenticated. The id is cycled first so a session
    /// id handed out before login is worthless afterwards.
    pub async fn sign_in(&self, handle: &str) -> Result<(), session::Error> {
        self.0.cycle_id().await?;
        self.0.insert(USER_KEY, handle).await
    }

    /// Overwrites any earlier pending prediction.
    pub async fn store_prediction(&self, prediction: &Prediction) -> Result<(), session::Error> {
        self.0.insert(PREDICTION_KEY, prediction).await
    }

    /// Removes and returns the pending prediction.
    pub async fn take_prediction(&self) -> Result<Option<Prediction>, session::Error> {
        self.0.remove(PREDICTION_KEY).await
    }

    pub async fn flash(
        &self,
        level: FlashLevel,
        message: impl Into<String>,
    ) -> Result<(), session::Error> {
        let mut flashes: Vec<Flash> = self.0.get(FLASH_KEY).await?.unwrap_or_default();
        flashes.push(Flash {
            level,
            message: message.into(),
        });
        self.0.insert(FLASH_KEY, flashes).await
    }

    pub async fn take_flashes(&self) -> Result<Vec<Flash>, session::Error> {
        Ok(self.0.remove(FLASH_KEY).await?.unwrap_or_default())
    }

    /// Drops everything, including the stored session record.
    pub async fn clear(&self) -> Result<(), session::Error> {
        self.0.flush().await
    }
}

/// The cookie-signing key. A configured secret is stretched to 64 bytes with
/// SHA-512; without one, a random key is drawn for this process only.
pub fn session_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => {
            let mut bytes = [0u8; 64];
            OsRng.fill_bytes(&mut bytes);
            Key::from(&bytes)
        }
    }
}
