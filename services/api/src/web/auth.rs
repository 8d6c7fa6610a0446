//! services/api/src/web/auth.rs
//!
//! Registration, login and logout. Every POST ends in a redirect, with the
//! outcome carried to the next page as a flash message.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::accounts::{AccountError, Registration};
use crate::error::ApiError;
use crate::web::pages;
use crate::web::session::{FlashLevel, SessionContext};
use crate::web::state::AppState;

//=========================================================================================
// Form Types
//=========================================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub user_id: String,
    pub password: String,
}

impl From<RegisterForm> for Registration {
    fn from(form: RegisterForm) -> Self {
        Registration {
            name: form.name,
            email: form.email,
            contact: Some(form.contact),
            handle: form.user_id,
            password: form.password,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub user_id: String,
    pub password: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /register
pub async fn register_page(session: SessionContext) -> Result<Html<String>, ApiError> {
    let flashes = session.take_flashes().await?;
    Ok(Html(pages::register_page(&flashes)))
}

/// POST /register - Create a new account
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    match state.accounts.register(form.into()).await {
        Ok(user) => {
            info!(user_id = user.id, handle = %user.handle, "User registered");
            session
                .flash(FlashLevel::Success, "Registration Successful! Please Login.")
                .await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(AccountError::Validation(field)) => {
            debug!(field, "Registration rejected: missing field");
            session
                .flash(FlashLevel::Danger, "All required fields must be filled!")
                .await?;
            Ok(Redirect::to("/register").into_response())
        }
        Err(AccountError::DuplicateIdentity) => {
            debug!("Registration rejected: duplicate email or user ID");
            session
                .flash(FlashLevel::Danger, "User ID or Email already exists!")
                .await?;
            Ok(Redirect::to("/register").into_response())
        }
        Err(e) => {
            error!("Registration failed: {}", e);
            session
                .flash(FlashLevel::Danger, "Registration failed. Please try again.")
                .await?;
            Ok(Redirect::to("/register").into_response())
        }
    }
}

/// GET /login
pub async fn login_page(session: SessionContext) -> Result<Html<String>, ApiError> {
    let flashes = session.take_flashes().await?;
    Ok(Html(pages::login_page(&flashes)))
}

/// POST /login - Authenticate and start a logged-in session
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    match state.accounts.login(&form.user_id, &form.password).await {
        Ok(credentials) => {
            session.sign_in(&credentials.handle).await?;
            info!(user_id = credentials.id, handle = %credentials.handle, "User logged in");
            session
                .flash(FlashLevel::Success, "Login Successful!")
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ (AccountError::UnknownHandle(_) | AccountError::WrongPassword)) => {
            // Same message for both so handles cannot be probed.
            debug!("Login rejected: {}", e);
            session
                .flash(FlashLevel::Danger, "Invalid user ID or password.")
                .await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => {
            error!("Login failed: {}", e);
            session
                .flash(FlashLevel::Danger, "Invalid user ID or password.")
                .await?;
            Ok(Redirect::to("/login").into_response())
        }
    }
}

/// GET /logout - Clear the whole session
pub async fn logout_handler(session: SessionContext) -> Result<Response, ApiError> {
    if let Some(handle) = session.current_user().await? {
        info!(handle = %handle, "User logged out");
    }
    session.clear().await?;
    session
        .flash(FlashLevel::Info, "You have been logged out.")
        .await?;
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_form_maps_user_id_to_handle() {
        let registration: Registration = RegisterForm {
            name: "Alice".into(),
            email: "a@x.com".into(),
            contact: String::new(),
            user_id: "alice1".into(),
            password: "p@ss".into(),
        }
        .into();
        assert_eq!(registration.handle, "alice1");
        assert_eq!(registration.contact.as_deref(), Some(""));
    }
}
