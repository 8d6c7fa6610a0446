//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::error::ApiError;
use crate::web::session::{CurrentUser, FlashLevel, SessionContext};

/// Middleware that checks the session for a logged-in handle.
///
/// If present, inserts a `CurrentUser` into request extensions for handlers to use.
/// If missing, flashes a notice and redirects to the login page.
pub async fn require_auth(
    session: SessionContext,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(handle) = session.current_user().await? else {
        debug!(path = %req.uri().path(), "Anonymous request redirected to login");
        session
            .flash(FlashLevel::Info, "Please login to access this page.")
            .await?;
        return Ok(Redirect::to("/login").into_response());
    };

    req.extensions_mut().insert(CurrentUser(handle));
    Ok(next.run(req).await)
}
