//! services/api/src/web/mod.rs
//!
//! The HTTP surface: handlers, the session layer and the router that ties them together.

pub mod auth;
pub mod home;
pub mod middleware;
pub mod pages;
pub mod predict;
pub mod session;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{
    cookie::{Key, SameSite},
    Expiry, SessionManagerLayer, SessionStore,
};

pub use middleware::require_auth;
pub use state::AppState;

/// Cookie and lifetime settings for the session layer.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub secure: bool,
    pub idle: time::Duration,
}

/// Builds the complete application router.
pub fn app<S>(state: Arc<AppState>, store: S, settings: SessionSettings) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(settings.secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(settings.idle))
        .with_signed(settings.key);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(home::home_handler))
        .route(
            "/register",
            get(auth::register_page).post(auth::register_handler),
        )
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/logout", get(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/predict",
            get(predict::predict_page).post(predict::predict_handler),
        )
        .route("/result", get(predict::result_handler))
        .route_layer(axum_middleware::from_fn(require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
