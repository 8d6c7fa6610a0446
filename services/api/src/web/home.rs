//! services/api/src/web/home.rs

use axum::response::Html;

use crate::error::ApiError;
use crate::web::pages;
use crate::web::session::SessionContext;

/// GET / - Landing page, with a personalised greeting when logged in.
pub async fn home_handler(session: SessionContext) -> Result<Html<String>, ApiError> {
    let user = session.current_user().await?;
    let flashes = session.take_flashes().await?;
    Ok(Html(pages::home_page(user.as_deref(), &flashes)))
}
