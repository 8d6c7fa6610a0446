//! services/api/src/web/predict.rs
//!
//! The prediction form and the result page. Both sit behind `require_auth`.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use diabetes_core::{FeatureParseError, FeatureVector};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::web::pages;
use crate::web::session::{CurrentUser, FlashLevel, SessionContext};
use crate::web::state::AppState;

/// Submitted measurements. Fields stay raw strings until parsed in feature order.
#[derive(Debug, Default, Deserialize)]
pub struct PredictionForm {
    pub pregnancies: Option<String>,
    pub glucose: Option<String>,
    pub blood_pressure: Option<String>,
    pub skin_thickness: Option<String>,
    pub insulin: Option<String>,
    pub bmi: Option<String>,
    pub dpf: Option<String>,
    pub age: Option<String>,
}

impl PredictionForm {
    pub fn features(&self) -> Result<FeatureVector, FeatureParseError> {
        FeatureVector::parse([
            self.pregnancies.as_deref(),
            self.glucose.as_deref(),
            self.blood_pressure.as_deref(),
            self.skin_thickness.as_deref(),
            self.insulin.as_deref(),
            self.bmi.as_deref(),
            self.dpf.as_deref(),
            self.age.as_deref(),
        ])
    }
}

/// GET /predict
pub async fn predict_page(
    Extension(CurrentUser(handle)): Extension<CurrentUser>,
    session: SessionContext,
) -> Result<Html<String>, ApiError> {
    let flashes = session.take_flashes().await?;
    Ok(Html(pages::predict_page(&handle, &flashes)))
}

/// POST /predict - Run the classifier and hand the outcome to /result
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(handle)): Extension<CurrentUser>,
    session: SessionContext,
    Form(form): Form<PredictionForm>,
) -> Result<Response, ApiError> {
    let features = match form.features() {
        Ok(features) => features,
        Err(e) => {
            debug!(field = e.field(), "Prediction input rejected: {}", e);
            session
                .flash(FlashLevel::Danger, format!("Invalid input: {e}."))
                .await?;
            return Ok(Redirect::to("/predict").into_response());
        }
    };

    let prediction = match state.predictor.predict(&features) {
        Ok(prediction) => prediction,
        Err(e) => {
            error!("Prediction failed: {}", e);
            session
                .flash(FlashLevel::Danger, "Prediction failed. Please try again.")
                .await?;
            return Ok(Redirect::to("/predict").into_response());
        }
    };

    info!(handle = %handle, label = %prediction.label, p_diabetic = prediction.p_diabetic, "Prediction made");
    session.store_prediction(&prediction).await?;
    Ok(Redirect::to("/result").into_response())
}

/// GET /result - Show, and consume, the pending prediction
pub async fn result_handler(
    Extension(CurrentUser(handle)): Extension<CurrentUser>,
    session: SessionContext,
) -> Result<Response, ApiError> {
    let Some(prediction) = session.take_prediction().await? else {
        session
            .flash(
                FlashLevel::Warning,
                "No prediction found. Please make a prediction first.",
            )
            .await?;
        return Ok(Redirect::to("/predict").into_response());
    };

    let flashes = session.take_flashes().await?;
    Ok(Html(pages::result_page(&handle, &prediction, &flashes)).into_response())
}
