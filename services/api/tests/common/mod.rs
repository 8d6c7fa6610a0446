#![allow(dead_code)]

use api_lib::{
    adapters::{DbAdapter, ForestClassifier},
    web::{self, session::session_key, AppState, SessionSettings},
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use diabetes_core::{ForestParams, RandomForest};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions_sqlx_store::SqliteStore;

pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Measurements with a high glucose reading; the test forest calls these diabetic.
pub const HIGH_RISK: [(&str, &str); 8] = [
    ("pregnancies", "6"),
    ("glucose", "190"),
    ("blood_pressure", "72"),
    ("skin_thickness", "35"),
    ("insulin", "0"),
    ("bmi", "33.6"),
    ("dpf", "0.627"),
    ("age", "50"),
];

/// The worked example: Alice's measurements, in form order.
pub const ALICE_MEASUREMENTS: [(&str, &str); 8] = [
    ("pregnancies", "2"),
    ("glucose", "120"),
    ("blood_pressure", "70"),
    ("skin_thickness", "30"),
    ("insulin", "80"),
    ("bmi", "28.5"),
    ("dpf", "0.3"),
    ("age", "35"),
];

pub const LOW_RISK: [(&str, &str); 8] = [
    ("pregnancies", "1"),
    ("glucose", "85"),
    ("blood_pressure", "66"),
    ("skin_thickness", "29"),
    ("insulin", "0"),
    ("bmi", "26.6"),
    ("dpf", "0.351"),
    ("age", "31"),
];

/// A small forest where the outcome depends only on glucose (> 140 is diabetic).
pub fn glucose_forest() -> RandomForest {
    let mut samples = Vec::new();
    let mut labels = Vec::new();
    for i in 0..80u32 {
        let diabetic = i % 2 == 0;
        let glucose = if diabetic { 150.0 + f64::from(i) } else { 70.0 + f64::from(i % 60) };
        samples.push([
            f64::from(i % 6),
            glucose,
            60.0 + f64::from(i % 20),
            20.0 + f64::from(i % 15),
            f64::from(i % 50),
            24.0 + f64::from(i % 12),
            0.2 + f64::from(i % 7) / 10.0,
            21.0 + f64::from(i % 40),
        ]);
        labels.push(u8::from(diabetic));
    }
    let params = ForestParams {
        n_trees: 15,
        ..ForestParams::default()
    };
    RandomForest::fit(&samples, &labels, &params).expect("training failed")
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<DbAdapter>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let database_url = format!("sqlite://{}", dir.path().join("users.db").display());
        let db = Arc::new(
            DbAdapter::connect(&database_url)
                .await
                .expect("failed to open database"),
        );
        db.run_migrations().await.expect("migrations failed");

        let store = SqliteStore::new(db.pool().clone());
        store.migrate().await.expect("session migrations failed");

        let classifier = Arc::new(ForestClassifier::new(glucose_forest()));
        let state = Arc::new(AppState::new(db.clone(), classifier));
        let settings = SessionSettings {
            key: session_key(Some(TEST_SECRET)),
            secure: false,
            idle: time::Duration::minutes(60),
        };

        Self {
            router: web::app(state, store, settings),
            db,
            _dir: dir,
        }
    }

    /// A browser-like client with its own cookie jar.
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

pub struct TestClient {
    router: Router,
    pub cookie: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&mut self, handle: &str, email: &str, password: &str) -> TestResponse {
        self.post_form(
            "/register",
            &[
                ("name", "Test User"),
                ("email", email),
                ("contact", ""),
                ("user_id", handle),
                ("password", password),
            ],
        )
        .await
    }

    pub async fn login(&mut self, handle: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("user_id", handle), ("password", password)])
            .await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().expect("set-cookie was not ascii");
            let pair = value.split(';').next().unwrap_or_default().trim();
            if value.contains("Max-Age=0") || pair.ends_with('=') {
                self.cookie = None;
            } else {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).expect("response body was not utf-8"),
        }
    }
}
