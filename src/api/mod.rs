//! HTTP interface.
//!
//! Thin axum handlers over [`crate::core`]. Every route lives under `/api`; errors are
//! turned into `{"error": ...}` bodies by [`error`].

pub mod analytics;
pub mod catalog;
pub mod error;
pub mod orders;

use crate::config::settings::Settings;
use axum::{
    Router,
    extract::rejection::{JsonRejection, QueryRejection},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::errors::Error;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub database: DatabaseConnection,
    /// Loaded settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Bundles a connection and settings into handler state.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self {
            database,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(orders::router())
        .merge(analytics::router())
        .merge(catalog::router())
        // CORS - the storefront is served from another origin
        .layer(CorsLayer::permissive())
        // Request spans
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(format!("Malformed request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(format!("Malformed query string: {}", rejection.body_text()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Router over the given database with default settings.
    pub fn test_app(db: DatabaseConnection) -> Router {
        router(AppState::new(db, Settings::default()))
    }

    /// Sends one request and returns the status, headers and raw body.
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }

    /// Like [`send`], decoding the body as JSON.
    pub async fn send_json(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let (status, _, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
