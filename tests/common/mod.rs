//! Shared helpers for driving the router in-process

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use haiku::{AppState, DocumentStore, HaikuConfig, web};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Router over a throwaway store. Keep the `TempDir` alive for the test.
pub fn test_app(config: &HaikuConfig) -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::open(dir.path()).unwrap();
    let state = AppState::from_config(config, store).unwrap();
    (dir, web::app(state))
}

/// Configuration with every provider pointed at `base_url`
pub fn config_for(base_url: &str, weather_key: Option<&str>, gemini_key: Option<&str>) -> HaikuConfig {
    let mut config = HaikuConfig::default();
    config.weather.base_url = base_url.to_string();
    config.weather.api_key = weather_key.map(str::to_string);
    config.suggestion.base_url = base_url.to_string();
    config.suggestion.api_key = gemini_key.map(str::to_string);
    config
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}
