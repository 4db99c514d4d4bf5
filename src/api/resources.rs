//! CRUD handlers shared by every [`Resource`]

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, put},
};

use super::AppState;
use crate::resource::{Deleted, Resource, ResourceStore, Stored};
use crate::{HaikuError, Result};

/// `GET/POST {PATH}` and `PUT/DELETE {PATH}/{id}` for resource `R`
pub fn router<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(R::PATH, get(list::<R>).post(create::<R>))
        .route(&format!("{}/{{id}}", R::PATH), put(replace::<R>).delete(delete::<R>))
}

/// Body extraction failures become validation errors (422).
fn body<R>(payload: std::result::Result<Json<R>, JsonRejection>) -> Result<R> {
    payload
        .map(|Json(doc)| doc)
        .map_err(|rejection| HaikuError::validation(rejection.body_text()))
}

async fn list<R: Resource>(State(state): State<AppState>) -> Result<Json<Vec<Stored<R>>>> {
    let docs = ResourceStore::<R>::new(&state.store)?.list().await?;
    Ok(Json(docs))
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    payload: std::result::Result<Json<R>, JsonRejection>,
) -> Result<Json<Stored<R>>> {
    let doc = body(payload)?;
    let stored = ResourceStore::<R>::new(&state.store)?.create(doc).await?;
    Ok(Json(stored))
}

async fn replace<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<R>, JsonRejection>,
) -> Result<Json<Stored<R>>> {
    let doc = body(payload)?;
    let stored = ResourceStore::<R>::new(&state.store)?
        .replace(&id, doc)
        .await?;
    Ok(Json(stored))
}

async fn delete<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let deleted = ResourceStore::<R>::new(&state.store)?.delete(&id).await?;
    Ok(Json(deleted))
}
