use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateThoughtRequest, Pagination, Thought};
use crate::{error::ThoughtError, state::AppState, validation::validate_message};

pub fn thought_routes() -> Router<AppState> {
    Router::new()
        .route("/thoughts", post(create_thought).get(list_thoughts))
        .route("/thoughts/:id/like", post(like_thought))
}

#[instrument(skip(state, query))]
pub async fn list_thoughts(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<Thought>>, ThoughtError> {
    let Query(p) = query?;
    let (limit, offset) = p.clamped();
    let rows = state.thoughts.list(limit, offset).await?;
    Ok(Json(rows.into_iter().map(Thought::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_thought(
    State(state): State<AppState>,
    payload: Result<Json<CreateThoughtRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Thought>), ThoughtError> {
    let Json(body) = payload?;
    let message = validate_message(&body.message).map_err(|e| {
        warn!(reason = ?e, "thought rejected");
        e
    })?;
    let row = state.thoughts.create(message).await?;
    info!(thought_id = %row.id, "thought created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, path))]
pub async fn like_thought(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Thought>, ThoughtError> {
    let Path(id) = path?;
    let row = state.thoughts.like(id).await?.ok_or(ThoughtError::NotFound)?;
    Ok(Json(row.into()))
}
