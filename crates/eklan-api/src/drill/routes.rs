use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::types::Uuid;

use super::model::{CreateDrillRequest, DrillReadResponse, DrillWriteResponse, UpdateDrillRequest};
use super::service;
use crate::{ApiState, auth::middleware::AuthUser, error::ApiError, middleware::rate_limit};

/// Create the drill routes
pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    let read_routes = Router::new()
        .route("/drills/{id}", get(get_drill))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_RATE_PER_SECOND,
            rate_limit::GENERAL_BURST_SIZE
        ));

    let write_routes = Router::new()
        .route("/drills", post(create_drill))
        .route("/drills/{id}", put(update_drill))
        .route("/drills/{id}", delete(delete_drill))
        .layer(make_rate_limit_layer!(
            rate_limit::MUTATION_RATE_PER_SECOND,
            rate_limit::MUTATION_BURST_SIZE
        ));

    Router::new().merge(read_routes).merge(write_routes)
}

async fn create_drill(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CreateDrillRequest>,
) -> Result<(StatusCode, Json<DrillWriteResponse>), ApiError> {
    let (drill, assignments_created) =
        service::create_drill(&state.pool, &auth_user, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(DrillWriteResponse {
            drill,
            assignments_created,
        }),
    ))
}

async fn update_drill(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(drill_id): Path<Uuid>,
    Json(payload): Json<UpdateDrillRequest>,
) -> Result<Json<DrillWriteResponse>, ApiError> {
    let (drill, assignments_created) =
        service::update_drill(&state.pool, &auth_user, drill_id, payload).await?;

    Ok(Json(DrillWriteResponse {
        drill,
        assignments_created,
    }))
}

async fn delete_drill(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(drill_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    service::delete_drill(&state.pool, &auth_user, drill_id).await?;

    Ok(Json(json!({
        "message": "Drill deleted successfully",
        "id": drill_id
    })))
}

#[derive(Debug, Deserialize)]
struct GetDrillQuery {
    assignment_id: Option<Uuid>,
}

async fn get_drill(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(drill_id): Path<Uuid>,
    Query(query): Query<GetDrillQuery>,
) -> Result<Json<DrillReadResponse>, ApiError> {
    let (drill, assignment) =
        service::get_drill(&state.pool, &auth_user, drill_id, query.assignment_id).await?;

    Ok(Json(DrillReadResponse { drill, assignment }))
}
