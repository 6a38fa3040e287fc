//! The HTTP surface: thin handlers over the room service.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};

use crate::room::snapshot::RoomSnapshot;
use crate::room::RoomService;

use super::dto::*;
use super::error::ApiError;
use super::logging;
use super::sse;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RoomService>,
}

pub fn router(service: Arc<RoomService>) -> Router {
    Router::new()
        .route("/api/create", post(create))
        .route("/api/join", post(join))
        .route("/api/leave", post(leave))
        .route("/api/room/:code", get(room))
        .route("/api/options", post(options))
        .route("/api/start", post(start))
        .route("/api/action", post(action))
        .route("/api/playAgain", post(play_again))
        .route("/api/events/:code/:pid", get(sse::events))
        .layer(middleware::from_fn(logging::log_requests))
        .with_state(AppState { service })
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<CreateResponse>, ApiError> {
    let (code, pid) = state
        .service
        .create_room(req.name, req.pid, req.ai_count)
        .await?;
    Ok(Json(CreateResponse { code, pid }))
}

async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<CreateResponse>, ApiError> {
    let (code, pid) = state
        .service
        .join_room(&req.code, req.pid, req.name)
        .await?;
    Ok(Json(CreateResponse { code, pid }))
}

async fn leave(
    State(state): State<AppState>,
    Json(req): Json<LeaveRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    state.service.leave_room(&req.code, &req.pid).await?;
    Ok(Json(OkResponse::new()))
}

async fn room(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<RoomSnapshot>, ApiError> {
    let snapshot = state
        .service
        .room_snapshot(&code, query.pid.as_deref())
        .await?;
    Ok(Json(snapshot))
}

async fn options(
    State(state): State<AppState>,
    Json(req): Json<OptionsRequest>,
) -> Result<Json<OptionsResponse>, ApiError> {
    let options = state
        .service
        .set_options(&req.code, &req.pid, req.slamdowns_allowed)
        .await?;
    Ok(Json(OptionsResponse { ok: true, options }))
}

async fn start(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    state
        .service
        .start(&req.code, &req.pid, req.slamdowns_allowed)
        .await?;
    Ok(Json(OkResponse::new()))
}

async fn action(
    State(state): State<AppState>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let code = req.code.clone();
    let pid = req.pid.clone();
    let kind = req.into_kind()?;
    state.service.action(&code, &pid, kind).await?;
    Ok(Json(OkResponse::new()))
}

async fn play_again(
    State(state): State<AppState>,
    Json(req): Json<PlayAgainRequest>,
) -> Result<Json<PlayAgainResponse>, ApiError> {
    let next_room = state.service.play_again(&req.code, &req.pid).await?;
    Ok(Json(PlayAgainResponse { next_room }))
}
