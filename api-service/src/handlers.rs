use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult = Result<Json<Value>, ApiError>;

pub const REFRESH_SEGMENT: &str = "refresh";
pub const TOTAL_SEGMENT: &str = "total";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRequest {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetCountRequest {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    pub username: String,
    #[serde(alias = "totalClicks")]
    pub clicks: i64,
}

pub async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "success": false,
            "error": {
                "code": "method_not_allowed",
                "message": "Method not allowed for this route",
            }
        })),
    )
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}

pub async fn record_click(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> ApiResult {
    let clicks = state.scoreboard.record_click(&request.session_id).await?;
    Ok(Json(json!({ "success": true, "data": clicks })))
}

pub async fn list_sessions(State(state): State<AppState>) -> ApiResult {
    let sessions = state.scoreboard.list_sessions().await?;
    Ok(Json(json!({ "success": true, "data": sessions })))
}

pub async fn total_clicks(State(state): State<AppState>) -> ApiResult {
    let total = state.scoreboard.get_total_clicks().await?;
    Ok(Json(json!({ "success": true, "total": total })))
}

pub async fn session_clicks(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let clicks = state.scoreboard.get_session_clicks(&session_id).await?;
    Ok(Json(json!({ "success": true, "data": clicks })))
}

pub async fn set_session_clicks(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SetCountRequest>,
) -> ApiResult {
    let clicks = state
        .scoreboard
        .set_session_clicks(&session_id, request.count)
        .await?;
    Ok(Json(json!({ "success": true, "data": clicks })))
}

/// PUT on `/api/clicks/total`, which shadows `{session_id}`.
pub async fn set_total_session_clicks(
    State(state): State<AppState>,
    Json(request): Json<SetCountRequest>,
) -> ApiResult {
    let clicks = state
        .scoreboard
        .set_session_clicks(TOTAL_SEGMENT, request.count)
        .await?;
    Ok(Json(json!({ "success": true, "data": clicks })))
}

pub async fn top_players(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult {
    let limit = query.limit.unwrap_or(state.default_leaderboard_limit);
    let players = state.scoreboard.get_top_players(limit).await?;
    Ok(Json(json!({ "success": true, "data": players })))
}

pub async fn submit_score(
    State(state): State<AppState>,
    Json(request): Json<SubmitScoreRequest>,
) -> ApiResult {
    let player = state
        .scoreboard
        .submit_score(&request.username, request.clicks)
        .await?;
    Ok(Json(json!({ "success": true, "data": player })))
}

pub async fn refresh_rankings(State(state): State<AppState>) -> ApiResult {
    let players = state.scoreboard.refresh_rankings().await?;
    Ok(Json(json!({
        "success": true,
        "message": "Rankings refreshed",
        "players": players,
    })))
}

pub async fn remove_player(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult {
    remove_named_player(&state, &username).await
}

/// `/api/leaderboard/refresh` shadows `{username}`, so deleting a player
/// literally named "refresh" lands here.
pub async fn remove_refresh_player(State(state): State<AppState>) -> ApiResult {
    remove_named_player(&state, REFRESH_SEGMENT).await
}

async fn remove_named_player(state: &AppState, username: &str) -> ApiResult {
    state.scoreboard.remove_player(username).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Player {} removed from leaderboard", username),
    })))
}
