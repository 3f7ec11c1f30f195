// handlers.rs
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::acts;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{CreatePollRequest, PollResponse, VoteRequest};
use crate::poll;
use crate::state::AppState;

/// Create a poll on a live act
pub async fn create_poll(
    State(state): State<AppState>,
    user: AuthUser,
    Path(act_id): Path<Uuid>,
    Json(req): Json<CreatePollRequest>,
) -> Result<Json<PollResponse>, ApiError> {
    let poll = poll::create_poll(&state, act_id, user.id, req).await?;
    Ok(Json(poll))
}

/// Active polls for an act
pub async fn get_active_polls(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(act_id): Path<Uuid>,
) -> Result<Json<Vec<PollResponse>>, ApiError> {
    let polls = poll::get_active_polls(&state.pool, act_id).await?;
    Ok(Json(polls))
}

/// Single poll with its current tally
pub async fn get_poll(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(poll_id): Path<i32>,
) -> Result<Json<PollResponse>, ApiError> {
    let poll = poll::get_poll(&state.pool, poll_id).await?;
    Ok(Json(poll))
}

/// Cast a vote
pub async fn vote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(poll_id): Path<i32>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<PollResponse>, ApiError> {
    let poll = poll::vote(&state, poll_id, user.id, req.option_id).await?;
    Ok(Json(poll))
}

/// Close a poll ahead of its deadline
pub async fn close_poll(
    State(state): State<AppState>,
    user: AuthUser,
    Path(poll_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    poll::close_poll(&state, poll_id, user.id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Subscribe to an act's poll events
pub async fn act_events(
    State(state): State<AppState>,
    Path(act_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    acts::get_act(&state.pool, act_id).await?;

    let rx = state.rooms.subscribe(act_id);
    Ok(ws.on_upgrade(move |socket| forward_events(socket, rx)))
}

pub async fn health() -> &'static str {
    "ok"
}

async fn forward_events(socket: WebSocket, mut rx: broadcast::Receiver<String>) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(payload) => {
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                // viewer fell too far behind, skip what was missed
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
