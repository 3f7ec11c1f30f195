// routes.rs
use axum::routing::{get, patch, post};
use axum::Router;
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let api = Router::new()
        .route(
            "/poll/act/{act_id}",
            post(handlers::create_poll).get(handlers::get_active_polls),
        )
        .route("/poll/{poll_id}", get(handlers::get_poll))
        .route("/poll/{poll_id}/vote", post(handlers::vote))
        .route("/poll/{poll_id}/close", patch(handlers::close_poll))
        .route("/act/{act_id}/events", get(handlers::act_events));

    Router::new()
        .route("/healthz", get(handlers::health))
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}
