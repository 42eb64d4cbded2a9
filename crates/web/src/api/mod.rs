use axum::{
    response::IntoResponse,
    routing::{get, on, post},
    Json, Router,
};
use serde_json::json;

pub mod upload;

use crate::common::{route_not_found, METHOD_FILTER_ALL};

pub fn routes() -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/upload-gps-log", post(upload::upload_gps_log))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn ping() -> impl IntoResponse {
    Json(json!({
        "message": "pong!"
    }))
}
