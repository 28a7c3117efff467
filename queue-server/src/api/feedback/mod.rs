//! Feedback API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/feedback", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::submit))
        .route("/shop/{shop_id}", get(handler::list_by_shop))
        .route("/shop/{shop_id}/summary", get(handler::summary))
        .route("/booking/{booking_id}/form", get(handler::form))
}
