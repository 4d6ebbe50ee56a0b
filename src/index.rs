use axum::{
    debug_handler,
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::include_res;

#[debug_handler]
pub async fn index() -> impl IntoResponse {
    Html(include_res!(str, "/pages/index.html"))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
