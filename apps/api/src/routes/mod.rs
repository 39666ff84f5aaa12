pub mod api;
pub mod health;
pub mod pages;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use crate::flash::{redirect_with_flash, Flash};
use crate::state::AppState;

const INTERNAL_ERROR: &str = "An internal server error occurred. Please try again.";

/// Turns a handler panic into a flash message on the upload form.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Handler panicked: {detail}");
    redirect_with_flash("/", Flash::error(INTERNAL_ERROR))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(pages::handle_index))
        .route("/upload", post(pages::handle_upload))
        .route("/analysis/:id", get(pages::handle_show_analysis))
        .route(
            "/api/detailed-feedback/:id",
            get(api::handle_detailed_feedback),
        )
        .fallback(pages::handle_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
