mod relay;
mod status;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
        .route("/scrape-data", post(relay::scrape_data))
        .route("/test-login", post(relay::test_login))
        .fallback(status::not_found)
        .layer(CatchPanicLayer::custom(relay::handle_panic))
        .with_state(state)
}
