//! Router assembly: everything under `/api`, with body limit and request tracing.

mod api;
mod common;

pub use api::api_routes;
pub use common::common_routes;

use crate::config::ServerConfig;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .merge(common_routes(state.clone()))
        .merge(api_routes(state));
    Router::new()
        .nest("/api", api)
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
}
