//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/programme.pdf", get(handlers::get_programme))
        .route("/salles.pdf", get(handlers::get_room_schedules))
        .route("/mini.pdf", get(handlers::get_mini_table))
        .route("/mini-text.pdf", get(handlers::get_mini_text))
        .route("/documents", get(handlers::list_documents))
        .route("/documents/{name}", get(handlers::get_document))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ProgrammeConfig;
    use crate::feed::{LocalFeed, ScheduleFeed};
    use crate::models::{Schedule, TalkDetailCache};

    #[test]
    fn test_router_creation() {
        let feed: Arc<dyn ScheduleFeed> =
            Arc::new(LocalFeed::new(Schedule::new(vec![]), TalkDetailCache::new()));
        let state = AppState::new(ProgrammeConfig::default(), feed);
        let _router = create_router(state);
    }
}
