use std::sync::Arc;

use crate::session::SessionRegistry;
use crate::tasks::api::v1;

use axum::Router;
use axum::routing::get;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .nest("/api/v1", v1::create_api_router(registry))
        .route("/api-docs/openapi.json", get(v1::openapi_handler))
}
