use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::registry::MapperRegistry;

/// Read-only endpoints over the mapper registry.
pub fn registry_router(registry: Arc<MapperRegistry>) -> Router {
    Router::new()
        .route(
            "/api/policies/resolve/:policy_number",
            get(resolve_handler),
        )
        .route("/api/mappers", get(mappers_handler))
        .with_state(registry)
}

pub(crate) async fn resolve_handler(
    State(registry): State<Arc<MapperRegistry>>,
    Path(policy_number): Path<String>,
) -> Response {
    match registry.get_mapper_by_policy_number(&policy_number) {
        Some(mapper) => (StatusCode::OK, Json(mapper.identity())).into_response(),
        None => {
            let payload = json!({
                "error": format!("no mapper recognizes policy number '{policy_number}'"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn mappers_handler(State(registry): State<Arc<MapperRegistry>>) -> Response {
    (StatusCode::OK, Json(registry.list_registered())).into_response()
}
