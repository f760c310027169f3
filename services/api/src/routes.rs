use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use rating_workbench::policy::{
    acme_policy_router, registry_router, AcmeCommercialPackageMapper, MapperRegistry,
    PolicyRepository, PolicyTransactionService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) type AcmePolicyService =
    PolicyTransactionService<dyn PolicyRepository, AcmeCommercialPackageMapper>;

pub(crate) fn with_policy_routes(
    acme_service: Arc<AcmePolicyService>,
    registry: Arc<MapperRegistry>,
) -> axum::Router {
    acme_policy_router(acme_service)
        .merge(registry_router(registry))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use rating_workbench::policy::InMemoryPolicyRepository;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn build_app(ready: bool) -> axum::Router {
        let registry = Arc::new(MapperRegistry::with_builtin_mappers().expect("builtins"));
        let mapper = registry
            .get_typed::<AcmeCommercialPackageMapper>("ACME", "COMMERCIAL_PACKAGE")
            .expect("acme mapper");
        let repository: Arc<dyn PolicyRepository> = Arc::new(InMemoryPolicyRepository::new());
        let service = Arc::new(PolicyTransactionService::new(repository, mapper));

        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        state.readiness.store(ready, Ordering::Release);

        with_policy_routes(service, registry).layer(Extension(state))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_tracks_the_startup_flag() {
        let (status, body) = get(build_app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "status": "initializing" }));

        let (status, body) = get(build_app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ready" }));
    }

    #[tokio::test]
    async fn policy_and_registry_routes_are_mounted() {
        let (status, body) = get(build_app(true), "/api/acme-commercial-package/policies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = get(build_app(true), "/api/mappers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["carrier_code"], json!("ACME"));
    }

    #[tokio::test]
    async fn metrics_render_as_prometheus_text() {
        let response = build_app(true)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
