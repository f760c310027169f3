use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::mapper::AcmeCommercialPackageMapper;
use super::model::{AcmeCommercialPackagePolicy, AcmeCommercialPackagePolicyUpdate};
use crate::policy::filters::PolicyFilters;
use crate::policy::repository::PolicyRepository;
use crate::policy::service::{PolicyTransactionService, ServiceError};
use crate::policy::validation::ValidationError;

pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 1000;

type AcmeService<R> = PolicyTransactionService<R, AcmeCommercialPackageMapper>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) skip: Option<usize>,
    pub(crate) limit: Option<usize>,
    pub(crate) carrier_code: Option<String>,
    pub(crate) status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FilterQuery {
    pub(crate) carrier_code: Option<String>,
    pub(crate) status: Option<String>,
}

impl FilterQuery {
    fn to_filters(&self) -> PolicyFilters {
        query_filters(self.carrier_code.as_deref(), self.status.as_deref())
    }
}

fn query_filters(carrier_code: Option<&str>, status: Option<&str>) -> PolicyFilters {
    let mut filters = PolicyFilters::new();
    if let Some(carrier_code) = carrier_code {
        filters = filters.with_equals("carrier_code", carrier_code);
    }
    if let Some(status) = status {
        filters = filters.with_equals("status", status);
    }
    filters
}

/// CRUD endpoints for ACME Commercial Package policies.
pub fn acme_policy_router<R>(service: Arc<AcmeService<R>>) -> Router
where
    R: PolicyRepository + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/acme-commercial-package/policies",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/acme-commercial-package/policies/count",
            get(count_handler::<R>),
        )
        .route(
            "/api/acme-commercial-package/policies/:id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route(
            "/api/acme-commercial-package/policies/:id/exists",
            get(exists_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<AcmeService<R>>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response
where
    R: PolicyRepository + ?Sized + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_query(rejection),
    };
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        let payload = json!({
            "error": format!("limit must be between 1 and {MAX_PAGE_LIMIT}"),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    let filters = query_filters(query.carrier_code.as_deref(), query.status.as_deref());
    match service.list(skip, limit, &filters).await {
        Ok(policies) => (StatusCode::OK, Json(policies)).into_response(),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn count_handler<R>(
    State(service): State<Arc<AcmeService<R>>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Response
where
    R: PolicyRepository + ?Sized + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_query(rejection),
    };
    match service.count(&query.to_filters()).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "count": count }))).into_response(),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<AcmeService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: PolicyRepository + ?Sized + 'static,
{
    match service.get(&id).await {
        Ok(Some(policy)) => (StatusCode::OK, Json(policy)).into_response(),
        Ok(None) => not_found(),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<AcmeService<R>>>,
    Json(policy): Json<AcmeCommercialPackagePolicy>,
) -> Response
where
    R: PolicyRepository + ?Sized + 'static,
{
    let policy = policy.without_server_fields();
    if let Err(error) = policy.validate() {
        return invalid(error);
    }

    match service.create(policy).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<AcmeService<R>>>,
    Path(id): Path<String>,
    Json(update): Json<AcmeCommercialPackagePolicyUpdate>,
) -> Response
where
    R: PolicyRepository + ?Sized + 'static,
{
    let mut policy = match service.get(&id).await {
        Ok(Some(policy)) => policy,
        Ok(None) => return not_found(),
        Err(error) => return service_failure(error),
    };

    update.apply_to(&mut policy);
    if let Err(error) = policy.validate() {
        return invalid(error);
    }

    match service.update(&id, policy).await {
        Ok(Some(updated)) => (StatusCode::OK, Json(updated)).into_response(),
        Ok(None) => not_found(),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<AcmeService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: PolicyRepository + ?Sized + 'static,
{
    match service.delete(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn exists_handler<R>(
    State(service): State<Arc<AcmeService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: PolicyRepository + ?Sized + 'static,
{
    match service.exists(&id).await {
        Ok(exists) => (StatusCode::OK, Json(json!({ "exists": exists }))).into_response(),
        Err(error) => service_failure(error),
    }
}

fn not_found() -> Response {
    let payload = json!({
        "error": "Policy not found",
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn bad_query(rejection: QueryRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

fn invalid(error: ValidationError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "violations": error.violations,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

fn service_failure(error: ServiceError) -> Response {
    match &error {
        ServiceError::Invalid(validation) => return invalid(validation.clone()),
        ServiceError::Decode(decode) => {
            warn!(path = decode.path(), error = %decode, "stored ACME policy failed to decode");
        }
        ServiceError::Repository(_) => {}
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
