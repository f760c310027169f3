use crate::cli::ServeArgs;
use crate::infra::{open_repository, AppState};
use crate::routes::with_policy_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rating_workbench::config::AppConfig;
use rating_workbench::error::AppError;
use rating_workbench::policy::{
    AcmeCommercialPackageMapper, MapperRegistry, PolicyTransactionService,
};
use rating_workbench::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.storage.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = Arc::new(MapperRegistry::with_builtin_mappers()?);
    let acme_mapper =
        registry.get_typed::<AcmeCommercialPackageMapper>("ACME", "COMMERCIAL_PACKAGE")?;
    let repository = open_repository(&config.storage).await?;
    let acme_service = Arc::new(PolicyTransactionService::new(repository, acme_mapper));

    let app = with_policy_routes(acme_service, registry.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        mappers = registry.len(),
        "rating workbench api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
