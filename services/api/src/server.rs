use crate::cli::ServeArgs;
use crate::infra::{load_catalog, load_risk_model, AppState, InMemoryStore};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scheme_desk::config::AppConfig;
use scheme_desk::error::AppError;
use scheme_desk::telemetry;
use scheme_desk::tracker::TrackerService;
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(load_catalog(&config.scoring)?);
    let risk = Arc::new(load_risk_model(&config.scoring)?);
    let store = Arc::new(InMemoryStore::default());
    let tracker = Arc::new(TrackerService::new(store, catalog, risk.clone()));

    let app = with_service_routes(tracker, risk)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        policy = ?config.scoring.risk_policy,
        "scheme desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
