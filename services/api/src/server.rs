use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState, AUDIT_LOG_CAPACITY};
use crate::routes::with_qualification_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mortgage_qualify::config::AppConfig;
use mortgage_qualify::error::AppError;
use mortgage_qualify::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (qualification_service, _) = build_service(config.loan_terms);

    let app = with_qualification_routes(qualification_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        interest_rate = config.loan_terms.interest_rate,
        term_years = config.loan_terms.term_years,
        audit_capacity = AUDIT_LOG_CAPACITY,
        "mortgage qualification service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
