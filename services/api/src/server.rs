use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDirectory, InMemoryLeaveRepository};
use crate::routes::with_leave_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use leave_portal::config::AppConfig;
use leave_portal::error::AppError;
use leave_portal::telemetry;
use leave_portal::workflows::leave::{Clock, LeaveService, LeaveValidator, SystemClock};
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

    let limits = Arc::new(config.leave.load_limits()?);
    info!(
        source = config
            .leave
            .limits_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_string()),
        leave_types = limits.iter().count(),
        "leave limits loaded"
    );

    let cutoffs = config.leave.cutoffs;
    info!(
        all_sessions_until = cutoffs.all_sessions_until,
        afternoon_until = cutoffs.afternoon_until,
        "same-day cutoffs configured"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        limits: limits.clone(),
        clock: clock.clone(),
    };

    let repository = Arc::new(InMemoryLeaveRepository::default());
    let directory = Arc::new(InMemoryDirectory::sample());
    let leave_service = Arc::new(
        LeaveService::new(repository, directory, limits.as_ref().clone())
            .with_clock(clock)
            .with_validator(LeaveValidator::new(cutoffs)),
    );

    let app = with_leave_routes(leave_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "leave portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
