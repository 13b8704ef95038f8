use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cp_checklist::config::AppConfig;
use cp_checklist::error::AppError;
use cp_checklist::telemetry;
use cp_checklist::workflows::checklist::{
    ChecklistService, ConfiguredMailer, DeliverySettings, InMemorySubmissionStore,
};
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
    if let Some(output_dir) = args.output_dir.take() {
        config.storage.output_dir = output_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let mailer = Arc::new(ConfiguredMailer::from_config(&config.mail)?);
    let store = Arc::new(InMemorySubmissionStore::default());
    let checklist_service = Arc::new(ChecklistService::new(
        store,
        mailer,
        DeliverySettings::from_config(&config),
    ));

    let app = with_service_routes(checklist_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        output_dir = %config.storage.output_dir.display(),
        mail_enabled = config.mail.enabled,
        "checklist service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
