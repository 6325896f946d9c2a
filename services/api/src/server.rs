use crate::cli::ServeArgs;
use crate::infra::{
    spawn_submission_worker, AppState, ChannelSubmissionQueue, InMemoryClaimRepository,
    InMemoryPriorAuthorityRepository, TracingErrorReporter,
};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use crime_forms::config::AppConfig;
use crime_forms::error::AppError;
use crime_forms::telemetry;
use crime_forms::workflows::nsm::NsmClaimService;
use crime_forms::workflows::prior_authority::PriorAuthorityService;
use crime_forms::workflows::steps::responses::ErrorHandling;
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

    let (queue, receiver) = ChannelSubmissionQueue::new(config.submission.queue_depth);
    let worker = spawn_submission_worker(receiver);
    let queue = Arc::new(queue);
    let reporter = Arc::new(TracingErrorReporter);

    let claims = Arc::new(NsmClaimService::new(
        Arc::new(InMemoryClaimRepository::default()),
        queue.clone(),
        reporter.clone(),
    ));
    let prior_authority = Arc::new(PriorAuthorityService::new(
        Arc::new(InMemoryPriorAuthorityRepository::default()),
        queue,
        reporter.clone(),
    ));
    let errors = ErrorHandling::new(config.environment, reporter);

    let app = with_workflow_routes(claims, prior_authority, errors)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, queue_depth = config.submission.queue_depth, "crime forms service ready");

    axum::serve(listener, app).await?;
    worker.abort();
    Ok(())
}
