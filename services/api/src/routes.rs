use std::sync::Arc;

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use crime_forms::workflows::nsm::{nsm_router, ClaimRepository, NsmClaimService};
use crime_forms::workflows::office::office_router;
use crime_forms::workflows::prior_authority::{
    prior_authority_router, PriorAuthorityRepository, PriorAuthorityService,
};
use crime_forms::workflows::steps::ports::SubmissionQueue;
use crime_forms::workflows::steps::responses::ErrorHandling;
use serde::Serialize;
use serde_json::json;

use crate::infra::AppState;

/// Compose both workflows, office selection, error pages and the ops routes.
pub(crate) fn with_workflow_routes<C, P, Q>(
    claims: Arc<NsmClaimService<C, Q>>,
    prior_authority: Arc<PriorAuthorityService<P, Q>>,
    errors: ErrorHandling,
) -> Router
where
    C: ClaimRepository + 'static,
    P: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    nsm_router(claims, errors.clone())
        .merge(prior_authority_router(prior_authority, errors))
        .merge(office_router())
        .route("/errors/:page", get(error_page_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorPageView {
    pub(crate) page: String,
    pub(crate) message: &'static str,
}

fn error_message(page: &str) -> Option<&'static str> {
    match page {
        "invalid_session" => Some("Your session has expired. Sign in again to continue."),
        "application_not_found" => Some("The application could not be found."),
        "unhandled" => Some("Sorry, something went wrong. Try again later."),
        _ => None,
    }
}

pub(crate) async fn error_page_endpoint(Path(page): Path<String>) -> impl IntoResponse {
    match error_message(&page) {
        Some(message) => (StatusCode::OK, Json(ErrorPageView { page, message })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "unknown page" }))).into_response(),
    }
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
    use axum::response::Response;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn known_error_pages_render_a_message() {
        let response = error_page_endpoint(Path("application_not_found".to_string()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["page"], json!("application_not_found"));
        assert_eq!(body["message"], json!("The application could not be found."));
    }

    #[tokio::test]
    async fn unknown_error_pages_are_not_found() {
        let response = error_page_endpoint(Path("teapot".to_string()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
