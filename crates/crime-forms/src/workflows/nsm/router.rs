use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::domain::ClaimId;
use super::forms::CLAIMS_PREFIX;
use super::repository::ClaimRepository;
use super::service::{DocumentUpload, NsmClaimService, NsmServiceError, StepOutcome};
use crate::workflows::steps::decisions::Destination;
use crate::workflows::steps::forms::FormParams;
use crate::workflows::steps::ports::{Provider, SubmissionQueue};
use crate::workflows::steps::responses::{
    error_page, invalid, provider_from_headers, redirect, ErrorHandling, ErrorPage,
};

pub struct NsmRouterState<R, Q> {
    service: Arc<NsmClaimService<R, Q>>,
    errors: ErrorHandling,
}

impl<R, Q> NsmRouterState<R, Q> {
    pub(crate) fn new(service: Arc<NsmClaimService<R, Q>>, errors: ErrorHandling) -> Self {
        Self { service, errors }
    }
}

impl<R, Q> Clone for NsmRouterState<R, Q> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            errors: self.errors.clone(),
        }
    }
}

/// Router builder exposing the claim workflow and the assessment callback.
pub fn nsm_router<R, Q>(service: Arc<NsmClaimService<R, Q>>, errors: ErrorHandling) -> Router
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let state = NsmRouterState::new(service, errors);
    Router::new()
        .route(
            CLAIMS_PREFIX,
            get(list_handler::<R, Q>).post(create_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id"),
            get(show_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id/tasks"),
            get(tasks_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id/steps/:step"),
            get(visit_handler::<R, Q>).put(update_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id/steps/:step/:record"),
            get(visit_record_handler::<R, Q>).put(update_record_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id/cost_summary"),
            get(cost_summary_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id/preview"),
            post(preview_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id/supporting_evidence"),
            post(attach_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id/work_items/:work_item_id/duplicate"),
            post(duplicate_handler::<R, Q>),
        )
        .route(
            &format!("{CLAIMS_PREFIX}/:claim_id/payload"),
            get(payload_handler::<R, Q>),
        )
        .route(
            "/non-standard-magistrates/assessments/:claim_id",
            post(assessment_handler::<R, Q>),
        )
        .with_state(state)
}

/// Location for a decision tree destination.
pub fn location(destination: &Destination, claim_id: &ClaimId) -> String {
    if destination.controller == "start_page" {
        return start_page(claim_id);
    }
    destination.path(CLAIMS_PREFIX, &claim_id.0)
}

fn start_page(claim_id: &ClaimId) -> String {
    format!("{CLAIMS_PREFIX}/{claim_id}/tasks")
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateClaim {
    #[serde(default)]
    pub office_code: Option<String>,
}

fn failure(err: NsmServiceError, claim_id: Option<&ClaimId>, errors: &ErrorHandling) -> Response {
    match (err, claim_id) {
        (NsmServiceError::NotFound, _) => error_page(ErrorPage::ApplicationNotFound),
        (err @ (NsmServiceError::Incomplete | NsmServiceError::NotEditable(_)), Some(id)) => {
            warn!(claim_id = %id, reason = %err, "redirecting to start page");
            redirect(&start_page(id))
        }
        (NsmServiceError::OfficeNotPermitted(code), _) => {
            let payload = serde_json::json!({ "error": "office not permitted", "office_code": code });
            (StatusCode::FORBIDDEN, Json(payload)).into_response()
        }
        (NsmServiceError::UnknownStep(_) | NsmServiceError::RecordMissing(_), _) => {
            error_page(ErrorPage::ApplicationNotFound)
        }
        (other, _) => errors.unhandled(&other),
    }
}

fn provider(headers: &HeaderMap) -> Result<Provider, Response> {
    provider_from_headers(headers).ok_or_else(|| error_page(ErrorPage::InvalidSession))
}

pub(crate) async fn list_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    match state.service.list(&provider) {
        Ok(claims) => (StatusCode::OK, Json(claims)).into_response(),
        Err(err) => failure(err, None, &state.errors),
    }
}

pub(crate) async fn create_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    body: Option<Json<CreateClaim>>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let request = body.map(|Json(request)| request).unwrap_or_default();
    match state.service.create(&provider, request.office_code) {
        Ok(claim) => redirect(&location(&Destination::edit("claim_type"), &claim.id)),
        Err(err) => failure(err, None, &state.errors),
    }
}

pub(crate) async fn show_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state.service.fetch(&provider, &id) {
        Ok(claim) => (StatusCode::OK, Json(claim)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn tasks_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state.service.task_list(&provider, &id) {
        Ok(sections) => (StatusCode::OK, Json(sections)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

fn visit<R, Q>(
    state: &NsmRouterState<R, Q>,
    headers: &HeaderMap,
    claim_id: String,
    step: &str,
    record: Option<&str>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state.service.visit_step(&provider, &id, step, record) {
        Ok(claim) => (StatusCode::OK, Json(claim)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

fn update<R, Q>(
    state: &NsmRouterState<R, Q>,
    headers: &HeaderMap,
    claim_id: String,
    step: &str,
    record: Option<&str>,
    params: &FormParams,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state.service.update_step(&provider, &id, step, record, params) {
        Ok(StepOutcome::Advance(destination)) => redirect(&location(&destination, &id)),
        Ok(StepOutcome::Invalid(errors)) => invalid(&errors),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn visit_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path((claim_id, step)): Path<(String, String)>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    visit(&state, &headers, claim_id, &step, None)
}

pub(crate) async fn visit_record_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path((claim_id, step, record)): Path<(String, String, String)>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    visit(&state, &headers, claim_id, &step, Some(&record))
}

pub(crate) async fn update_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path((claim_id, step)): Path<(String, String)>,
    Json(params): Json<FormParams>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    update(&state, &headers, claim_id, &step, None, &params)
}

pub(crate) async fn update_record_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path((claim_id, step, record)): Path<(String, String, String)>,
    Json(params): Json<FormParams>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    update(&state, &headers, claim_id, &step, Some(&record), &params)
}

pub(crate) async fn cost_summary_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state.service.cost_summary(&provider, &id) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn preview_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
    Json(params): Json<FormParams>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state.service.preview(&provider, &id, &params) {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn attach_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
    Json(upload): Json<DocumentUpload>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state.service.attach_document(&provider, &id, upload) {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn duplicate_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path((claim_id, work_item_id)): Path<(String, String)>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state
        .service
        .duplicate_work_item(&provider, &id, &work_item_id)
    {
        Ok(new_id) => redirect(&location(
            &Destination::edit("work_item").with_record(new_id),
            &id,
        )),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn payload_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ClaimId(claim_id);
    match state.service.payload(&provider, &id) {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn assessment_handler<R, Q>(
    State(state): State<NsmRouterState<R, Q>>,
    Path(claim_id): Path<String>,
    Json(record): Json<Value>,
) -> Response
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let id = ClaimId(claim_id);
    match state.service.sync_assessment(&id, &record) {
        Ok(report) => {
            let payload = serde_json::json!({
                "claim_id": id.0,
                "synced": report.is_clean(),
                "work_items": report.work_items,
                "disbursements": report.disbursements,
                "letters_and_calls": report.letters_and_calls,
                "failure": report.failure,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(NsmServiceError::NotFound) => {
            let payload = serde_json::json!({ "error": "claim not found", "claim_id": id.0 });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => state.errors.unhandled(&err),
    }
}
