use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use super::domain::ApplicationId;
use super::forms::APPLICATIONS_PREFIX;
use super::repository::PriorAuthorityRepository;
use super::service::{PriorAuthorityService, PriorAuthorityServiceError};
use crate::workflows::nsm::service::{DocumentUpload, StepOutcome};
use crate::workflows::steps::decisions::Destination;
use crate::workflows::steps::forms::FormParams;
use crate::workflows::steps::ports::{Provider, SubmissionQueue};
use crate::workflows::steps::responses::{
    error_page, invalid, provider_from_headers, redirect, ErrorHandling, ErrorPage,
};

pub struct PriorAuthorityRouterState<R, Q> {
    service: Arc<PriorAuthorityService<R, Q>>,
    errors: ErrorHandling,
}

impl<R, Q> PriorAuthorityRouterState<R, Q> {
    pub(crate) fn new(service: Arc<PriorAuthorityService<R, Q>>, errors: ErrorHandling) -> Self {
        Self { service, errors }
    }
}

impl<R, Q> Clone for PriorAuthorityRouterState<R, Q> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            errors: self.errors.clone(),
        }
    }
}

pub fn prior_authority_router<R, Q>(
    service: Arc<PriorAuthorityService<R, Q>>,
    errors: ErrorHandling,
) -> Router
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let state = PriorAuthorityRouterState::new(service, errors);
    Router::new()
        .route(
            APPLICATIONS_PREFIX,
            get(list_handler::<R, Q>).post(create_handler::<R, Q>),
        )
        .route(
            &format!("{APPLICATIONS_PREFIX}/:application_id"),
            get(show_handler::<R, Q>).delete(delete_handler::<R, Q>),
        )
        .route(
            &format!("{APPLICATIONS_PREFIX}/:application_id/tasks"),
            get(tasks_handler::<R, Q>),
        )
        .route(
            &format!("{APPLICATIONS_PREFIX}/:application_id/steps/:step"),
            get(visit_handler::<R, Q>).put(update_handler::<R, Q>),
        )
        .route(
            &format!("{APPLICATIONS_PREFIX}/:application_id/steps/:step/:record"),
            get(visit_record_handler::<R, Q>).put(update_record_handler::<R, Q>),
        )
        .route(
            &format!("{APPLICATIONS_PREFIX}/:application_id/costs"),
            get(costs_handler::<R, Q>),
        )
        .route(
            &format!("{APPLICATIONS_PREFIX}/:application_id/preview"),
            post(preview_handler::<R, Q>),
        )
        .route(
            &format!("{APPLICATIONS_PREFIX}/:application_id/supporting_documents"),
            post(attach_handler::<R, Q>),
        )
        .route(
            &format!("{APPLICATIONS_PREFIX}/:application_id/payload"),
            get(payload_handler::<R, Q>),
        )
        .with_state(state)
}

/// Location for a decision tree destination.
pub fn location(destination: &Destination, id: &ApplicationId) -> String {
    if destination.controller == "start_page" {
        return start_page(id);
    }
    destination.path(APPLICATIONS_PREFIX, &id.0)
}

fn start_page(id: &ApplicationId) -> String {
    format!("{APPLICATIONS_PREFIX}/{id}/tasks")
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateApplication {
    #[serde(default)]
    pub office_code: Option<String>,
}

fn failure(
    err: PriorAuthorityServiceError,
    id: Option<&ApplicationId>,
    errors: &ErrorHandling,
) -> Response {
    match (err, id) {
        (PriorAuthorityServiceError::NotFound, _) => error_page(ErrorPage::ApplicationNotFound),
        (
            err @ (PriorAuthorityServiceError::Incomplete
            | PriorAuthorityServiceError::NotEditable(_)),
            Some(id),
        ) => {
            warn!(application_id = %id, reason = %err, "redirecting to task list");
            redirect(&start_page(id))
        }
        (PriorAuthorityServiceError::OfficeNotPermitted(code), _) => {
            let payload =
                serde_json::json!({ "error": "office not permitted", "office_code": code });
            (StatusCode::FORBIDDEN, Json(payload)).into_response()
        }
        (
            PriorAuthorityServiceError::UnknownStep(_)
            | PriorAuthorityServiceError::RecordMissing(_),
            _,
        ) => error_page(ErrorPage::ApplicationNotFound),
        (other, _) => errors.unhandled(&other),
    }
}

fn provider(headers: &HeaderMap) -> Result<Provider, Response> {
    provider_from_headers(headers).ok_or_else(|| error_page(ErrorPage::InvalidSession))
}

pub(crate) async fn list_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    match state.service.list(&provider) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => failure(err, None, &state.errors),
    }
}

pub(crate) async fn create_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    body: Option<Json<CreateApplication>>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let request = body.map(|Json(request)| request).unwrap_or_default();
    match state.service.create(&provider, request.office_code) {
        Ok(application) => redirect(&location(&Destination::edit("ufn"), &application.id)),
        Err(err) => failure(err, None, &state.errors),
    }
}

pub(crate) async fn show_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.fetch(&provider, &id) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn delete_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.delete(&provider, &id) {
        Ok(()) => redirect(APPLICATIONS_PREFIX),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn tasks_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.task_list(&provider, &id) {
        Ok(sections) => (StatusCode::OK, Json(sections)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

fn visit<R, Q>(
    state: &PriorAuthorityRouterState<R, Q>,
    headers: &HeaderMap,
    application_id: String,
    step: &str,
    record: Option<&str>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.visit_step(&provider, &id, step, record) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

fn update<R, Q>(
    state: &PriorAuthorityRouterState<R, Q>,
    headers: &HeaderMap,
    application_id: String,
    step: &str,
    record: Option<&str>,
    params: &FormParams,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.update_step(&provider, &id, step, record, params) {
        Ok(StepOutcome::Advance(destination)) => redirect(&location(&destination, &id)),
        Ok(StepOutcome::Invalid(errors)) => invalid(&errors),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn visit_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path((application_id, step)): Path<(String, String)>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    visit(&state, &headers, application_id, &step, None)
}

pub(crate) async fn visit_record_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path((application_id, step, record)): Path<(String, String, String)>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    visit(&state, &headers, application_id, &step, Some(&record))
}

pub(crate) async fn update_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path((application_id, step)): Path<(String, String)>,
    Json(params): Json<FormParams>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    update(&state, &headers, application_id, &step, None, &params)
}

pub(crate) async fn update_record_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path((application_id, step, record)): Path<(String, String, String)>,
    Json(params): Json<FormParams>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    update(&state, &headers, application_id, &step, Some(&record), &params)
}

pub(crate) async fn costs_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.costs(&provider, &id) {
        Ok(costs) => (StatusCode::OK, Json(costs)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn preview_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(params): Json<FormParams>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.preview(&provider, &id, &params) {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn attach_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(upload): Json<DocumentUpload>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.attach_document(&provider, &id, upload) {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}

pub(crate) async fn payload_handler<R, Q>(
    State(state): State<PriorAuthorityRouterState<R, Q>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    let provider = match provider(&headers) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let id = ApplicationId(application_id);
    match state.service.payload(&provider, &id) {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(err) => failure(err, Some(&id), &state.errors),
    }
}
