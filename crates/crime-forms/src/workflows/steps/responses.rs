//! HTTP conventions shared by the workflow routers: redirects after a
//! successful step, `200` re-renders on validation failure, and the error
//! pages for session, lookup and unhandled failures.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use super::forms::FormErrors;
use super::ports::{ErrorReporter, Provider};
use crate::config::AppEnvironment;

pub const PROVIDER_EMAIL_HEADER: &str = "x-provider-email";
pub const OFFICE_CODES_HEADER: &str = "x-office-codes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPage {
    InvalidSession,
    ApplicationNotFound,
    Unhandled,
}

impl ErrorPage {
    pub const fn path(self) -> &'static str {
        match self {
            Self::InvalidSession => "/errors/invalid_session",
            Self::ApplicationNotFound => "/errors/application_not_found",
            Self::Unhandled => "/errors/unhandled",
        }
    }
}

/// `303 See Other` so the browser follows with a GET.
pub fn redirect(location: &str) -> Response {
    Redirect::to(location).into_response()
}

pub fn error_page(page: ErrorPage) -> Response {
    redirect(page.path())
}

pub fn invalid(errors: &FormErrors) -> Response {
    let payload = json!({
        "errors": errors,
        "messages": errors.messages(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub fn provider_from_headers(headers: &HeaderMap) -> Option<Provider> {
    let email = headers
        .get(PROVIDER_EMAIL_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .to_string();
    if email.is_empty() {
        return None;
    }

    let office_codes = headers
        .get(OFFICE_CODES_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Provider::new(email, office_codes))
}

/// Environment-aware handling for errors no handler anticipated.
#[derive(Clone)]
pub struct ErrorHandling {
    environment: AppEnvironment,
    reporter: Arc<dyn ErrorReporter>,
}

impl ErrorHandling {
    pub fn new(environment: AppEnvironment, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            environment,
            reporter,
        }
    }

    pub fn unhandled(&self, err: &(dyn std::error::Error + 'static)) -> Response {
        if self.environment.is_production() {
            error!(error = %err, "unhandled workflow error");
            self.reporter.report("unhandled workflow error", err);
            return error_page(ErrorPage::Unhandled);
        }

        let payload = json!({ "error": err.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
    }
}
