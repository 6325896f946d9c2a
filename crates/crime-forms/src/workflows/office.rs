//! Office selection for providers acting for more than one office.
//!
//! Nothing is stored: the chosen office code travels on the redirect and the
//! claims index scopes itself to it.

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use tracing::info;

use super::nsm::CLAIMS_PREFIX;
use super::steps::decisions::{Action, DecisionInput, DecisionTree, Destination};
use super::steps::forms::{
    rules, run_step, Checker, ErrorKind, FormErrors, FormParams, RecordMissing, RecordRef,
    StepForm,
};
use super::steps::ports::Provider;
use super::steps::responses::{error_page, invalid, provider_from_headers, redirect, ErrorPage};
use super::steps::values::YesNo;

pub const OFFICE_PREFIX: &str = "/offices";

/// Controller name of the claims index.
const CLAIMS_INDEX: &str = "claims";

/// The provider's office choice while it is being made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeSelection {
    pub provider: Provider,
    pub office_code: Option<String>,
    pub is_current_office: Option<YesNo>,
}

impl OfficeSelection {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            office_code: None,
            is_current_office: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectOfficeForm {
    pub office_code: Option<String>,
}

impl StepForm<OfficeSelection> for SelectOfficeForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let checker = Checker::new(params, errors);
        Self {
            office_code: checker.text("office_code"),
        }
    }

    fn validate(&self, selection: &OfficeSelection, errors: &mut FormErrors) {
        match self.office_code.as_deref() {
            None => errors.add("office_code", ErrorKind::Blank),
            Some(code) if !selection.provider.office_codes.iter().any(|own| own == code) => {
                errors.add("office_code", ErrorKind::Inclusion)
            }
            Some(_) => {}
        }
    }

    fn persist(
        self,
        selection: &mut OfficeSelection,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        selection.office_code = self.office_code;
        selection.is_current_office = None;
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmOfficeForm {
    pub office_code: Option<String>,
    pub is_current_office: Option<YesNo>,
}

impl StepForm<OfficeSelection> for ConfirmOfficeForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            office_code: checker.text("office_code"),
            is_current_office: checker.yes_no("is_current_office"),
        }
    }

    fn validate(&self, selection: &OfficeSelection, errors: &mut FormErrors) {
        if !errors.on("is_current_office") {
            rules::present(errors, "is_current_office", &self.is_current_office);
        }
        if let Some(code) = self.office_code.as_deref() {
            if !selection.provider.office_codes.iter().any(|own| own == code) {
                errors.add("office_code", ErrorKind::Inclusion);
            }
        }
    }

    fn persist(
        self,
        selection: &mut OfficeSelection,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        if self.office_code.is_some() {
            selection.office_code = self.office_code;
        }
        selection.is_current_office = self.is_current_office;
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfficeDecisionTree;

impl DecisionTree<OfficeSelection> for OfficeDecisionTree {
    fn destination(
        &self,
        step_name: &str,
        input: &DecisionInput<'_, OfficeSelection>,
    ) -> Destination {
        match step_name {
            "select" => Destination::edit("confirm"),
            "confirm" => match input.application.is_current_office {
                Some(YesNo::No) => Destination::edit("select"),
                _ => Destination::index(CLAIMS_INDEX),
            },
            _ => Destination::index(CLAIMS_INDEX),
        }
    }
}

/// Run one office step against a fresh selection.
pub fn submit(
    provider: &Provider,
    step_name: &str,
    params: &FormParams,
) -> Option<Result<(Destination, OfficeSelection), FormErrors>> {
    let mut selection = OfficeSelection::new(provider.clone());
    let outcome = match step_name {
        "select" => run_step::<_, SelectOfficeForm>(params, &mut selection, &RecordRef::Application),
        "confirm" => {
            run_step::<_, ConfirmOfficeForm>(params, &mut selection, &RecordRef::Application)
        }
        _ => return None,
    };
    // Neither form addresses a child record, so persisting cannot miss one.
    let touched = match outcome {
        Ok(Ok(touched)) => touched,
        Ok(Err(errors)) => return Some(Err(errors)),
        Err(_) => RecordRef::Application,
    };
    let destination = OfficeDecisionTree.destination(
        step_name,
        &DecisionInput {
            application: &selection,
            params,
            record: &touched,
        },
    );
    Some(Ok((destination, selection)))
}

/// Location for an office destination, carrying the chosen office forward.
pub fn location(destination: &Destination, office_code: Option<&str>) -> String {
    let base = if destination.is(CLAIMS_INDEX, Action::Index) {
        CLAIMS_PREFIX.to_string()
    } else {
        format!("{OFFICE_PREFIX}/steps/{}", destination.controller)
    };
    match office_code {
        Some(code) => format!("{base}?office_code={code}"),
        None => base,
    }
}

pub fn office_router() -> Router {
    Router::new()
        .route(OFFICE_PREFIX, get(offices_handler))
        .route(&format!("{OFFICE_PREFIX}/steps/:step"), put(update_handler))
}

pub(crate) async fn offices_handler(headers: HeaderMap) -> Response {
    match provider_from_headers(&headers) {
        Some(provider) => (StatusCode::OK, Json(provider.office_codes)).into_response(),
        None => error_page(ErrorPage::InvalidSession),
    }
}

pub(crate) async fn update_handler(
    headers: HeaderMap,
    Path(step): Path<String>,
    Json(params): Json<FormParams>,
) -> Response {
    let Some(provider) = provider_from_headers(&headers) else {
        return error_page(ErrorPage::InvalidSession);
    };
    match submit(&provider, &step, &params) {
        Some(Ok((destination, selection))) => {
            info!(provider = %provider.email, step = %step, next = %destination.controller, "office step completed");
            redirect(&location(&destination, selection.office_code.as_deref()))
        }
        Some(Err(errors)) => invalid(&errors),
        None => redirect(&location(&Destination::index(CLAIMS_INDEX), None)),
    }
}
