use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use super::decisions::PriorAuthorityDecisionTree;
use super::domain::{ApplicationId, ApplicationStatus, PriorAuthorityApplication};
use super::forms::{apply, step_path, PriorAuthorityStep};
use super::payload::{CostBasedRisk, PriorAuthorityPayloadBuilder, APPLICATION_TYPE};
use super::pricing::{ApplicationCosts, QuotePreview};
use super::repository::PriorAuthorityRepository;
use super::tasks::{ready_to_submit, task_list, TaskSection};
use crate::workflows::nsm::domain::SupportingDocument;
use crate::workflows::nsm::risk::RiskScorer;
use crate::workflows::nsm::service::{DocumentUpload, StepOutcome};
use crate::workflows::steps::decisions::{DecisionInput, DecisionTree};
use crate::workflows::steps::forms::{FormParams, RecordMissing, RecordRef};
use crate::workflows::steps::ports::{
    ErrorReporter, Provider, RepositoryError, SubmissionJob, SubmissionQueue,
};

const CONFIRMATION_PAGE: &str = "submission_confirmation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub ufn: Option<String>,
    pub status: &'static str,
    pub client_name: Option<String>,
    pub office_code: Option<String>,
}

impl ApplicationSummary {
    fn of(application: &PriorAuthorityApplication) -> Self {
        Self {
            id: application.id.clone(),
            ufn: application.ufn.clone(),
            status: application.status.label(),
            client_name: application.client_name(),
            office_code: application.office_code.clone(),
        }
    }
}

pub struct PriorAuthorityService<R, Q> {
    repository: Arc<R>,
    queue: Arc<Q>,
    reporter: Arc<dyn ErrorReporter>,
    risk: Arc<dyn RiskScorer<PriorAuthorityApplication>>,
    decisions: PriorAuthorityDecisionTree,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("pa-{id:06}"))
}

impl<R, Q> PriorAuthorityService<R, Q>
where
    R: PriorAuthorityRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    pub fn new(repository: Arc<R>, queue: Arc<Q>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            repository,
            queue,
            reporter,
            risk: Arc::new(CostBasedRisk::default()),
            decisions: PriorAuthorityDecisionTree,
        }
    }

    pub fn with_risk(mut self, risk: Arc<dyn RiskScorer<PriorAuthorityApplication>>) -> Self {
        self.risk = risk;
        self
    }

    /// Start a pre-draft; it only appears in listings once it has a UFN.
    pub fn create(
        &self,
        provider: &Provider,
        office_code: Option<String>,
    ) -> Result<PriorAuthorityApplication, PriorAuthorityServiceError> {
        let office_code = match office_code {
            Some(code) if provider.office_codes.contains(&code) => Some(code),
            Some(code) => return Err(PriorAuthorityServiceError::OfficeNotPermitted(code)),
            None if provider.office_codes.len() == 1 => provider.office_codes.first().cloned(),
            None => None,
        };

        let mut application =
            PriorAuthorityApplication::new(next_application_id(), provider.email.clone(), Utc::now());
        application.office_code = office_code;
        let stored = self.repository.insert(application)?;
        info!(application_id = %stored.id, "prior authority application created");
        Ok(stored)
    }

    pub fn list(
        &self,
        provider: &Provider,
    ) -> Result<Vec<ApplicationSummary>, PriorAuthorityServiceError> {
        let mut applications: Vec<PriorAuthorityApplication> = self
            .repository
            .all()?
            .into_iter()
            .filter(|application| application.status.is_listed())
            .filter(|application| {
                provider.can_see(application.office_code.as_deref(), &application.submitter)
            })
            .collect();
        applications.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(applications.iter().map(ApplicationSummary::of).collect())
    }

    pub fn fetch(
        &self,
        provider: &Provider,
        id: &ApplicationId,
    ) -> Result<PriorAuthorityApplication, PriorAuthorityServiceError> {
        let application = self
            .repository
            .fetch(id)?
            .ok_or(PriorAuthorityServiceError::NotFound)?;
        if !provider.can_see(application.office_code.as_deref(), &application.submitter) {
            return Err(PriorAuthorityServiceError::NotFound);
        }
        Ok(application)
    }

    pub fn visit_step(
        &self,
        provider: &Provider,
        id: &ApplicationId,
        step_name: &str,
        record: Option<&str>,
    ) -> Result<PriorAuthorityApplication, PriorAuthorityServiceError> {
        let mut application = self.fetch(provider, id)?;
        if step_name != CONFIRMATION_PAGE {
            let step = PriorAuthorityStep::from_name(step_name)
                .ok_or_else(|| PriorAuthorityServiceError::UnknownStep(step_name.to_string()))?;
            self.check_step_allowed(&application, step)?;
            let record = RecordRef::from_segment(record);
            if let Some(record_id) = record.id() {
                if step.is_record_step() && application.additional_cost(record_id).is_none() {
                    return Err(RecordMissing::new("additional cost", &record).into());
                }
            }
        }

        let path = step_path(&application, step_name, record);
        application.navigation.visit(&path);
        self.repository.update(application.clone())?;
        Ok(application)
    }

    pub fn update_step(
        &self,
        provider: &Provider,
        id: &ApplicationId,
        step_name: &str,
        record: Option<&str>,
        params: &FormParams,
    ) -> Result<StepOutcome, PriorAuthorityServiceError> {
        let mut application = self.fetch(provider, id)?;
        let record = RecordRef::from_segment(record);
        let Some(step) = PriorAuthorityStep::from_name(step_name) else {
            warn!(application_id = %application.id, step = step_name, "unknown step submitted");
            let input = DecisionInput {
                application: &application,
                params,
                record: &record,
            };
            return Ok(StepOutcome::Advance(
                self.decisions.destination(step_name, &input),
            ));
        };
        self.check_step_allowed(&application, step)?;

        let segment = match &record {
            RecordRef::Application => None,
            RecordRef::New => Some("new"),
            RecordRef::Existing(id) => Some(id.as_str()),
        };
        let path = step_path(&application, step.name(), segment);
        application.navigation.visit(&path);

        let touched = match apply(step, params, &mut application, &record)? {
            Ok(touched) => touched,
            Err(errors) => {
                info!(application_id = %application.id, step = step.name(), errors = errors.len(), "step invalid");
                return Ok(StepOutcome::Invalid(errors));
            }
        };
        application.updated_at = Utc::now();

        let destination = self.decisions.destination(
            step.name(),
            &DecisionInput {
                application: &application,
                params,
                record: &touched,
            },
        );
        self.repository.update(application.clone())?;
        info!(
            application_id = %application.id,
            step = step.name(),
            next = %destination.controller,
            "step completed"
        );

        if step == PriorAuthorityStep::CheckAnswers && application.status.is_submitted() {
            self.dispatch(&application);
        }
        Ok(StepOutcome::Advance(destination))
    }

    pub fn task_list(
        &self,
        provider: &Provider,
        id: &ApplicationId,
    ) -> Result<Vec<TaskSection>, PriorAuthorityServiceError> {
        let application = self.fetch(provider, id)?;
        Ok(task_list(&application))
    }

    pub fn costs(
        &self,
        provider: &Provider,
        id: &ApplicationId,
    ) -> Result<ApplicationCosts, PriorAuthorityServiceError> {
        let application = self.fetch(provider, id)?;
        Ok(ApplicationCosts::for_application(&application))
    }

    pub fn preview(
        &self,
        provider: &Provider,
        id: &ApplicationId,
        params: &FormParams,
    ) -> Result<QuotePreview, PriorAuthorityServiceError> {
        self.fetch(provider, id)?;
        Ok(QuotePreview::from_params(params))
    }

    pub fn attach_document(
        &self,
        provider: &Provider,
        id: &ApplicationId,
        upload: DocumentUpload,
    ) -> Result<SupportingDocument, PriorAuthorityServiceError> {
        let mut application = self.editable(provider, id)?;
        let document = SupportingDocument {
            id: application.next_record_id("doc"),
            file_name: upload.file_name,
            file_type: upload.file_type,
            file_size: upload.file_size,
            file_path: upload.file_path,
            document_type: "supporting_document".to_string(),
            created_at: Utc::now(),
        };
        application.supporting_documents.push(document.clone());
        application.updated_at = document.created_at;
        self.repository.update(application)?;
        Ok(document)
    }

    /// Drafts can be discarded; submitted applications cannot.
    pub fn delete(
        &self,
        provider: &Provider,
        id: &ApplicationId,
    ) -> Result<(), PriorAuthorityServiceError> {
        let application = self.fetch(provider, id)?;
        if !matches!(
            application.status,
            ApplicationStatus::PreDraft | ApplicationStatus::Draft
        ) {
            return Err(PriorAuthorityServiceError::NotEditable(
                application.status.label(),
            ));
        }
        self.repository.delete(id)?;
        info!(application_id = %id, "prior authority draft deleted");
        Ok(())
    }

    pub fn payload(
        &self,
        provider: &Provider,
        id: &ApplicationId,
    ) -> Result<Value, PriorAuthorityServiceError> {
        let application = self.fetch(provider, id)?;
        Ok(PriorAuthorityPayloadBuilder::new(&application, self.risk.as_ref()).payload())
    }

    fn editable(
        &self,
        provider: &Provider,
        id: &ApplicationId,
    ) -> Result<PriorAuthorityApplication, PriorAuthorityServiceError> {
        let application = self.fetch(provider, id)?;
        if !application.status.is_editable() {
            return Err(PriorAuthorityServiceError::NotEditable(
                application.status.label(),
            ));
        }
        Ok(application)
    }

    fn check_step_allowed(
        &self,
        application: &PriorAuthorityApplication,
        step: PriorAuthorityStep,
    ) -> Result<(), PriorAuthorityServiceError> {
        if !application.status.is_editable() {
            warn!(application_id = %application.id, status = application.status.label(), "application not editable");
            return Err(PriorAuthorityServiceError::NotEditable(
                application.status.label(),
            ));
        }
        if step == PriorAuthorityStep::CheckAnswers && !ready_to_submit(application) {
            warn!(application_id = %application.id, "check answers requested before tasks completed");
            return Err(PriorAuthorityServiceError::Incomplete);
        }
        Ok(())
    }

    fn dispatch(&self, application: &PriorAuthorityApplication) {
        let job = SubmissionJob {
            application_id: application.id.0.clone(),
            application_type: APPLICATION_TYPE,
            payload: PriorAuthorityPayloadBuilder::new(application, self.risk.as_ref()).payload(),
        };
        match self.queue.enqueue(job) {
            Ok(()) => info!(application_id = %application.id, state = application.status.label(), "prior authority application submitted"),
            Err(err) => {
                error!(application_id = %application.id, error = %err, "submission enqueue failed");
                self.reporter.report("prior authority submission", &err);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PriorAuthorityServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    RecordMissing(#[from] RecordMissing),
    #[error("application not found")]
    NotFound,
    #[error("application is {0} and can no longer be edited")]
    NotEditable(&'static str),
    #[error("application has incomplete tasks")]
    Incomplete,
    #[error("unknown step '{0}'")]
    UnknownStep(String),
    #[error("office '{0}' is not one of the provider's offices")]
    OfficeNotPermitted(String),
}
