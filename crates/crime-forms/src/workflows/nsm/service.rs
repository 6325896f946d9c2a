use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use super::decisions::NsmDecisionTree;
use super::domain::{Claim, ClaimId, ClaimStatus, SupportingDocument, WorkItem};
use super::forms::{apply, step_path, NsmStep};
use super::payload::{NsmPayloadBuilder, APPLICATION_TYPE};
use super::pricing::{CostPreview, CostSummary};
use super::repository::ClaimRepository;
use super::risk::{RiskScorer, RuleBasedRisk};
use super::syncer::{AssessmentSyncer, SyncReport};
use super::tasks::{ready_for_declaration, task_list, TaskSection};
use crate::workflows::steps::decisions::{DecisionInput, DecisionTree, Destination};
use crate::workflows::steps::forms::{FormErrors, FormParams, RecordMissing, RecordRef};
use crate::workflows::steps::ports::{
    ErrorReporter, Provider, RepositoryError, SubmissionJob, SubmissionQueue,
};

/// Page shown after the declaration; visiting it never edits the claim.
const CONFIRMATION_PAGE: &str = "claim_confirmation";

/// Result of submitting one step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advance(Destination),
    Invalid(FormErrors),
}

/// File metadata recorded against a claim after upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub file_path: String,
}

/// Claim listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimSummary {
    pub id: ClaimId,
    pub ufn: Option<String>,
    pub status: &'static str,
    pub office_code: Option<String>,
    pub main_defendant: Option<String>,
}

impl ClaimSummary {
    fn of(claim: &Claim) -> Self {
        Self {
            id: claim.id.clone(),
            ufn: claim.ufn.clone(),
            status: claim.status.label(),
            office_code: claim.office_code.clone(),
            main_defendant: claim.main_defendant().map(|defendant| defendant.full_name()),
        }
    }
}

/// Service driving the claim workflow over a repository and the submission queue.
pub struct NsmClaimService<R, Q> {
    repository: Arc<R>,
    queue: Arc<Q>,
    reporter: Arc<dyn ErrorReporter>,
    risk: Arc<dyn RiskScorer>,
    decisions: NsmDecisionTree,
}

static CLAIM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_claim_id() -> ClaimId {
    let id = CLAIM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ClaimId(format!("claim-{id:06}"))
}

impl<R, Q> NsmClaimService<R, Q>
where
    R: ClaimRepository + 'static,
    Q: SubmissionQueue + 'static,
{
    pub fn new(repository: Arc<R>, queue: Arc<Q>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            repository,
            queue,
            reporter,
            risk: Arc::new(RuleBasedRisk::default()),
            decisions: NsmDecisionTree,
        }
    }

    pub fn with_risk(mut self, risk: Arc<dyn RiskScorer>) -> Self {
        self.risk = risk;
        self
    }

    /// Start a draft claim owned by the provider.
    ///
    /// Without an explicit office the provider's only office is used, if they
    /// have exactly one.
    pub fn create(
        &self,
        provider: &Provider,
        office_code: Option<String>,
    ) -> Result<Claim, NsmServiceError> {
        let office_code = match office_code {
            Some(code) if provider.office_codes.contains(&code) => Some(code),
            Some(code) => return Err(NsmServiceError::OfficeNotPermitted(code)),
            None if provider.office_codes.len() == 1 => provider.office_codes.first().cloned(),
            None => None,
        };

        let mut claim = Claim::new(next_claim_id(), provider.email.clone(), Utc::now());
        claim.office_code = office_code;
        let stored = self.repository.insert(claim)?;
        info!(claim_id = %stored.id, submitter = %stored.submitter, "claim created");
        Ok(stored)
    }

    /// Claims visible to the provider, most recently updated first.
    pub fn list(&self, provider: &Provider) -> Result<Vec<ClaimSummary>, NsmServiceError> {
        let mut claims: Vec<Claim> = self
            .repository
            .all()?
            .into_iter()
            .filter(|claim| provider.can_see(claim.office_code.as_deref(), &claim.submitter))
            .collect();
        claims.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(claims.iter().map(ClaimSummary::of).collect())
    }

    pub fn fetch(&self, provider: &Provider, id: &ClaimId) -> Result<Claim, NsmServiceError> {
        let claim = self
            .repository
            .fetch(id)?
            .ok_or(NsmServiceError::NotFound)?;
        if !provider.can_see(claim.office_code.as_deref(), &claim.submitter) {
            return Err(NsmServiceError::NotFound);
        }
        Ok(claim)
    }

    /// Open a step page, recording it in the navigation history.
    pub fn visit_step(
        &self,
        provider: &Provider,
        id: &ClaimId,
        step_name: &str,
        record: Option<&str>,
    ) -> Result<Claim, NsmServiceError> {
        let mut claim = self.fetch(provider, id)?;
        if step_name != CONFIRMATION_PAGE {
            let step = NsmStep::from_name(step_name)
                .ok_or_else(|| NsmServiceError::UnknownStep(step_name.to_string()))?;
            self.check_step_allowed(&claim, step)?;
            if step.is_record_step() {
                ensure_record(&claim, step, &RecordRef::from_segment(record))?;
            }
        }

        let path = step_path(&claim, step_name, record);
        claim.navigation.visit(&path);
        self.repository.update(claim.clone())?;
        Ok(claim)
    }

    /// Validate and persist one step, then decide where the provider goes next.
    pub fn update_step(
        &self,
        provider: &Provider,
        id: &ClaimId,
        step_name: &str,
        record: Option<&str>,
        params: &FormParams,
    ) -> Result<StepOutcome, NsmServiceError> {
        let mut claim = self.fetch(provider, id)?;
        let record = RecordRef::from_segment(record);
        let Some(step) = NsmStep::from_name(step_name) else {
            // Nothing is saved; the decision tree's fallback picks the page.
            warn!(claim_id = %claim.id, step = step_name, "unknown step submitted");
            let input = DecisionInput {
                application: &claim,
                params,
                record: &record,
            };
            return Ok(StepOutcome::Advance(
                self.decisions.destination(step_name, &input),
            ));
        };
        self.check_step_allowed(&claim, step)?;

        let path = step_path(&claim, step.name(), record_segment(&record));
        claim.navigation.visit(&path);

        let touched = match apply(step, params, &mut claim, &record)? {
            Ok(touched) => touched,
            Err(errors) => {
                info!(claim_id = %claim.id, step = step.name(), errors = errors.len(), "step invalid");
                return Ok(StepOutcome::Invalid(errors));
            }
        };
        claim.updated_at = Utc::now();

        let destination = self.decisions.destination(
            step.name(),
            &DecisionInput {
                application: &claim,
                params,
                record: &touched,
            },
        );
        self.repository.update(claim.clone())?;
        info!(
            claim_id = %claim.id,
            step = step.name(),
            next = %destination.controller,
            "step completed"
        );

        if step == NsmStep::SolicitorDeclaration {
            self.dispatch(&claim);
        }
        Ok(StepOutcome::Advance(destination))
    }

    pub fn task_list(
        &self,
        provider: &Provider,
        id: &ClaimId,
    ) -> Result<Vec<TaskSection>, NsmServiceError> {
        let claim = self.fetch(provider, id)?;
        Ok(task_list(&claim))
    }

    pub fn cost_summary(
        &self,
        provider: &Provider,
        id: &ClaimId,
    ) -> Result<CostSummary, NsmServiceError> {
        let claim = self.fetch(provider, id)?;
        Ok(CostSummary::for_claim(&claim))
    }

    pub fn preview(
        &self,
        provider: &Provider,
        id: &ClaimId,
        params: &FormParams,
    ) -> Result<CostPreview, NsmServiceError> {
        let claim = self.fetch(provider, id)?;
        Ok(CostPreview::from_params(&claim, params))
    }

    pub fn attach_document(
        &self,
        provider: &Provider,
        id: &ClaimId,
        upload: DocumentUpload,
    ) -> Result<SupportingDocument, NsmServiceError> {
        let mut claim = self.editable(provider, id)?;
        let document = SupportingDocument {
            id: claim.next_record_id("doc"),
            file_name: upload.file_name,
            file_type: upload.file_type,
            file_size: upload.file_size,
            file_path: upload.file_path,
            document_type: "supporting_evidence".to_string(),
            created_at: Utc::now(),
        };
        claim.supporting_evidence.push(document.clone());
        claim.updated_at = document.created_at;
        self.repository.update(claim)?;
        Ok(document)
    }

    /// Copy a work item into a new record, returning the new id.
    pub fn duplicate_work_item(
        &self,
        provider: &Provider,
        id: &ClaimId,
        work_item_id: &str,
    ) -> Result<String, NsmServiceError> {
        let mut claim = self.editable(provider, id)?;
        let source = claim.work_item(work_item_id).cloned().ok_or_else(|| {
            RecordMissing::new("work item", &RecordRef::Existing(work_item_id.to_string()))
        })?;

        let mut copy = WorkItem::blank(String::new());
        copy.work_type = source.work_type;
        copy.time_spent = source.time_spent;
        copy.completed_on = source.completed_on;
        copy.fee_earner = source.fee_earner;
        copy.uplift = source.uplift;

        let new_id = claim.add_work_item(copy);
        claim.updated_at = Utc::now();
        self.repository.update(claim)?;
        Ok(new_id)
    }

    /// Apply an assessment callback from the app store.
    ///
    /// An `application_state` carrying an assessed state moves the claim into
    /// it before the line items are synced.
    pub fn sync_assessment(
        &self,
        id: &ClaimId,
        record: &Value,
    ) -> Result<SyncReport, NsmServiceError> {
        let mut claim = self
            .repository
            .fetch(id)?
            .ok_or(NsmServiceError::NotFound)?;

        if let Some(state) = record.get("application_state") {
            match ClaimStatus::deserialize(state) {
                Ok(status) if status.is_assessed() => claim.status = status,
                Ok(status) => warn!(claim_id = %claim.id, state = status.label(), "ignoring non-assessed state"),
                Err(err) => warn!(claim_id = %claim.id, error = %err, "unreadable application state"),
            }
        }

        let report = AssessmentSyncer::new(self.reporter.as_ref()).sync(&mut claim, record);
        claim.updated_at = Utc::now();
        self.repository.update(claim)?;
        Ok(report)
    }

    pub fn payload(&self, provider: &Provider, id: &ClaimId) -> Result<Value, NsmServiceError> {
        let claim = self.fetch(provider, id)?;
        Ok(NsmPayloadBuilder::new(&claim, self.risk.as_ref()).payload())
    }

    fn editable(&self, provider: &Provider, id: &ClaimId) -> Result<Claim, NsmServiceError> {
        let claim = self.fetch(provider, id)?;
        if !claim.status.is_editable() {
            return Err(NsmServiceError::NotEditable(claim.status.label()));
        }
        Ok(claim)
    }

    fn check_step_allowed(&self, claim: &Claim, step: NsmStep) -> Result<(), NsmServiceError> {
        if !claim.status.is_editable() {
            warn!(claim_id = %claim.id, status = claim.status.label(), "claim not editable");
            return Err(NsmServiceError::NotEditable(claim.status.label()));
        }
        if step == NsmStep::SolicitorDeclaration && !ready_for_declaration(claim) {
            warn!(claim_id = %claim.id, "declaration requested before tasks completed");
            return Err(NsmServiceError::Incomplete);
        }
        Ok(())
    }

    /// Hand the submission to the queue; failures are reported, never raised.
    fn dispatch(&self, claim: &Claim) {
        let job = SubmissionJob {
            application_id: claim.id.0.clone(),
            application_type: APPLICATION_TYPE,
            payload: NsmPayloadBuilder::new(claim, self.risk.as_ref()).payload(),
        };
        match self.queue.enqueue(job) {
            Ok(()) => info!(claim_id = %claim.id, state = claim.status.label(), "claim submitted"),
            Err(err) => {
                error!(claim_id = %claim.id, error = %err, "submission enqueue failed");
                self.reporter.report("claim submission", &err);
            }
        }
    }
}

fn record_segment(record: &RecordRef) -> Option<&str> {
    match record {
        RecordRef::Application => None,
        RecordRef::New => Some("new"),
        RecordRef::Existing(id) => Some(id),
    }
}

fn ensure_record(claim: &Claim, step: NsmStep, record: &RecordRef) -> Result<(), RecordMissing> {
    let Some(id) = record.id() else {
        return Ok(());
    };
    let exists = match step {
        NsmStep::DefendantDetails | NsmStep::DefendantDelete => {
            claim.defendants.iter().any(|defendant| defendant.id == id)
        }
        NsmStep::WorkItem | NsmStep::WorkItemDelete => claim.work_item(id).is_some(),
        NsmStep::DisbursementType | NsmStep::DisbursementCost | NsmStep::DisbursementDelete => {
            claim.disbursement(id).is_some()
        }
        _ => true,
    };
    if exists {
        Ok(())
    } else {
        Err(RecordMissing::new("record", record))
    }
}

/// Error raised by the claim service.
#[derive(Debug, thiserror::Error)]
pub enum NsmServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    RecordMissing(#[from] RecordMissing),
    #[error("claim not found")]
    NotFound,
    #[error("claim is {0} and can no longer be edited")]
    NotEditable(&'static str),
    #[error("claim has incomplete tasks")]
    Incomplete,
    #[error("unknown step '{0}'")]
    UnknownStep(String),
    #[error("office '{0}' is not one of the provider's offices")]
    OfficeNotPermitted(String),
}
