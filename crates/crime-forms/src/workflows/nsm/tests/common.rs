use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::AppEnvironment;
use crate::workflows::nsm::codes::{
    ClaimType, DisbursementType, MatterType, OutcomeCode, Plea, ReasonForClaim, WorkType,
};
use crate::workflows::nsm::domain::{Claim, ClaimId, FirmOffice, Solicitor, WorkItem};
use crate::workflows::nsm::repository::ClaimRepository;
use crate::workflows::nsm::tasks::NsmTask;
use crate::workflows::nsm::NsmClaimService;
use crate::workflows::steps::ports::{
    ErrorReporter, Provider, QueueError, RepositoryError, SubmissionJob, SubmissionQueue,
};
use crate::workflows::steps::responses::{ErrorHandling, OFFICE_CODES_HEADER, PROVIDER_EMAIL_HEADER};
use crate::workflows::steps::tasks::StepTask;
use crate::workflows::steps::values::YesNo;

pub(super) const OFFICE: &str = "1A123B";
pub(super) const EMAIL: &str = "provider@firm.test";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn money(raw: &str) -> Decimal {
    raw.parse().expect("decimal literal")
}

pub(super) fn provider() -> Provider {
    Provider::new(EMAIL, vec![OFFICE.to_string()])
}

pub(super) fn stranger() -> Provider {
    Provider::new("other@elsewhere.test", vec!["9Z999Z".to_string()])
}

pub(super) fn provider_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(PROVIDER_EMAIL_HEADER, HeaderValue::from_static(EMAIL));
    headers.insert(OFFICE_CODES_HEADER, HeaderValue::from_static(OFFICE));
    headers
}

pub(super) fn draft_claim(id: &str) -> Claim {
    let created = Utc
        .with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    let mut claim = Claim::new(ClaimId(id.to_string()), EMAIL, created);
    claim.office_code = Some(OFFICE.to_string());
    claim
}

pub(super) fn work_item(work_type: WorkType, minutes: i64, on: NaiveDate) -> WorkItem {
    let mut item = WorkItem::blank(String::new());
    item.work_type = Some(work_type);
    item.time_spent = Some(minutes);
    item.completed_on = Some(on);
    item.fee_earner = Some("JB".to_string());
    item
}

/// A claim with every task up to the declaration completed, priced on the
/// standard schedule.
pub(super) fn complete_claim(id: &str) -> Claim {
    let mut claim = draft_claim(id);
    claim.claim_type = Some(ClaimType::NonStandardMagistrate);
    claim.rep_order_date = Some(date(2024, 6, 1));

    claim.firm_office = Some(FirmOffice {
        name: Some("Firm & Co".to_string()),
        account_number: Some(OFFICE.to_string()),
        address_line_1: Some("1 Legal Street".to_string()),
        address_line_2: None,
        town: Some("London".to_string()),
        postcode: Some("SW1A 1AA".to_string()),
        vat_registered: Some(YesNo::Yes),
    });
    claim.solicitor = Some(Solicitor {
        first_name: Some("Jo".to_string()),
        last_name: Some("Bloggs".to_string()),
        reference_number: Some("SOL-1".to_string()),
        contact_first_name: Some("Sam".to_string()),
        contact_last_name: Some("Smith".to_string()),
        contact_email: Some("sam@firm.test".to_string()),
    });

    claim.ufn = Some("010624/001".to_string());
    claim.main_offence = Some("Theft".to_string());
    claim.main_offence_date = Some(date(2024, 5, 20));
    claim.assigned_counsel = Some(YesNo::No);
    claim.unassigned_counsel = Some(YesNo::No);
    claim.agent_instructed = Some(YesNo::No);
    claim.remitted_to_magistrate = Some(YesNo::No);

    let defendant_id = claim.add_defendant();
    let defendant = claim.defendant_mut(&defendant_id).expect("defendant");
    defendant.first_name = Some("Jim".to_string());
    defendant.last_name = Some("Bob".to_string());
    defendant.maat = Some("1234567".to_string());

    claim.first_hearing_date = Some(date(2024, 6, 5));
    claim.number_of_hearing = Some(2);
    claim.court = Some("Westminster Magistrates".to_string());
    claim.office_in_undesignated_area = Some(YesNo::Yes);
    claim.court_in_undesignated_area = Some(YesNo::Yes);
    claim.hearing_outcome = Some(OutcomeCode::Cp01);
    claim.matter_type = Some(MatterType::Theft);

    claim.plea = Some(Plea::Guilty);
    claim.plea_category = Some(Plea::Guilty.category());
    claim.reasons_for_claim = vec![ReasonForClaim::CoreCostsExceedHigherLimit];

    claim.prosecution_evidence = Some(0);
    claim.defence_statement = Some(0);
    claim.number_of_witnesses = Some(0);
    claim.supplemental_claim = Some(YesNo::No);
    claim.preparation_time = Some(YesNo::No);
    claim.work_before = Some(YesNo::No);
    claim.work_after = Some(YesNo::No);

    claim.add_work_item(work_item(WorkType::Preparation, 120, date(2024, 6, 10)));
    claim.add_work_item(work_item(WorkType::Advocacy, 360, date(2024, 6, 10)));

    claim.letters = Some(2);
    claim.calls = Some(3);

    claim.has_disbursements = Some(YesNo::Yes);
    let disbursement_id = claim.add_disbursement();
    let disbursement = claim
        .disbursement_mut(&disbursement_id)
        .expect("disbursement");
    disbursement.disbursement_date = Some(date(2024, 6, 11));
    disbursement.disbursement_type = Some(DisbursementType::Car);
    disbursement.miles = Some(money("11.5"));
    disbursement.total_cost_without_vat = Some(money("5.18"));
    disbursement.details = Some("Travel to court".to_string());
    disbursement.apply_vat = Some(true);
    disbursement.vat_rate = Some(money("0.2"));
    disbursement.vat_amount = Some(money("1.04"));

    claim.is_other_info = Some(YesNo::No);
    claim.concluded = Some(YesNo::No);
    claim.send_by_post = Some(false);
    claim.answer_equality = Some(YesNo::No);

    visit_all_tasks(&mut claim);
    claim
}

/// Record every task page in the navigation history, as a provider walking
/// the task list would.
pub(super) fn visit_all_tasks(claim: &mut Claim) {
    for task in NsmTask::ALL {
        if matches!(task, NsmTask::SolicitorDeclaration | NsmTask::ClaimConfirmation) {
            continue;
        }
        let path = task.path(claim);
        claim.navigation.visit(&path);
    }
}

pub(super) fn build_service() -> (
    NsmClaimService<MemoryClaimRepository, MemoryQueue>,
    Arc<MemoryClaimRepository>,
    Arc<MemoryQueue>,
    Arc<RecordingReporter>,
) {
    let repository = Arc::new(MemoryClaimRepository::default());
    let queue = Arc::new(MemoryQueue::default());
    let reporter = Arc::new(RecordingReporter::default());
    let service = NsmClaimService::new(repository.clone(), queue.clone(), reporter.clone());
    (service, repository, queue, reporter)
}

pub(super) fn error_handling(reporter: Arc<RecordingReporter>) -> ErrorHandling {
    ErrorHandling::new(AppEnvironment::Test, reporter)
}

#[derive(Default, Clone)]
pub(super) struct MemoryClaimRepository {
    pub(super) records: Arc<Mutex<HashMap<ClaimId, Claim>>>,
}

impl MemoryClaimRepository {
    pub(super) fn seed(&self, claim: Claim) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(claim.id.clone(), claim);
    }

    pub(super) fn stored(&self, id: &str) -> Claim {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&ClaimId(id.to_string()))
            .cloned()
            .expect("claim stored")
    }
}

impl ClaimRepository for MemoryClaimRepository {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&claim.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(claim.id.clone(), claim.clone());
        Ok(claim)
    }

    fn update(&self, claim: Claim) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(claim.id.clone(), claim);
        Ok(())
    }

    fn fetch(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<Claim>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct ConflictRepository;

impl ClaimRepository for ConflictRepository {
    fn insert(&self, _claim: Claim) -> Result<Claim, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _claim: Claim) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        Ok(None)
    }

    fn all(&self) -> Result<Vec<Claim>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ClaimRepository for UnavailableRepository {
    fn insert(&self, _claim: Claim) -> Result<Claim, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _claim: Claim) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Claim>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryQueue {
    jobs: Mutex<Vec<SubmissionJob>>,
    closed: bool,
}

impl MemoryQueue {
    pub(super) fn closed() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            closed: true,
        }
    }

    pub(super) fn jobs(&self) -> Vec<SubmissionJob> {
        self.jobs.lock().expect("queue mutex poisoned").clone()
    }
}

impl SubmissionQueue for MemoryQueue {
    fn enqueue(&self, job: SubmissionJob) -> Result<(), QueueError> {
        if self.closed {
            return Err(QueueError::Closed);
        }
        self.jobs.lock().expect("queue mutex poisoned").push(job);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct RecordingReporter {
    reports: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(super) fn reports(&self) -> Vec<String> {
        self.reports.lock().expect("reporter mutex poisoned").clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, context: &str, error: &(dyn std::error::Error + 'static)) {
        self.reports
            .lock()
            .expect("reporter mutex poisoned")
            .push(format!("{context}: {error}"));
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
