use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::AppEnvironment;
use crate::workflows::prior_authority::codes::ServiceType;
use crate::workflows::prior_authority::domain::{
    ApplicationId, ApplicationStatus, CostBasis, PriorAuthorityApplication, Quote,
};
use crate::workflows::prior_authority::repository::PriorAuthorityRepository;
use crate::workflows::prior_authority::tasks::PriorAuthorityTask;
use crate::workflows::prior_authority::PriorAuthorityService;
use crate::workflows::steps::forms::FormParams;
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

pub(super) fn id(raw: &str) -> ApplicationId {
    ApplicationId(raw.to_string())
}

pub(super) fn draft_application(raw_id: &str) -> PriorAuthorityApplication {
    let created = Utc
        .with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    let mut application = PriorAuthorityApplication::new(id(raw_id), EMAIL, created);
    application.office_code = Some(OFFICE.to_string());
    application.status = ApplicationStatus::Draft;
    application.ufn = Some("010624/001".to_string());
    application
}

/// A psychiatrist quoted at £90/hour for 2h30 with an hour's travel at
/// £40/hour.
pub(super) fn quote() -> Quote {
    Quote {
        service_type: Some(ServiceType::PsychiatricReport),
        custom_service_name: None,
        contact_first_name: Some("Ada".to_string()),
        contact_last_name: Some("Lovelace".to_string()),
        organisation: Some("Expert Reports Ltd".to_string()),
        town: Some("Leeds".to_string()),
        postcode: Some("LS1 4AP".to_string()),
        cost: CostBasis::per_hour(Some(money("90.00")), Some(150)),
        travel_time: Some(60),
        travel_cost_per_hour: Some(money("40.00")),
    }
}

pub(super) fn quote_params() -> FormParams {
    FormParams::new()
        .with("service_type", "psychiatric_report")
        .with("contact_first_name", "Ada")
        .with("contact_last_name", "Lovelace")
        .with("organisation", "Expert Reports Ltd")
        .with("town", "Leeds")
        .with("postcode", "ls1 4ap")
        .with("cost_type", "per_hour")
        .with("period_hours", "2")
        .with("period_minutes", "30")
        .with("cost_per_hour", "90.00")
}

/// Everything filled in up to the reason why; check answers is next.
pub(super) fn complete_application(raw_id: &str) -> PriorAuthorityApplication {
    let mut application = draft_application(raw_id);
    application.contact_name = Some("Sam Smith".to_string());
    application.contact_email = Some("sam@firm.test".to_string());
    application.firm_name = Some("Firm & Co".to_string());
    application.firm_account_number = Some(OFFICE.to_string());
    application.client_first_name = Some("Jim".to_string());
    application.client_last_name = Some("Bob".to_string());
    application.client_date_of_birth = Some(date(1990, 3, 14));
    application.primary_quote = quote();

    let cost_id = application.add_additional_cost();
    let cost = application
        .additional_cost_mut(&cost_id)
        .expect("additional cost");
    cost.name = Some("Translation".to_string());
    cost.description = Some("Translate the client's statement".to_string());
    cost.cost = CostBasis::per_item(Some(money("3.50")), Some(12));
    application.additional_costs_still_to_add = Some(YesNo::No);

    application.reason_why = Some("Fitness to plead is in issue".to_string());
    visit_all_tasks(&mut application);
    application
}

pub(super) fn visit_all_tasks(application: &mut PriorAuthorityApplication) {
    for task in PriorAuthorityTask::ALL {
        if task == PriorAuthorityTask::CheckAnswers {
            continue;
        }
        let path = task.path(application);
        application.navigation.visit(&path);
    }
}

pub(super) fn build_service() -> (
    PriorAuthorityService<MemoryApplicationRepository, MemoryQueue>,
    Arc<MemoryApplicationRepository>,
    Arc<MemoryQueue>,
    Arc<RecordingReporter>,
) {
    let repository = Arc::new(MemoryApplicationRepository::default());
    let queue = Arc::new(MemoryQueue::default());
    let reporter = Arc::new(RecordingReporter::default());
    let service = PriorAuthorityService::new(repository.clone(), queue.clone(), reporter.clone());
    (service, repository, queue, reporter)
}

pub(super) fn error_handling(reporter: Arc<RecordingReporter>) -> ErrorHandling {
    ErrorHandling::new(AppEnvironment::Test, reporter)
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplicationRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, PriorAuthorityApplication>>>,
}

impl MemoryApplicationRepository {
    pub(super) fn seed(&self, application: PriorAuthorityApplication) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(application.id.clone(), application);
    }

    pub(super) fn stored(&self, raw_id: &str) -> Option<PriorAuthorityApplication> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&id(raw_id))
            .cloned()
    }
}

impl PriorAuthorityRepository for MemoryApplicationRepository {
    fn insert(
        &self,
        application: PriorAuthorityApplication,
    ) -> Result<PriorAuthorityApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: PriorAuthorityApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<PriorAuthorityApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<PriorAuthorityApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl PriorAuthorityRepository for UnavailableRepository {
    fn insert(
        &self,
        _application: PriorAuthorityApplication,
    ) -> Result<PriorAuthorityApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: PriorAuthorityApplication) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<PriorAuthorityApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<PriorAuthorityApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &ApplicationId) -> Result<(), RepositoryError> {
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
