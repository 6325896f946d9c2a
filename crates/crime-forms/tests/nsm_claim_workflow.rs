use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crime_forms::workflows::nsm::{
    Claim, ClaimId, ClaimRepository, NsmClaimService, NsmServiceError, StepOutcome,
};
use crime_forms::workflows::steps::{
    Action, ErrorReporter, FormParams, Provider, QueueError, RepositoryError, SubmissionJob,
    SubmissionQueue, TaskStatus,
};
use rust_decimal::Decimal;

const OFFICE: &str = "1A123B";

#[derive(Default)]
struct Claims(Mutex<HashMap<ClaimId, Claim>>);

impl ClaimRepository for Claims {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError> {
        self.0
            .lock()
            .expect("lock")
            .insert(claim.id.clone(), claim.clone());
        Ok(claim)
    }

    fn update(&self, claim: Claim) -> Result<(), RepositoryError> {
        self.0.lock().expect("lock").insert(claim.id.clone(), claim);
        Ok(())
    }

    fn fetch(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        Ok(self.0.lock().expect("lock").get(id).cloned())
    }

    fn all(&self) -> Result<Vec<Claim>, RepositoryError> {
        Ok(self.0.lock().expect("lock").values().cloned().collect())
    }
}

#[derive(Default)]
struct Jobs(Mutex<Vec<SubmissionJob>>);

impl SubmissionQueue for Jobs {
    fn enqueue(&self, job: SubmissionJob) -> Result<(), QueueError> {
        self.0.lock().expect("lock").push(job);
        Ok(())
    }
}

struct Silent;

impl ErrorReporter for Silent {
    fn report(&self, _context: &str, _error: &(dyn std::error::Error + 'static)) {}
}

fn service() -> NsmClaimService<Claims, Jobs> {
    NsmClaimService::new(
        Arc::new(Claims::default()),
        Arc::new(Jobs::default()),
        Arc::new(Silent),
    )
}

fn provider() -> Provider {
    Provider::new("provider@firm.test", vec![OFFICE.to_string()])
}

fn advance(outcome: Result<StepOutcome, NsmServiceError>) -> (String, Action) {
    match outcome {
        Ok(StepOutcome::Advance(destination)) => (destination.controller, destination.action),
        other => panic!("expected the step to advance, got {other:?}"),
    }
}

fn firm_details() -> FormParams {
    FormParams::new()
        .with("firm_name", "Firm & Co")
        .with("account_number", OFFICE)
        .with("address_line_1", "1 Legal Street")
        .with("town", "London")
        .with("postcode", "SW1A 1AA")
        .with("vat_registered", "yes")
        .with("solicitor_first_name", "Jo")
        .with("solicitor_last_name", "Bloggs")
        .with("solicitor_reference_number", "SOL-1")
        .with("contact_first_name", "Sam")
        .with("contact_last_name", "Smith")
        .with("contact_email", "sam@firm.test")
}

#[test]
fn early_steps_route_forward_and_price_the_claim() {
    let service = service();
    let provider = provider();
    let claim = service.create(&provider, None).expect("claim created");
    assert_eq!(claim.office_code.as_deref(), Some(OFFICE));

    let claim_type = FormParams::new()
        .with("claim_type", "non_standard_magistrate")
        .with("rep_order_date", "2024-06-01");
    let next = advance(service.update_step(&provider, &claim.id, "claim_type", None, &claim_type));
    assert_eq!(next, ("firm_details".to_string(), Action::Edit));

    let next = advance(service.update_step(&provider, &claim.id, "firm_details", None, &firm_details()));
    assert_eq!(next, ("case_details".to_string(), Action::Edit));

    let work_item = FormParams::new()
        .with("work_type", "preparation")
        .with("time_spent_hours", "2")
        .with("time_spent_minutes", "0")
        .with("completed_on", "2024-06-10")
        .with("fee_earner", "JB");
    let next = advance(service.update_step(&provider, &claim.id, "work_item", Some("new"), &work_item));
    assert_eq!(next, ("work_items".to_string(), Action::Edit));

    let letters_calls = FormParams::new().with("letters", "2").with("calls", "3");
    let next = advance(service.update_step(&provider, &claim.id, "letters_calls", None, &letters_calls));
    assert_eq!(next, ("disbursement_add".to_string(), Action::Edit));

    // 2h preparation at 52.15 plus five letters and calls at 4.09.
    let summary = service.cost_summary(&provider, &claim.id).expect("summary");
    assert_eq!(summary.work_types.len(), 1);
    assert_eq!(summary.work_types[0].minutes, 120);
    assert_eq!(summary.work_types[0].cost, Decimal::new(10430, 2));
    assert_eq!(summary.letters_and_calls, Decimal::new(2045, 2));
    assert_eq!(summary.total, Decimal::new(12475, 2));
    assert_eq!(summary.profit_costs_vat, Decimal::new(2495, 2));

    let stored = service.fetch(&provider, &claim.id).expect("claim");
    assert_eq!(stored.work_items.len(), 1);

    let tasks: Vec<_> = service
        .task_list(&provider, &claim.id)
        .expect("tasks")
        .into_iter()
        .flat_map(|section| section.tasks)
        .collect();
    let firm = tasks
        .iter()
        .find(|task| task.name == "firm_details")
        .expect("firm details task");
    assert_eq!(firm.status, TaskStatus::Completed);
}

#[test]
fn invalid_steps_keep_the_claim_unchanged() {
    let service = service();
    let provider = provider();
    let claim = service.create(&provider, None).expect("claim created");

    let blank = FormParams::new().with("firm_name", "Firm & Co");
    match service.update_step(&provider, &claim.id, "firm_details", None, &blank) {
        Ok(StepOutcome::Invalid(errors)) => {
            assert!(errors.messages().contains_key("town"));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }

    let stored = service.fetch(&provider, &claim.id).expect("claim");
    assert!(stored.firm_office.is_none());
}

#[test]
fn claims_stay_within_the_provider_offices() {
    let service = service();
    let provider = provider();
    let claim = service.create(&provider, None).expect("claim created");

    match service.create(&provider, Some("9Z999Z".to_string())) {
        Err(NsmServiceError::OfficeNotPermitted(code)) => assert_eq!(code, "9Z999Z"),
        other => panic!("expected office rejection, got {other:?}"),
    }

    let stranger = Provider::new("other@elsewhere.test", vec!["2B222B".to_string()]);
    match service.fetch(&stranger, &claim.id) {
        Err(NsmServiceError::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(service.list(&stranger).expect("list").is_empty());
    assert_eq!(service.list(&provider).expect("list").len(), 1);
}
