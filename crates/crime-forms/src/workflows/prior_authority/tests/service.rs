use std::sync::Arc;

use super::common::*;
use crate::workflows::nsm::service::{DocumentUpload, StepOutcome};
use crate::workflows::prior_authority::domain::ApplicationStatus;
use crate::workflows::prior_authority::service::PriorAuthorityServiceError;
use crate::workflows::prior_authority::PriorAuthorityService;
use crate::workflows::steps::decisions::Destination;
use crate::workflows::steps::forms::{ErrorKind, FormParams};
use crate::workflows::steps::ports::RepositoryError;

fn confirmations() -> FormParams {
    FormParams::new()
        .with("confirm_excluding_vat", "true")
        .with("confirm_travel_expenditure", "true")
}

#[test]
fn new_applications_start_as_unlisted_pre_drafts() {
    let (service, repository, _, _) = build_service();

    let application = service.create(&provider(), None).expect("application created");

    assert_eq!(application.status, ApplicationStatus::PreDraft);
    assert_eq!(application.office_code.as_deref(), Some(OFFICE));
    assert!(repository.stored(&application.id.0).is_some());
    assert!(service.list(&provider()).expect("list").is_empty());
}

#[test]
fn a_ufn_makes_the_application_listed() {
    let (service, _, _, _) = build_service();
    let application = service.create(&provider(), None).expect("application created");

    let outcome = service
        .update_step(
            &provider(),
            &application.id,
            "ufn",
            None,
            &FormParams::new().with("ufn", "010624/001"),
        )
        .expect("step handled");

    assert_eq!(outcome, StepOutcome::Advance(Destination::edit("case_contact")));
    let listed = service.list(&provider()).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, "draft");
}

#[test]
fn create_rejects_offices_the_provider_does_not_hold() {
    let (service, _, _, _) = build_service();

    match service.create(&provider(), Some("9Z999Z".to_string())) {
        Err(PriorAuthorityServiceError::OfficeNotPermitted(code)) => assert_eq!(code, "9Z999Z"),
        other => panic!("expected office rejection, got {other:?}"),
    }
}

#[test]
fn applications_are_hidden_from_other_offices() {
    let (service, repository, _, _) = build_service();
    repository.seed(draft_application("pa-svc-hidden"));

    match service.fetch(&stranger(), &id("pa-svc-hidden")) {
        Err(PriorAuthorityServiceError::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(service.list(&stranger()).expect("list").is_empty());
}

#[test]
fn invalid_steps_report_errors_without_saving() {
    let (service, repository, _, _) = build_service();
    repository.seed(draft_application("pa-svc-invalid"));

    let outcome = service
        .update_step(
            &provider(),
            &id("pa-svc-invalid"),
            "client_detail",
            None,
            &FormParams::new(),
        )
        .expect("step handled");

    match outcome {
        StepOutcome::Invalid(errors) => {
            assert!(errors.of_kind("client_first_name", ErrorKind::Blank));
        }
        other => panic!("expected invalid outcome, got {other:?}"),
    }
    let stored = repository.stored("pa-svc-invalid").expect("stored");
    assert!(stored.client_first_name.is_none());
}

#[test]
fn check_answers_waits_for_every_task() {
    let (service, repository, _, _) = build_service();
    repository.seed(draft_application("pa-svc-early"));

    match service.update_step(
        &provider(),
        &id("pa-svc-early"),
        "check_answers",
        None,
        &confirmations(),
    ) {
        Err(PriorAuthorityServiceError::Incomplete) => {}
        other => panic!("expected incomplete, got {other:?}"),
    }
}

#[test]
fn submitting_queues_the_crm4_document() {
    let (service, repository, queue, _) = build_service();
    repository.seed(complete_application("pa-svc-submit"));

    let outcome = service
        .update_step(
            &provider(),
            &id("pa-svc-submit"),
            "check_answers",
            None,
            &confirmations(),
        )
        .expect("step handled");

    assert_eq!(
        outcome,
        StepOutcome::Advance(Destination::show("submission_confirmation"))
    );
    let stored = repository.stored("pa-svc-submit").expect("stored");
    assert_eq!(stored.status, ApplicationStatus::Submitted);

    let jobs = queue.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].application_type, "crm4");
    assert_eq!(jobs[0].payload["application_state"], "submitted");
}

#[test]
fn saving_a_draft_queues_nothing() {
    let (service, repository, queue, _) = build_service();
    repository.seed(complete_application("pa-svc-draft"));

    service
        .update_step(
            &provider(),
            &id("pa-svc-draft"),
            "check_answers",
            None,
            &FormParams::new().with("commit_draft", "true"),
        )
        .expect("step handled");

    assert_eq!(
        repository.stored("pa-svc-draft").expect("stored").status,
        ApplicationStatus::Draft
    );
    assert!(queue.jobs().is_empty());
}

#[test]
fn a_closed_queue_is_reported_but_the_submission_stands() {
    let repository = Arc::new(MemoryApplicationRepository::default());
    let reporter = Arc::new(RecordingReporter::default());
    let service = PriorAuthorityService::new(
        repository.clone(),
        Arc::new(MemoryQueue::closed()),
        reporter.clone(),
    );
    repository.seed(complete_application("pa-svc-closed"));

    service
        .update_step(
            &provider(),
            &id("pa-svc-closed"),
            "check_answers",
            None,
            &confirmations(),
        )
        .expect("step handled");

    assert_eq!(
        repository.stored("pa-svc-closed").expect("stored").status,
        ApplicationStatus::Submitted
    );
    assert_eq!(reporter.reports().len(), 1);
}

#[test]
fn submitted_applications_are_locked() {
    let (service, repository, _, _) = build_service();
    let mut application = complete_application("pa-svc-locked");
    application.status = ApplicationStatus::Submitted;
    repository.seed(application);

    match service.update_step(
        &provider(),
        &id("pa-svc-locked"),
        "reason_why",
        None,
        &FormParams::new().with("reason_why", "Changed my mind"),
    ) {
        Err(PriorAuthorityServiceError::NotEditable("submitted")) => {}
        other => panic!("expected not editable, got {other:?}"),
    }
    match service.delete(&provider(), &id("pa-svc-locked")) {
        Err(PriorAuthorityServiceError::NotEditable(_)) => {}
        other => panic!("expected not editable, got {other:?}"),
    }
}

#[test]
fn drafts_can_be_deleted() {
    let (service, repository, _, _) = build_service();
    repository.seed(draft_application("pa-svc-delete"));

    service
        .delete(&provider(), &id("pa-svc-delete"))
        .expect("draft deleted");

    assert!(repository.stored("pa-svc-delete").is_none());
}

#[test]
fn visiting_an_unknown_cost_is_a_missing_record() {
    let (service, repository, _, _) = build_service();
    repository.seed(draft_application("pa-svc-visit"));

    match service.visit_step(
        &provider(),
        &id("pa-svc-visit"),
        "additional_cost_detail",
        Some("cost-42"),
    ) {
        Err(PriorAuthorityServiceError::RecordMissing(missing)) => assert_eq!(missing.id, "cost-42"),
        other => panic!("expected missing record, got {other:?}"),
    }
}

#[test]
fn visiting_a_step_records_it() {
    let (service, repository, _, _) = build_service();
    repository.seed(draft_application("pa-svc-nav"));

    service
        .visit_step(&provider(), &id("pa-svc-nav"), "case_contact", None)
        .expect("visited");

    let stored = repository.stored("pa-svc-nav").expect("stored");
    assert!(stored
        .navigation
        .contains("/prior-authority/applications/pa-svc-nav/steps/case_contact"));
}

#[test]
fn documents_are_attached_with_fresh_ids() {
    let (service, repository, _, _) = build_service();
    repository.seed(draft_application("pa-svc-doc"));

    let document = service
        .attach_document(
            &provider(),
            &id("pa-svc-doc"),
            DocumentUpload {
                file_name: "quote.pdf".to_string(),
                file_type: "application/pdf".to_string(),
                file_size: 2048,
                file_path: "uploads/quote.pdf".to_string(),
            },
        )
        .expect("document attached");

    assert_eq!(document.id, "doc-1");
    assert_eq!(
        repository
            .stored("pa-svc-doc")
            .expect("stored")
            .supporting_documents
            .len(),
        1
    );
}

#[test]
fn previews_price_unsaved_input() {
    let (service, repository, _, _) = build_service();
    repository.seed(draft_application("pa-svc-preview"));

    let preview = service
        .preview(
            &provider(),
            &id("pa-svc-preview"),
            &FormParams::new()
                .with("cost_type", "per_item")
                .with("cost_per_item", "4.00")
                .with("items", "5"),
        )
        .expect("preview");

    assert_eq!(preview.cost, money("20.00"));
}

#[test]
fn repository_outages_surface_as_errors() {
    let service = PriorAuthorityService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryQueue::default()),
        Arc::new(RecordingReporter::default()),
    );

    match service.list(&provider()) {
        Err(PriorAuthorityServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable, got {other:?}"),
    }
}
