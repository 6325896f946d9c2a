use rust_decimal::Decimal;

use super::common::*;
use crate::workflows::prior_authority::codes::{CostType, ServiceType};
use crate::workflows::prior_authority::domain::ApplicationStatus;
use crate::workflows::prior_authority::forms::{
    apply, AdditionalCostDetailForm, PriorAuthorityStep,
};
use crate::workflows::prior_authority::pricing::ApplicationCosts;
use crate::workflows::steps::forms::{
    ErrorKind, FormErrors, FormParams, RecordMissing, RecordRef, StepForm, MAX_AMOUNT,
    MAX_HOURS, MAX_ITEMS,
};

fn submit(
    step: PriorAuthorityStep,
    params: &FormParams,
    application: &mut crate::workflows::prior_authority::PriorAuthorityApplication,
) -> Result<RecordRef, FormErrors> {
    apply(step, params, application, &RecordRef::Application).expect("record resolved")
}

#[test]
fn a_valid_ufn_promotes_the_pre_draft() {
    let mut application = draft_application("pa-form-1");
    application.status = ApplicationStatus::PreDraft;
    application.ufn = None;

    let params = FormParams::new().with("ufn", "010624/001");
    submit(PriorAuthorityStep::Ufn, &params, &mut application).expect("valid ufn");

    assert_eq!(application.status, ApplicationStatus::Draft);
    assert_eq!(application.ufn.as_deref(), Some("010624/001"));
}

#[test]
fn malformed_ufns_are_rejected() {
    let mut application = draft_application("pa-form-2");
    let params = FormParams::new().with("ufn", "1/2");

    match submit(PriorAuthorityStep::Ufn, &params, &mut application) {
        Err(errors) => assert!(errors.of_kind("ufn", ErrorKind::Invalid)),
        other => panic!("expected invalid ufn, got {other:?}"),
    }
}

#[test]
fn account_numbers_are_uppercased() {
    let mut application = draft_application("pa-form-3");
    let params = FormParams::new()
        .with("contact_name", "Sam Smith")
        .with("contact_email", "sam@firm.test")
        .with("firm_name", "Firm & Co")
        .with("firm_account_number", "1a123b");

    submit(PriorAuthorityStep::CaseContact, &params, &mut application).expect("valid contact");

    assert_eq!(application.firm_account_number.as_deref(), Some("1A123B"));
}

#[test]
fn client_dates_of_birth_must_be_in_the_past() {
    let mut application = draft_application("pa-form-4");
    let params = FormParams::new()
        .with("client_first_name", "Jim")
        .with("client_last_name", "Bob")
        .with("client_date_of_birth", "2999-01-01");

    match submit(PriorAuthorityStep::ClientDetail, &params, &mut application) {
        Err(errors) => assert!(errors.of_kind("client_date_of_birth", ErrorKind::FutureDate)),
        other => panic!("expected future date error, got {other:?}"),
    }
}

#[test]
fn an_hourly_quote_is_stored_in_minutes() {
    let mut application = draft_application("pa-form-5");

    submit(PriorAuthorityStep::PrimaryQuote, &quote_params(), &mut application)
        .expect("valid quote");

    let quote = &application.primary_quote;
    assert_eq!(quote.service_type, Some(ServiceType::PsychiatricReport));
    assert_eq!(quote.cost.cost_type, Some(CostType::PerHour));
    assert_eq!(quote.cost.period, Some(150));
    assert_eq!(quote.cost.cost_per_hour, Some(money("90.00")));
    assert_eq!(quote.postcode.as_deref(), Some("LS1 4AP"));
    assert_eq!(quote.travel_time, None);
}

#[test]
fn custom_services_need_a_name() {
    let mut application = draft_application("pa-form-6");
    let params = quote_params().with("service_type", "custom");

    match submit(PriorAuthorityStep::PrimaryQuote, &params, &mut application) {
        Err(errors) => assert!(errors.of_kind("custom_service_name", ErrorKind::Blank)),
        other => panic!("expected blank custom name, got {other:?}"),
    }
}

#[test]
fn partial_travel_details_are_rejected() {
    let mut application = draft_application("pa-form-7");
    let params = quote_params().with("travel_time_hours", "1");

    match submit(PriorAuthorityStep::PrimaryQuote, &params, &mut application) {
        Err(errors) => assert!(errors.on("travel_cost_per_hour")),
        other => panic!("expected travel cost error, got {other:?}"),
    }
}

#[test]
fn per_item_quotes_need_at_least_one_item() {
    let mut application = draft_application("pa-form-8");
    let params = quote_params()
        .with("cost_type", "per_item")
        .with("cost_per_item", "3.50")
        .with("items", "0");

    match submit(PriorAuthorityStep::PrimaryQuote, &params, &mut application) {
        Err(errors) => assert!(errors.on("items")),
        other => panic!("expected items error, got {other:?}"),
    }
}

#[test]
fn declining_more_costs_requires_existing_costs_to_be_complete() {
    let mut application = draft_application("pa-form-9");
    application.add_additional_cost();
    let params = FormParams::new().with("additional_costs_still_to_add", "no");

    match submit(PriorAuthorityStep::AdditionalCosts, &params, &mut application) {
        Err(errors) => assert!(errors.of_kind("additional_costs", ErrorKind::Invalid)),
        other => panic!("expected incomplete costs error, got {other:?}"),
    }
}

#[test]
fn a_new_additional_cost_gets_an_id() {
    let mut application = draft_application("pa-form-10");
    let params = FormParams::new()
        .with("name", "Translation")
        .with("description", "Statement translation")
        .with("unit_type", "per_item")
        .with("cost_per_item", "3.50")
        .with("items", "12");

    let record = apply(
        PriorAuthorityStep::AdditionalCostDetail,
        &params,
        &mut application,
        &RecordRef::New,
    )
    .expect("record resolved")
    .expect("valid cost");

    let RecordRef::Existing(cost_id) = record else {
        panic!("expected the new cost id, got {record:?}");
    };
    let cost = application.additional_cost(&cost_id).expect("cost stored");
    assert_eq!(cost.cost.items, Some(12));
}

#[test]
fn editing_a_missing_additional_cost_fails() {
    let mut application = draft_application("pa-form-11");
    let params = FormParams::new()
        .with("name", "Translation")
        .with("description", "Statement translation")
        .with("unit_type", "per_hour")
        .with("period_hours", "1")
        .with("period_minutes", "0")
        .with("cost_per_hour", "20");

    let outcome = apply(
        PriorAuthorityStep::AdditionalCostDetail,
        &params,
        &mut application,
        &RecordRef::Existing("cost-99".to_string()),
    );
    match outcome {
        Err(RecordMissing { .. }) => {}
        other => panic!("expected missing record, got {other:?}"),
    }
}

#[test]
fn check_answers_needs_both_confirmations() {
    let mut application = complete_application("pa-form-12");
    let params = FormParams::new().with("confirm_excluding_vat", "true");

    match submit(PriorAuthorityStep::CheckAnswers, &params, &mut application) {
        Err(errors) => {
            assert!(errors.of_kind("confirm_travel_expenditure", ErrorKind::Accepted));
            assert!(!errors.on("confirm_excluding_vat"));
        }
        other => panic!("expected confirmation error, got {other:?}"),
    }
    assert_eq!(application.status, ApplicationStatus::Draft);
}

#[test]
fn resubmitting_a_sent_back_application_marks_it_updated() {
    let mut application = complete_application("pa-form-13");
    application.status = ApplicationStatus::SentBack;
    let params = FormParams::new()
        .with("confirm_excluding_vat", "true")
        .with("confirm_travel_expenditure", "true");

    submit(PriorAuthorityStep::CheckAnswers, &params, &mut application).expect("confirmed");

    assert_eq!(application.status, ApplicationStatus::ProviderUpdated);
    assert!(application.submitted_at.is_some());
}

#[test]
fn stored_costs_revalidate_against_their_form() {
    let application = complete_application("pa-form-14");
    let cost = &application.additional_costs[0];
    assert!(AdditionalCostDetailForm::from_cost(cost).is_valid(&application));
}

#[test]
fn per_item_quotes_are_capped() {
    let mut application = draft_application("pa-form-15");
    let per_item = |items: String, cost_per_item: &str| {
        quote_params()
            .with("cost_type", "per_item")
            .with("cost_per_item", cost_per_item)
            .with("items", items)
    };

    let oversized = per_item("9000000000000000000".to_string(), "1000000000000");
    match submit(PriorAuthorityStep::PrimaryQuote, &oversized, &mut application) {
        Err(errors) => {
            assert!(errors.of_kind("items", ErrorKind::LessThanOrEqualTo));
            assert!(errors.of_kind("cost_per_item", ErrorKind::LessThanOrEqualTo));
        }
        other => panic!("expected oversized quote to be rejected, got {other:?}"),
    }
    assert_eq!(application.primary_quote.cost.items, None);

    let over_cap = per_item((MAX_ITEMS + 1).to_string(), "3.50");
    match submit(PriorAuthorityStep::PrimaryQuote, &over_cap, &mut application) {
        Err(errors) => assert!(errors.of_kind("items", ErrorKind::LessThanOrEqualTo)),
        other => panic!("expected items above the cap to be rejected, got {other:?}"),
    }

    let at_cap = per_item(MAX_ITEMS.to_string(), &MAX_AMOUNT.to_string());
    submit(PriorAuthorityStep::PrimaryQuote, &at_cap, &mut application).expect("quote at the cap");
    assert_eq!(application.primary_quote.cost.items, Some(MAX_ITEMS));

    let costs = ApplicationCosts::for_application(&application);
    assert_eq!(costs.service_cost, Decimal::from(MAX_ITEMS) * MAX_AMOUNT);
    assert_eq!(costs.total, costs.service_cost);
}

#[test]
fn oversized_durations_are_rejected() {
    let mut application = draft_application("pa-form-16");
    let params = quote_params()
        .with("period_hours", i64::MAX.to_string())
        .with("travel_time_hours", (MAX_HOURS + 1).to_string())
        .with("travel_time_minutes", "0")
        .with("travel_cost_per_hour", "40.00");

    match submit(PriorAuthorityStep::PrimaryQuote, &params, &mut application) {
        Err(errors) => {
            assert!(errors.of_kind("period_hours", ErrorKind::LessThanOrEqualTo));
            assert!(errors.of_kind("travel_time_hours", ErrorKind::LessThanOrEqualTo));
        }
        other => panic!("expected oversized durations to be rejected, got {other:?}"),
    }
    assert_eq!(application.primary_quote.cost.period, None);

    let params = quote_params()
        .with("period_hours", MAX_HOURS.to_string())
        .with("period_minutes", "59");
    submit(PriorAuthorityStep::PrimaryQuote, &params, &mut application).expect("duration at the cap");
    assert_eq!(application.primary_quote.cost.period, Some(MAX_HOURS * 60 + 59));
}

#[test]
fn additional_costs_reject_oversized_items() {
    let mut application = draft_application("pa-form-17");
    let params = FormParams::new()
        .with("name", "Translation")
        .with("description", "Translate the client's statement")
        .with("unit_type", "per_item")
        .with("cost_per_item", "1000000.01")
        .with("items", "9000000000000000000");

    match apply(
        PriorAuthorityStep::AdditionalCostDetail,
        &params,
        &mut application,
        &RecordRef::New,
    ) {
        Ok(Err(errors)) => {
            assert!(errors.of_kind("items", ErrorKind::LessThanOrEqualTo));
            assert!(errors.of_kind("cost_per_item", ErrorKind::LessThanOrEqualTo));
        }
        other => panic!("expected oversized additional cost to be rejected, got {other:?}"),
    }
    assert!(application.additional_costs.is_empty());
}
