use super::common::*;
use crate::workflows::prior_authority::decisions::{PriorAuthorityDecisionTree, APPLICATIONS_INDEX};
use crate::workflows::prior_authority::domain::PriorAuthorityApplication;
use crate::workflows::steps::decisions::{Action, DecisionInput, DecisionTree, Destination};
use crate::workflows::steps::forms::{FormParams, RecordRef};
use crate::workflows::steps::values::YesNo;

fn decide(step: &str, application: &PriorAuthorityApplication, params: &FormParams) -> Destination {
    PriorAuthorityDecisionTree.destination(
        step,
        &DecisionInput {
            application,
            params,
            record: &RecordRef::Application,
        },
    )
}

#[test]
fn case_steps_follow_in_order() {
    let application = draft_application("pa-decide-1");
    let params = FormParams::new();

    assert_eq!(decide("ufn", &application, &params), Destination::edit("case_contact"));
    assert_eq!(
        decide("case_contact", &application, &params),
        Destination::edit("client_detail")
    );
    assert_eq!(
        decide("client_detail", &application, &params),
        Destination::edit("primary_quote")
    );
    assert_eq!(
        decide("reason_why", &application, &params),
        Destination::edit("check_answers")
    );
}

#[test]
fn adding_costs_opens_a_new_cost_page() {
    let mut application = draft_application("pa-decide-2");
    application.additional_costs_still_to_add = Some(YesNo::Yes);
    assert_eq!(
        decide("additional_costs", &application, &FormParams::new()),
        Destination::edit("additional_cost_detail").new_record()
    );

    application.additional_costs_still_to_add = Some(YesNo::No);
    assert_eq!(
        decide("additional_costs", &application, &FormParams::new()),
        Destination::edit("reason_why")
    );
}

#[test]
fn each_cost_returns_to_the_summary() {
    let application = draft_application("pa-decide-3");
    assert_eq!(
        decide("additional_cost_detail", &application, &FormParams::new()),
        Destination::edit("additional_costs")
    );
}

#[test]
fn saving_a_draft_leaves_for_the_index() {
    let application = complete_application("pa-decide-4");

    let draft = decide(
        "check_answers",
        &application,
        &FormParams::new().with("commit_draft", "true"),
    );
    assert!(draft.is(APPLICATIONS_INDEX, Action::Index));

    let submitted = decide("check_answers", &application, &FormParams::new());
    assert_eq!(submitted, Destination::show("submission_confirmation"));
}

#[test]
fn unknown_steps_fall_back_to_the_index() {
    let application = draft_application("pa-decide-5");
    assert!(decide("mystery", &application, &FormParams::new()).is(APPLICATIONS_INDEX, Action::Index));
}
