use serde_json::json;

use super::common::*;
use crate::workflows::nsm::codes::{ReasonForClaim, WorkType};
use crate::workflows::nsm::payload::{stage_reached, NsmPayloadBuilder, APPLICATION_TYPE};
use crate::workflows::nsm::risk::{RiskLevel, RiskScorer, RuleBasedRisk};
use crate::workflows::steps::values::YesNo;

#[test]
fn the_envelope_carries_identity_state_and_risk() {
    let claim = complete_claim("claim-payload-1");
    let payload = NsmPayloadBuilder::new(&claim, &RuleBasedRisk::default()).payload();

    assert_eq!(payload["application_id"], json!("claim-payload-1"));
    assert_eq!(payload["application_type"], json!(APPLICATION_TYPE));
    assert_eq!(payload["application_state"], json!("draft"));
    assert_eq!(payload["application_risk"], json!("medium"));
    assert_eq!(payload["json_schema_version"], json!(1));
}

#[test]
fn coded_values_are_translated() {
    let claim = complete_claim("claim-payload-2");
    let application = NsmPayloadBuilder::new(&claim, &RuleBasedRisk::default())
        .payload()["application"]
        .clone();

    assert_eq!(
        application["claim_type"],
        json!({ "value": "non_standard_magistrate", "en": "Non-standard magistrates' court payment" })
    );
    assert_eq!(application["gender"], json!({ "value": null, "en": null }));
    assert_eq!(application["assigned_counsel"], json!("no"));
    assert_eq!(application["rep_order_date"], json!("2024-06-01"));
    assert_eq!(application["submitter"], json!({ "email": EMAIL }));
    assert_eq!(application["created_at"], json!("2024-06-01T09:30:00.000Z"));
}

#[test]
fn line_items_are_listed_in_canonical_order() {
    let mut claim = complete_claim("claim-payload-3");
    claim.add_work_item(work_item(WorkType::Advocacy, 30, date(2024, 6, 2)));
    let application = NsmPayloadBuilder::new(&claim, &RuleBasedRisk::default())
        .payload()["application"]
        .clone();

    let items = application["work_items"].as_array().expect("work items");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["completed_on"], json!("2024-06-02"));
    assert_eq!(items[0]["position"], json!(1));
    assert_eq!(items[1]["work_type"]["value"], json!("advocacy"));
    assert_eq!(items[2]["work_type"]["value"], json!("preparation"));
    assert_eq!(items[2]["pricing"], json!(52.15));

    assert_eq!(
        application["work_item_pricing"],
        json!({ "advocacy": 65.42, "preparation": 52.15 })
    );
}

#[test]
fn letters_calls_and_disbursements_are_priced() {
    let claim = complete_claim("claim-payload-4");
    let application = NsmPayloadBuilder::new(&claim, &RuleBasedRisk::default())
        .payload()["application"]
        .clone();

    let letters = &application["letters_and_calls"][0];
    assert_eq!(letters["type"]["value"], json!("letters"));
    assert_eq!(letters["count"], json!(2));
    assert_eq!(letters["pricing"], json!(4.09));

    let disbursement = &application["disbursements"][0];
    assert_eq!(disbursement["miles"], json!("11.5"));
    assert_eq!(disbursement["total_cost_without_vat"], json!(5.18));
    assert_eq!(disbursement["apply_vat"], json!("true"));
    assert_eq!(disbursement["pricing"], json!(0.45));
    assert_eq!(application["vat_rate"], json!(0.2));
}

#[test]
fn stage_reached_follows_the_undesignated_area_answers() {
    let mut claim = complete_claim("claim-payload-5");
    assert_eq!(stage_reached(&claim), "prog");

    claim.office_in_undesignated_area = Some(YesNo::No);
    claim.court_in_undesignated_area = Some(YesNo::No);
    claim.transferred_to_undesignated_area = Some(YesNo::No);
    assert_eq!(stage_reached(&claim), "prom");
}

#[test]
fn enhanced_rates_make_a_claim_high_risk() {
    let mut claim = complete_claim("claim-payload-6");
    claim.reasons_for_claim.push(ReasonForClaim::EnhancedRates);
    assert_eq!(RuleBasedRisk::default().score(&claim), RiskLevel::High);
}

#[test]
fn small_claims_are_low_risk() {
    let claim = complete_claim("claim-payload-7");
    assert_eq!(RuleBasedRisk::new(money("1000")).score(&claim), RiskLevel::Low);
    assert_eq!(RuleBasedRisk::default().score(&claim), RiskLevel::Medium);
}

#[test]
fn undesignated_area_answers_keep_their_wire_types() {
    let mut claim = complete_claim("claim-payload-8");
    claim.office_in_undesignated_area = Some(YesNo::No);
    claim.court_in_undesignated_area = None;
    claim.transferred_to_undesignated_area = Some(YesNo::Yes);
    let application = NsmPayloadBuilder::new(&claim, &RuleBasedRisk::default())
        .payload()["application"]
        .clone();

    assert_eq!(application["office_in_undesignated_area"], json!(false));
    assert_eq!(application["court_in_undesignated_area"], json!(null));
    assert_eq!(application["transferred_from_undesignated_area"], json!("yes"));
    assert!(application.get("transferred_to_undesignated_area").is_none());

    claim.office_in_undesignated_area = Some(YesNo::Yes);
    let application = NsmPayloadBuilder::new(&claim, &RuleBasedRisk::default())
        .payload()["application"]
        .clone();
    assert_eq!(application["office_in_undesignated_area"], json!(true));
}
