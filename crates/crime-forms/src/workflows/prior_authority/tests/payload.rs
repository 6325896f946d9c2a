use serde_json::json;

use super::common::*;
use crate::workflows::nsm::risk::{RiskLevel, RiskScorer};
use crate::workflows::prior_authority::codes::ServiceType;
use crate::workflows::prior_authority::domain::CostBasis;
use crate::workflows::prior_authority::payload::{
    CostBasedRisk, PriorAuthorityPayloadBuilder, APPLICATION_TYPE,
};
use crate::workflows::prior_authority::pricing::ApplicationCosts;

#[test]
fn the_envelope_carries_identity_state_and_risk() {
    let application = complete_application("pa-payload-1");
    let payload = PriorAuthorityPayloadBuilder::new(&application, &CostBasedRisk::default()).payload();

    assert_eq!(payload["application_id"], json!("pa-payload-1"));
    assert_eq!(payload["application_type"], json!(APPLICATION_TYPE));
    assert_eq!(payload["application_state"], json!("draft"));
    assert_eq!(payload["application_risk"], json!("low"));
    assert_eq!(payload["json_schema_version"], json!(1));
}

#[test]
fn the_quote_and_costs_are_priced() {
    let application = complete_application("pa-payload-2");
    let document = PriorAuthorityPayloadBuilder::new(&application, &CostBasedRisk::default())
        .payload()["application"]
        .clone();

    let quote = &document["quotes"][0];
    assert_eq!(quote["primary"], json!(true));
    assert_eq!(quote["cost_type"], json!({ "value": "per_hour", "en": "Per hour" }));
    assert_eq!(quote["period"], json!(150));
    assert_eq!(quote["total_cost"], json!(225.0));
    assert_eq!(quote["travel_cost"], json!(40.0));

    let cost = &document["additional_costs"][0];
    assert_eq!(cost["name"], json!("Translation"));
    assert_eq!(cost["items"], json!(12));
    assert_eq!(cost["total_cost"], json!(42.0));

    assert_eq!(document["total_cost"], json!(307.0));
    assert_eq!(document["client"]["date_of_birth"], json!("1990-03-14"));
    assert_eq!(
        document["service_type"],
        json!({ "value": "psychiatric_report", "en": "Psychiatric report" })
    );
}

#[test]
fn totals_add_service_travel_and_additional_costs() {
    let application = complete_application("pa-payload-3");
    let costs = ApplicationCosts::for_application(&application);

    assert_eq!(costs.service_cost, money("225.00"));
    assert_eq!(costs.travel_cost, money("40.00"));
    assert_eq!(costs.additional_costs, money("42.00"));
    assert_eq!(costs.total, money("307.00"));
}

#[test]
fn large_requests_are_high_risk() {
    let mut application = complete_application("pa-payload-4");
    let scorer = CostBasedRisk::default();
    assert_eq!(scorer.score(&application), RiskLevel::Low);

    application.primary_quote.service_type = Some(ServiceType::Custom);
    application.primary_quote.custom_service_name = Some("Drone survey".to_string());
    assert_eq!(scorer.score(&application), RiskLevel::Medium);

    application.primary_quote.cost = CostBasis::per_item(Some(money("2500.00")), Some(2));
    assert_eq!(scorer.score(&application), RiskLevel::High);

    assert_eq!(
        CostBasedRisk::new(money("100")).score(&complete_application("pa-payload-5")),
        RiskLevel::High
    );
}
