//! Versioned `crm4` submission document.

use rust_decimal::Decimal;
use serde_json::{json, Value};

use super::codes::ServiceType;
use super::domain::{AdditionalCost, CostBasis, PriorAuthorityApplication, Quote};
use super::pricing::{basis_cost, travel_cost, ApplicationCosts};
use crate::workflows::nsm::payload::{coded, date, document, timestamp};
use crate::workflows::nsm::risk::{RiskLevel, RiskScorer};
use crate::workflows::steps::money::to_float;

pub const APPLICATION_TYPE: &str = "crm4";
pub const JSON_SCHEMA_VERSION: u32 = 1;

/// Risk from the requested total: large requests are high risk, custom
/// services medium, everything else low.
#[derive(Debug, Clone, Copy)]
pub struct CostBasedRisk {
    high_risk_threshold: Decimal,
}

impl Default for CostBasedRisk {
    fn default() -> Self {
        Self {
            high_risk_threshold: Decimal::from(5_000),
        }
    }
}

impl CostBasedRisk {
    pub fn new(high_risk_threshold: Decimal) -> Self {
        Self {
            high_risk_threshold,
        }
    }
}

impl RiskScorer<PriorAuthorityApplication> for CostBasedRisk {
    fn score(&self, application: &PriorAuthorityApplication) -> RiskLevel {
        if ApplicationCosts::for_application(application).total >= self.high_risk_threshold {
            RiskLevel::High
        } else if application.primary_quote.service_type == Some(ServiceType::Custom) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

pub struct PriorAuthorityPayloadBuilder<'a> {
    application: &'a PriorAuthorityApplication,
    scorer: &'a dyn RiskScorer<PriorAuthorityApplication>,
}

impl<'a> PriorAuthorityPayloadBuilder<'a> {
    pub fn new(
        application: &'a PriorAuthorityApplication,
        scorer: &'a dyn RiskScorer<PriorAuthorityApplication>,
    ) -> Self {
        Self {
            application,
            scorer,
        }
    }

    pub fn payload(&self) -> Value {
        let application = self.application;
        json!({
            "application": self.application_document(),
            "application_id": application.id.0,
            "application_state": application.status.label(),
            "application_risk": self.scorer.score(application).label(),
            "json_schema_version": JSON_SCHEMA_VERSION,
            "application_type": APPLICATION_TYPE,
        })
    }

    fn application_document(&self) -> Value {
        let application = self.application;
        let costs = ApplicationCosts::for_application(application);
        json!({
            "id": application.id.0,
            "status": application.status.label(),
            "office_code": application.office_code,
            "submitter": { "email": application.submitter },
            "created_at": timestamp(application.created_at),
            "updated_at": timestamp(application.updated_at),
            "submitted_at": application.submitted_at.map(timestamp),
            "ufn": application.ufn,
            "provider": {
                "contact_name": application.contact_name,
                "contact_email": application.contact_email,
            },
            "firm_office": {
                "name": application.firm_name,
                "account_number": application.firm_account_number,
            },
            "client": {
                "first_name": application.client_first_name,
                "last_name": application.client_last_name,
                "date_of_birth": date(application.client_date_of_birth),
            },
            "service_type": coded(application.primary_quote.service_type),
            "custom_service_name": application.primary_quote.custom_service_name,
            "quotes": [quote(&application.primary_quote)],
            "additional_costs": application
                .additional_costs
                .iter()
                .map(additional_cost)
                .collect::<Vec<_>>(),
            "reason_why": application.reason_why,
            "supporting_documents": application
                .supporting_documents
                .iter()
                .map(document)
                .collect::<Vec<_>>(),
            "confirm_excluding_vat": application.confirm_excluding_vat,
            "confirm_travel_expenditure": application.confirm_travel_expenditure,
            "service_cost": to_float(costs.service_cost),
            "travel_cost": to_float(costs.travel_cost),
            "additional_costs_total": to_float(costs.additional_costs),
            "total_cost": to_float(costs.total),
        })
    }
}

fn cost_fields(basis: &CostBasis) -> Value {
    json!({
        "cost_type": coded(basis.cost_type),
        "cost_per_hour": basis.cost_per_hour.map(to_float),
        "period": basis.period,
        "cost_per_item": basis.cost_per_item.map(to_float),
        "items": basis.items,
        "total_cost": to_float(basis_cost(basis)),
    })
}

fn quote(quote: &Quote) -> Value {
    let mut value = cost_fields(&quote.cost);
    if let Value::Object(fields) = &mut value {
        let extra = json!({
            "primary": true,
            "contact_first_name": quote.contact_first_name,
            "contact_last_name": quote.contact_last_name,
            "organisation": quote.organisation,
            "town": quote.town,
            "postcode": quote.postcode,
            "travel_time": quote.travel_time,
            "travel_cost_per_hour": quote.travel_cost_per_hour.map(to_float),
            "travel_cost": to_float(travel_cost(quote)),
        });
        if let Value::Object(extra) = extra {
            fields.extend(extra);
        }
    }
    value
}

fn additional_cost(cost: &AdditionalCost) -> Value {
    let mut value = cost_fields(&cost.cost);
    if let Value::Object(fields) = &mut value {
        fields.insert("id".to_string(), json!(cost.id));
        fields.insert("name".to_string(), json!(cost.name));
        fields.insert("description".to_string(), json!(cost.description));
    }
    value
}
