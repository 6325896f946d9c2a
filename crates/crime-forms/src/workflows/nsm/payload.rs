//! Versioned `crm7` submission document for the app store.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use super::codes::{LetterOrCall, WorkType};
use super::domain::{Claim, Defendant, Disbursement, SupportingDocument, WorkItem};
use super::pricing::Pricing;
use super::risk::RiskScorer;
use crate::workflows::steps::money::to_float;
use crate::workflows::steps::values::{Coded, YesNo};

pub const APPLICATION_TYPE: &str = "crm7";
pub const JSON_SCHEMA_VERSION: u32 = 1;

/// Builds the submission envelope for a claim.
pub struct NsmPayloadBuilder<'a> {
    claim: &'a Claim,
    scorer: &'a dyn RiskScorer,
}

impl<'a> NsmPayloadBuilder<'a> {
    pub fn new(claim: &'a Claim, scorer: &'a dyn RiskScorer) -> Self {
        Self { claim, scorer }
    }

    pub fn payload(&self) -> Value {
        json!({
            "application": self.application(),
            "application_id": self.claim.id.0,
            "application_state": self.claim.status.label(),
            "application_risk": self.scorer.score(self.claim).label(),
            "json_schema_version": JSON_SCHEMA_VERSION,
            "application_type": APPLICATION_TYPE,
        })
    }

    fn application(&self) -> Value {
        let claim = self.claim;
        let pricing = Pricing::for_claim(claim);
        let mut fields = Map::new();

        let mut put = |key: &str, value: Value| {
            fields.insert(key.to_string(), value);
        };

        put("id", json!(claim.id.0));
        put("status", json!(claim.status.label()));
        put("office_code", json!(claim.office_code));
        put("submitter", json!({ "email": claim.submitter }));
        put("created_at", timestamp(claim.created_at));
        put("updated_at", timestamp(claim.updated_at));

        put("claim_type", coded(claim.claim_type));
        put("rep_order_date", date(claim.rep_order_date));
        put("cntp_order", json!(claim.cntp_order));
        put("cntp_date", date(claim.cntp_date));
        put("firm_office", json!(claim.firm_office));
        put("solicitor", json!(claim.solicitor));

        put("ufn", json!(claim.ufn));
        put("main_offence", json!(claim.main_offence));
        put("main_offence_date", date(claim.main_offence_date));
        put("assigned_counsel", yes_no(claim.assigned_counsel));
        put("unassigned_counsel", yes_no(claim.unassigned_counsel));
        put("agent_instructed", yes_no(claim.agent_instructed));
        put("remitted_to_magistrate", yes_no(claim.remitted_to_magistrate));
        put(
            "remitted_to_magistrate_date",
            date(claim.remitted_to_magistrate_date),
        );
        put("defendants", self.defendants());

        put("first_hearing_date", date(claim.first_hearing_date));
        put("number_of_hearing", json!(claim.number_of_hearing));
        put("court", json!(claim.court));
        // Stored as a yes/no answer but sent as a boolean.
        put(
            "office_in_undesignated_area",
            json!(claim
                .office_in_undesignated_area
                .map(|answer| answer == YesNo::Yes)),
        );
        put(
            "court_in_undesignated_area",
            yes_no(claim.court_in_undesignated_area),
        );
        put(
            "transferred_from_undesignated_area",
            yes_no(claim.transferred_to_undesignated_area),
        );
        put("stage_reached", json!(stage_reached(claim)));
        put("hearing_outcome", coded(claim.hearing_outcome));
        put("matter_type", coded(claim.matter_type));

        put("plea", coded(claim.plea));
        put("plea_category", coded(claim.plea_category));
        put("arrest_warrant_date", date(claim.arrest_warrant_date));
        put("cracked_trial_date", date(claim.cracked_trial_date));

        put(
            "reasons_for_claim",
            Value::Array(
                claim
                    .reasons_for_claim
                    .iter()
                    .map(|reason| coded(Some(*reason)))
                    .collect(),
            ),
        );
        put(
            "representation_order_withdrawn_date",
            date(claim.representation_order_withdrawn_date),
        );
        put(
            "reason_for_claim_other_details",
            json!(claim.reason_for_claim_other_details),
        );

        put("prosecution_evidence", json!(claim.prosecution_evidence));
        put("defence_statement", json!(claim.defence_statement));
        put("number_of_witnesses", json!(claim.number_of_witnesses));
        put("supplemental_claim", yes_no(claim.supplemental_claim));
        put("preparation_time", yes_no(claim.preparation_time));
        put("time_spent", json!(claim.time_spent));
        put("work_before", yes_no(claim.work_before));
        put("work_before_date", date(claim.work_before_date));
        put("work_after", yes_no(claim.work_after));
        put("work_after_date", date(claim.work_after_date));

        put("work_items", self.work_items(&pricing));
        put("work_item_pricing", self.work_item_pricing(&pricing));
        put("letters_and_calls", self.letters_and_calls(&pricing));

        put("has_disbursements", yes_no(claim.has_disbursements));
        put("disbursements", self.disbursements(&pricing));
        put("vat_rate", json!(to_float(pricing.vat)));

        put("is_other_info", yes_no(claim.is_other_info));
        put("other_info", json!(claim.other_info));
        put("concluded", yes_no(claim.concluded));
        put("conclusion", json!(claim.conclusion));
        put("send_by_post", json!(claim.send_by_post));
        put(
            "supporting_evidences",
            Value::Array(claim.supporting_evidence.iter().map(document).collect()),
        );

        put("answer_equality", coded(claim.answer_equality));
        put("gender", coded(claim.gender));
        put("ethnic_group", coded(claim.ethnic_group));
        put("disability", coded(claim.disability));

        put("signatory_name", json!(claim.signatory_name));
        put("submitted_total", money(claim.submitted_total));
        put("submitted_total_inc_vat", money(claim.submitted_total_inc_vat));
        put("assessment_comment", json!(claim.assessment_comment));

        Value::Object(fields)
    }

    fn defendants(&self) -> Value {
        Value::Array(self.claim.defendants.iter().map(defendant).collect())
    }

    fn work_items(&self, pricing: &Pricing) -> Value {
        let claim = self.claim;
        let items = claim
            .sorted_work_item_ids()
            .iter()
            .filter_map(|id| claim.work_item(id))
            .enumerate()
            .map(|(index, item)| work_item(item, index as u32 + 1, pricing))
            .collect();
        Value::Array(items)
    }

    /// Rate for each work type that appears on the claim.
    fn work_item_pricing(&self, pricing: &Pricing) -> Value {
        let mut rates = Map::new();
        for work_type in WorkType::ALL {
            if self
                .claim
                .work_items
                .iter()
                .any(|item| item.work_type == Some(*work_type))
            {
                rates.insert(
                    work_type.code().to_string(),
                    json!(to_float(pricing.work_type(*work_type))),
                );
            }
        }
        Value::Object(rates)
    }

    fn letters_and_calls(&self, pricing: &Pricing) -> Value {
        let claim = self.claim;
        json!([
            {
                "type": coded(Some(LetterOrCall::Letters)),
                "count": claim.letters,
                "pricing": to_float(pricing.letters),
                "uplift": claim.letters_uplift,
            },
            {
                "type": coded(Some(LetterOrCall::Calls)),
                "count": claim.calls,
                "pricing": to_float(pricing.calls),
                "uplift": claim.calls_uplift,
            },
        ])
    }

    fn disbursements(&self, pricing: &Pricing) -> Value {
        let claim = self.claim;
        let items = claim
            .sorted_disbursement_ids()
            .iter()
            .filter_map(|id| claim.disbursement(id))
            .enumerate()
            .map(|(index, item)| disbursement(item, index as u32 + 1, pricing))
            .collect();
        Value::Array(items)
    }
}

/// `prog` once the case reached an undesignated area, `prom` otherwise.
pub fn stage_reached(claim: &Claim) -> &'static str {
    if claim.prog_stage_reached() {
        "prog"
    } else {
        "prom"
    }
}

fn defendant(defendant: &Defendant) -> Value {
    json!({
        "id": defendant.id,
        "first_name": defendant.first_name,
        "last_name": defendant.last_name,
        "maat": defendant.maat,
        "main": defendant.main,
        "position": defendant.position,
    })
}

fn work_item(item: &WorkItem, position: u32, pricing: &Pricing) -> Value {
    json!({
        "id": item.id,
        "work_type": coded(item.work_type),
        "time_spent": item.time_spent,
        "completed_on": date(item.completed_on),
        "fee_earner": item.fee_earner,
        "uplift": item.uplift,
        "position": position,
        "pricing": item.work_type.map(|kind| to_float(pricing.work_type(kind))),
    })
}

fn disbursement(item: &Disbursement, position: u32, pricing: &Pricing) -> Value {
    json!({
        "id": item.id,
        "disbursement_date": date(item.disbursement_date),
        "disbursement_type": coded(item.disbursement_type),
        "other_type": coded(item.other_type),
        "miles": item.miles.map(|miles| miles.to_string()),
        "total_cost_without_vat": money(item.total_cost_without_vat),
        "details": item.details,
        "prior_authority": yes_no(item.prior_authority),
        "apply_vat": item.apply_vat.map(|apply| apply.to_string()),
        "vat_rate": money(item.vat_rate),
        "vat_amount": money(item.vat_amount),
        "position": position,
        "pricing": item
            .disbursement_type
            .and_then(|kind| pricing.mileage(kind))
            .map(to_float),
    })
}

pub(crate) fn document(document: &SupportingDocument) -> Value {
    json!({
        "id": document.id,
        "file_name": document.file_name,
        "file_type": document.file_type,
        "file_size": document.file_size,
        "file_path": document.file_path,
        "document_type": document.document_type,
        "created_at": timestamp(document.created_at),
    })
}

pub(crate) fn coded<T: Coded>(value: Option<T>) -> Value {
    match value {
        Some(value) => json!(value.translated()),
        None => json!({ "value": null, "en": null }),
    }
}

fn yes_no(value: Option<YesNo>) -> Value {
    json!(value.map(YesNo::code))
}

pub(crate) fn date(value: Option<NaiveDate>) -> Value {
    json!(value.map(|date| date.format("%Y-%m-%d").to_string()))
}

fn money(value: Option<Decimal>) -> Value {
    json!(value.map(to_float))
}

pub(crate) fn timestamp(value: DateTime<Utc>) -> Value {
    json!(value.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
