use super::domain::Claim;
use super::tasks::NsmTask;
use crate::workflows::steps::decisions::{DecisionInput, DecisionTree, Destination};
use crate::workflows::steps::tasks::StepTask;
use crate::workflows::steps::values::{Coded, YesNo};

/// Controller name of the claims index.
pub const CLAIMS_INDEX: &str = "claims";

/// Routing for the claim workflow, evaluated after a step has persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NsmDecisionTree;

impl NsmDecisionTree {
    fn add_another(input: &DecisionInput<'_, Claim>, field: &str) -> Option<YesNo> {
        input.params.get(field).and_then(YesNo::from_code)
    }

    fn after_equality(claim: &Claim) -> Destination {
        if NsmTask::SolicitorDeclaration.can_start(claim) {
            Destination::edit("solicitor_declaration")
        } else {
            Destination::show("start_page")
        }
    }
}

impl DecisionTree<Claim> for NsmDecisionTree {
    fn destination(&self, step_name: &str, input: &DecisionInput<'_, Claim>) -> Destination {
        let claim = input.application;
        match step_name {
            "claim_type" => match claim.claim_type {
                Some(claim_type) if claim_type.is_supported() => Destination::edit("firm_details"),
                _ => Destination::index(CLAIMS_INDEX),
            },
            "firm_details" => Destination::edit("case_details"),
            "case_details" | "defendant_delete" => {
                if claim.defendants.is_empty() {
                    Destination::edit("defendant_details").new_record()
                } else {
                    Destination::edit("defendant_summary")
                }
            }
            "defendant_details" => Destination::edit("defendant_summary"),
            "defendant_summary" => match Self::add_another(input, "add_another") {
                Some(YesNo::Yes) => Destination::edit("defendant_details").new_record(),
                _ => Destination::edit("hearing_details"),
            },
            "hearing_details" => Destination::edit("case_disposal"),
            "case_disposal" => Destination::edit("reason_for_claim"),
            "reason_for_claim" => Destination::edit("claim_details"),
            "claim_details" | "work_item_delete" => {
                if claim.work_items.is_empty() {
                    Destination::edit("work_item").new_record()
                } else {
                    Destination::edit("work_items")
                }
            }
            "work_item" => Destination::edit("work_items"),
            "work_items" => match Self::add_another(input, "add_another") {
                Some(YesNo::Yes) => Destination::edit("work_item").new_record(),
                _ => Destination::edit("letters_calls"),
            },
            "letters_calls" => Destination::edit("disbursement_add"),
            "disbursement_add" => match claim.has_disbursements {
                Some(YesNo::Yes) if claim.disbursements.is_empty() => {
                    Destination::edit("disbursement_type").new_record()
                }
                Some(YesNo::Yes) => Destination::edit("disbursements"),
                _ => Destination::show("cost_summary"),
            },
            "disbursement_type" => match input.record.id() {
                Some(id) => Destination::edit("disbursement_cost").with_record(id),
                None => Destination::edit("disbursements"),
            },
            "disbursement_cost" => Destination::edit("disbursements"),
            "disbursements" => match Self::add_another(input, "add_another") {
                Some(YesNo::Yes) => Destination::edit("disbursement_type").new_record(),
                _ => Destination::show("cost_summary"),
            },
            "disbursement_delete" => {
                if claim.disbursements.is_empty() {
                    Destination::edit("disbursement_add")
                } else {
                    Destination::edit("disbursements")
                }
            }
            "cost_summary" => Destination::edit("other_info"),
            "other_info" => Destination::edit("supporting_evidence"),
            "supporting_evidence" => Destination::edit("equality"),
            "equality" => match claim.answer_equality {
                Some(YesNo::Yes) => Destination::edit("equality_questions"),
                _ => Self::after_equality(claim),
            },
            "equality_questions" => Self::after_equality(claim),
            "solicitor_declaration" => Destination::show("claim_confirmation"),
            _ => Destination::index(CLAIMS_INDEX),
        }
    }
}
