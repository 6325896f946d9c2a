use super::domain::PriorAuthorityApplication;
use crate::workflows::steps::decisions::{DecisionInput, DecisionTree, Destination};
use crate::workflows::steps::values::YesNo;

/// Controller name of the prior authority applications index.
pub const APPLICATIONS_INDEX: &str = "applications";

#[derive(Debug, Clone, Copy, Default)]
pub struct PriorAuthorityDecisionTree;

impl DecisionTree<PriorAuthorityApplication> for PriorAuthorityDecisionTree {
    fn destination(
        &self,
        step_name: &str,
        input: &DecisionInput<'_, PriorAuthorityApplication>,
    ) -> Destination {
        let application = input.application;
        match step_name {
            "ufn" => Destination::edit("case_contact"),
            "case_contact" => Destination::edit("client_detail"),
            "client_detail" => Destination::edit("primary_quote"),
            "primary_quote" => Destination::edit("additional_costs"),
            "additional_costs" => match application.additional_costs_still_to_add {
                Some(YesNo::Yes) => Destination::edit("additional_cost_detail").new_record(),
                _ => Destination::edit("reason_why"),
            },
            "additional_cost_detail" => Destination::edit("additional_costs"),
            "reason_why" => Destination::edit("check_answers"),
            "check_answers" if input.params.flag("commit_draft") => {
                Destination::index(APPLICATIONS_INDEX)
            }
            "check_answers" => Destination::show("submission_confirmation"),
            _ => Destination::index(APPLICATIONS_INDEX),
        }
    }
}
