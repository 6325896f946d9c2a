use serde::Serialize;

use super::codes::ClaimType;
use super::domain::Claim;
use super::forms::{
    defendants_complete, disbursements_complete, step_path, work_items_complete,
    CaseDetailsForm, CaseDisposalForm, ClaimDetailsForm, ClaimTypeForm, ContactDetailsForm,
    EqualityQuestionsForm, FirmDetailsForm, HearingDetailsForm, LettersCallsForm, OtherInfoForm,
    ReasonForClaimForm, SupportingEvidenceForm,
};
use crate::workflows::steps::forms::StepForm;
use crate::workflows::steps::tasks::{StepTask, TaskView};
use crate::workflows::steps::values::YesNo;

/// Task-list registry for a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NsmTask {
    ClaimType,
    FirmDetails,
    CaseDetails,
    DefendantDetails,
    HearingDetails,
    CaseDisposal,
    ReasonForClaim,
    ClaimDetails,
    WorkItems,
    LettersCalls,
    Disbursements,
    CostSummary,
    OtherInfo,
    SupportingEvidence,
    Equality,
    SolicitorDeclaration,
    ClaimConfirmation,
}

impl NsmTask {
    pub const ALL: [Self; 17] = [
        Self::ClaimType,
        Self::FirmDetails,
        Self::CaseDetails,
        Self::DefendantDetails,
        Self::HearingDetails,
        Self::CaseDisposal,
        Self::ReasonForClaim,
        Self::ClaimDetails,
        Self::WorkItems,
        Self::LettersCalls,
        Self::Disbursements,
        Self::CostSummary,
        Self::OtherInfo,
        Self::SupportingEvidence,
        Self::Equality,
        Self::SolicitorDeclaration,
        Self::ClaimConfirmation,
    ];

    /// Tasks whose state the declaration guard ignores.
    const DECLARATION_EXEMPT: [Self; 2] = [Self::SolicitorDeclaration, Self::ClaimConfirmation];

    /// Path prefix for tasks spread over several pages.
    fn entry_prefix(self, claim: &Claim) -> Option<String> {
        let stem = match self {
            Self::DefendantDetails => "defendant_",
            Self::WorkItems => "work_item",
            Self::Disbursements => "disbursement",
            _ => return None,
        };
        Some(step_path(claim, stem, None))
    }
}

impl StepTask<Claim> for NsmTask {
    fn name(self) -> &'static str {
        match self {
            Self::ClaimType => "claim_type",
            Self::FirmDetails => "firm_details",
            Self::CaseDetails => "case_details",
            Self::DefendantDetails => "defendant_details",
            Self::HearingDetails => "hearing_details",
            Self::CaseDisposal => "case_disposal",
            Self::ReasonForClaim => "reason_for_claim",
            Self::ClaimDetails => "claim_details",
            Self::WorkItems => "work_items",
            Self::LettersCalls => "letters_calls",
            Self::Disbursements => "disbursements",
            Self::CostSummary => "cost_summary",
            Self::OtherInfo => "other_info",
            Self::SupportingEvidence => "supporting_evidence",
            Self::Equality => "equality",
            Self::SolicitorDeclaration => "solicitor_declaration",
            Self::ClaimConfirmation => "claim_confirmation",
        }
    }

    fn path(self, claim: &Claim) -> String {
        match self {
            Self::DefendantDetails if claim.defendants.is_empty() => {
                step_path(claim, "defendant_details", Some("new"))
            }
            Self::DefendantDetails => step_path(claim, "defendant_summary", None),
            Self::WorkItems if claim.work_items.is_empty() => {
                step_path(claim, "work_item", Some("new"))
            }
            Self::Disbursements => step_path(claim, "disbursement_add", None),
            _ => step_path(claim, self.name(), None),
        }
    }

    fn previous(self) -> &'static [Self] {
        match self {
            Self::ClaimType => &[],
            Self::FirmDetails => &[Self::ClaimType],
            Self::CaseDetails => &[Self::FirmDetails],
            Self::DefendantDetails => &[Self::CaseDetails],
            Self::HearingDetails => &[Self::DefendantDetails],
            Self::CaseDisposal => &[Self::HearingDetails],
            Self::ReasonForClaim => &[Self::CaseDisposal],
            Self::ClaimDetails => &[Self::ReasonForClaim],
            Self::WorkItems => &[Self::ClaimDetails],
            Self::LettersCalls => &[Self::WorkItems],
            Self::Disbursements => &[Self::LettersCalls],
            Self::CostSummary => &[Self::Disbursements],
            Self::OtherInfo => &[Self::CostSummary],
            Self::SupportingEvidence => &[Self::OtherInfo],
            Self::Equality => &[Self::SupportingEvidence],
            Self::SolicitorDeclaration => &[Self::Equality],
            Self::ClaimConfirmation => &[Self::SolicitorDeclaration],
        }
    }

    fn in_progress(self, claim: &Claim) -> bool {
        match self.entry_prefix(claim) {
            Some(prefix) => claim.navigation.any_starts_with(&prefix),
            None => claim.navigation.contains(&self.path(claim)),
        }
    }

    fn can_start(self, claim: &Claim) -> bool {
        match self {
            Self::SolicitorDeclaration => ready_for_declaration(claim),
            _ => self
                .previous()
                .iter()
                .all(|task| task.status(claim).is_settled()),
        }
    }

    fn completed(self, claim: &Claim) -> bool {
        match self {
            Self::ClaimType => {
                ClaimTypeForm::from_claim(claim).is_valid(claim)
                    && claim.claim_type.is_some_and(ClaimType::is_supported)
            }
            Self::FirmDetails => {
                FirmDetailsForm::from_claim(claim).is_complete()
                    && ContactDetailsForm::from_claim(claim).is_complete()
            }
            Self::CaseDetails => CaseDetailsForm::from_claim(claim).is_valid(claim),
            Self::DefendantDetails => defendants_complete(claim),
            Self::HearingDetails => HearingDetailsForm::from_claim(claim).is_valid(claim),
            Self::CaseDisposal => CaseDisposalForm::from_claim(claim).is_valid(claim),
            Self::ReasonForClaim => ReasonForClaimForm::from_claim(claim).is_valid(claim),
            Self::ClaimDetails => ClaimDetailsForm::from_claim(claim).is_valid(claim),
            Self::WorkItems => work_items_complete(claim),
            Self::LettersCalls => LettersCallsForm::from_claim(claim).is_valid(claim),
            Self::Disbursements => match claim.has_disbursements {
                Some(YesNo::No) => true,
                Some(YesNo::Yes) => {
                    !claim.disbursements.is_empty() && disbursements_complete(claim)
                }
                None => false,
            },
            // Reviewing the summary is all the step asks for.
            Self::CostSummary => true,
            Self::OtherInfo => OtherInfoForm::from_claim(claim).is_valid(claim),
            Self::SupportingEvidence => SupportingEvidenceForm::from_claim(claim).is_valid(claim),
            Self::Equality => match claim.answer_equality {
                Some(YesNo::No) => true,
                Some(YesNo::Yes) => EqualityQuestionsForm::from_claim(claim).is_valid(claim),
                None => false,
            },
            Self::SolicitorDeclaration | Self::ClaimConfirmation => claim.status.is_submitted(),
        }
    }
}

/// Every task before the declaration is completed or not applicable.
pub fn ready_for_declaration(claim: &Claim) -> bool {
    NsmTask::ALL
        .into_iter()
        .filter(|task| !NsmTask::DECLARATION_EXEMPT.contains(task))
        .all(|task| task.status(claim).is_settled())
}

/// Task-list sections in display order.
pub const SECTIONS: [(&str, &[NsmTask]); 4] = [
    ("About you and your firm", &[NsmTask::ClaimType, NsmTask::FirmDetails]),
    (
        "About the case",
        &[
            NsmTask::CaseDetails,
            NsmTask::DefendantDetails,
            NsmTask::HearingDetails,
            NsmTask::CaseDisposal,
            NsmTask::ReasonForClaim,
        ],
    ),
    (
        "About the claim",
        &[
            NsmTask::ClaimDetails,
            NsmTask::WorkItems,
            NsmTask::LettersCalls,
            NsmTask::Disbursements,
            NsmTask::CostSummary,
            NsmTask::OtherInfo,
            NsmTask::SupportingEvidence,
        ],
    ),
    (
        "Review and submit",
        &[NsmTask::Equality, NsmTask::SolicitorDeclaration],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSection {
    pub title: &'static str,
    pub tasks: Vec<TaskView>,
}

pub fn task_list(claim: &Claim) -> Vec<TaskSection> {
    SECTIONS
        .iter()
        .map(|&(title, tasks)| TaskSection {
            title,
            tasks: tasks.iter().map(|task| task.view(claim)).collect(),
        })
        .collect()
}
