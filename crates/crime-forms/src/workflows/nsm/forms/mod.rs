//! Step registry for the claim workflow and the forms behind each step.

mod case;
mod closing;
mod costs;

pub use case::{
    defendants_complete, CaseDetailsForm, CaseDisposalForm, ClaimDetailsForm, ClaimTypeForm,
    ContactDetailsForm, DefendantDeleteForm, DefendantDetailsForm, DefendantSummaryForm,
    FirmDetailsForm, FirmDetailsStep, HearingDetailsForm, ReasonForClaimForm,
};
pub use closing::{
    evidence_required, EqualityForm, EqualityQuestionsForm, OtherInfoForm,
    SolicitorDeclarationForm, SupportingEvidenceForm,
};
pub use costs::{
    disbursement_complete, disbursements_complete, validate_disbursement_cost, work_items_complete,
    DisbursementAddForm, DisbursementCostForm, DisbursementDeleteForm, DisbursementTypeForm,
    DisbursementsForm, LettersCallsForm, WorkItemDeleteForm, WorkItemForm, WorkItemsForm,
};

use super::domain::Claim;
use crate::workflows::steps::forms::{
    run_step, FormErrors, FormParams, RecordMissing, RecordRef, StepForm,
};

/// Route prefix for claim applications.
pub const CLAIMS_PREFIX: &str = "/non-standard-magistrates/applications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NsmStep {
    ClaimType,
    FirmDetails,
    CaseDetails,
    DefendantDetails,
    DefendantSummary,
    DefendantDelete,
    HearingDetails,
    CaseDisposal,
    ReasonForClaim,
    ClaimDetails,
    WorkItem,
    WorkItems,
    WorkItemDelete,
    LettersCalls,
    DisbursementAdd,
    DisbursementType,
    DisbursementCost,
    Disbursements,
    DisbursementDelete,
    CostSummary,
    OtherInfo,
    SupportingEvidence,
    Equality,
    EqualityQuestions,
    SolicitorDeclaration,
}

impl NsmStep {
    pub const ALL: [Self; 25] = [
        Self::ClaimType,
        Self::FirmDetails,
        Self::CaseDetails,
        Self::DefendantDetails,
        Self::DefendantSummary,
        Self::DefendantDelete,
        Self::HearingDetails,
        Self::CaseDisposal,
        Self::ReasonForClaim,
        Self::ClaimDetails,
        Self::WorkItem,
        Self::WorkItems,
        Self::WorkItemDelete,
        Self::LettersCalls,
        Self::DisbursementAdd,
        Self::DisbursementType,
        Self::DisbursementCost,
        Self::Disbursements,
        Self::DisbursementDelete,
        Self::CostSummary,
        Self::OtherInfo,
        Self::SupportingEvidence,
        Self::Equality,
        Self::EqualityQuestions,
        Self::SolicitorDeclaration,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::ClaimType => "claim_type",
            Self::FirmDetails => "firm_details",
            Self::CaseDetails => "case_details",
            Self::DefendantDetails => "defendant_details",
            Self::DefendantSummary => "defendant_summary",
            Self::DefendantDelete => "defendant_delete",
            Self::HearingDetails => "hearing_details",
            Self::CaseDisposal => "case_disposal",
            Self::ReasonForClaim => "reason_for_claim",
            Self::ClaimDetails => "claim_details",
            Self::WorkItem => "work_item",
            Self::WorkItems => "work_items",
            Self::WorkItemDelete => "work_item_delete",
            Self::LettersCalls => "letters_calls",
            Self::DisbursementAdd => "disbursement_add",
            Self::DisbursementType => "disbursement_type",
            Self::DisbursementCost => "disbursement_cost",
            Self::Disbursements => "disbursements",
            Self::DisbursementDelete => "disbursement_delete",
            Self::CostSummary => "cost_summary",
            Self::OtherInfo => "other_info",
            Self::SupportingEvidence => "supporting_evidence",
            Self::Equality => "equality",
            Self::EqualityQuestions => "equality_questions",
            Self::SolicitorDeclaration => "solicitor_declaration",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.name() == name)
    }

    /// Steps addressing one child record rather than the claim itself.
    pub const fn is_record_step(self) -> bool {
        matches!(
            self,
            Self::DefendantDetails
                | Self::DefendantDelete
                | Self::WorkItem
                | Self::WorkItemDelete
                | Self::DisbursementType
                | Self::DisbursementCost
                | Self::DisbursementDelete
        )
    }
}

/// Page path for a step, as recorded in the navigation history.
pub fn step_path(claim: &Claim, step: &str, record: Option<&str>) -> String {
    let mut path = format!("{CLAIMS_PREFIX}/{}/steps/{step}", claim.id);
    if let Some(record) = record {
        path.push('/');
        path.push_str(record);
    }
    path
}

/// Parse, validate and persist one step submission against a claim.
///
/// `Ok(Err(errors))` leaves the claim untouched.
pub fn apply(
    step: NsmStep,
    params: &FormParams,
    claim: &mut Claim,
    record: &RecordRef,
) -> Result<Result<RecordRef, FormErrors>, RecordMissing> {
    match step {
        NsmStep::ClaimType => run_step::<_, ClaimTypeForm>(params, claim, record),
        NsmStep::FirmDetails => run_step::<_, FirmDetailsStep>(params, claim, record),
        NsmStep::CaseDetails => run_step::<_, CaseDetailsForm>(params, claim, record),
        NsmStep::DefendantDetails => run_step::<_, DefendantDetailsForm>(params, claim, record),
        NsmStep::DefendantSummary => run_step::<_, DefendantSummaryForm>(params, claim, record),
        NsmStep::DefendantDelete => run_step::<_, DefendantDeleteForm>(params, claim, record),
        NsmStep::HearingDetails => run_step::<_, HearingDetailsForm>(params, claim, record),
        NsmStep::CaseDisposal => run_step::<_, CaseDisposalForm>(params, claim, record),
        NsmStep::ReasonForClaim => run_step::<_, ReasonForClaimForm>(params, claim, record),
        NsmStep::ClaimDetails => run_step::<_, ClaimDetailsForm>(params, claim, record),
        NsmStep::WorkItem => run_step::<_, WorkItemForm>(params, claim, record),
        NsmStep::WorkItems => run_step::<_, WorkItemsForm>(params, claim, record),
        NsmStep::WorkItemDelete => run_step::<_, WorkItemDeleteForm>(params, claim, record),
        NsmStep::LettersCalls => run_step::<_, LettersCallsForm>(params, claim, record),
        NsmStep::DisbursementAdd => run_step::<_, DisbursementAddForm>(params, claim, record),
        NsmStep::DisbursementType => run_step::<_, DisbursementTypeForm>(params, claim, record),
        NsmStep::DisbursementCost => {
            let mut errors = FormErrors::default();
            let form = DisbursementCostForm::parse(params, &mut errors);
            validate_disbursement_cost(&form, claim, record, &mut errors);
            if !errors.is_empty() {
                return Ok(Err(errors));
            }
            form.persist(claim, record).map(Ok)
        }
        NsmStep::Disbursements => run_step::<_, DisbursementsForm>(params, claim, record),
        NsmStep::DisbursementDelete => {
            run_step::<_, DisbursementDeleteForm>(params, claim, record)
        }
        NsmStep::CostSummary => Ok(Ok(RecordRef::Application)),
        NsmStep::OtherInfo => run_step::<_, OtherInfoForm>(params, claim, record),
        NsmStep::SupportingEvidence => run_step::<_, SupportingEvidenceForm>(params, claim, record),
        NsmStep::Equality => run_step::<_, EqualityForm>(params, claim, record),
        NsmStep::EqualityQuestions => run_step::<_, EqualityQuestionsForm>(params, claim, record),
        NsmStep::SolicitorDeclaration => {
            run_step::<_, SolicitorDeclarationForm>(params, claim, record)
        }
    }
}
