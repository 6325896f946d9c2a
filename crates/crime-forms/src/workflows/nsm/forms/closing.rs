//! Closing steps: further information, evidence, equality monitoring and the
//! solicitor declaration that submits the claim.

use std::sync::OnceLock;

use chrono::Utc;

use crate::workflows::nsm::codes::{Disability, EthnicGroup, Gender, ReasonForClaim};
use crate::workflows::nsm::domain::{Claim, ClaimStatus};
use crate::workflows::nsm::pricing::CostSummary;
use crate::workflows::steps::forms::{
    pattern, rules, Checker, ErrorKind, FormErrors, FormParams, RecordMissing, RecordRef, StepForm,
};
use crate::workflows::steps::values::YesNo;

#[derive(Debug, Clone, Default)]
pub struct OtherInfoForm {
    pub is_other_info: Option<YesNo>,
    pub other_info: Option<String>,
    pub concluded: Option<YesNo>,
    pub conclusion: Option<String>,
}

impl OtherInfoForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            is_other_info: claim.is_other_info,
            other_info: claim.other_info.clone(),
            concluded: claim.concluded,
            conclusion: claim.conclusion.clone(),
        }
    }
}

impl StepForm<Claim> for OtherInfoForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            is_other_info: checker.yes_no("is_other_info"),
            other_info: checker.text("other_info"),
            concluded: checker.yes_no("concluded"),
            conclusion: checker.text("conclusion"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("is_other_info") {
            rules::present(errors, "is_other_info", &self.is_other_info);
        }
        if self.is_other_info == Some(YesNo::Yes) {
            rules::present_text(errors, "other_info", &self.other_info);
        }
        if !errors.on("concluded") {
            rules::present(errors, "concluded", &self.concluded);
        }
        if self.concluded == Some(YesNo::Yes) {
            rules::present_text(errors, "conclusion", &self.conclusion);
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.other_info = self
            .other_info
            .filter(|_| self.is_other_info == Some(YesNo::Yes));
        claim.conclusion = self
            .conclusion
            .filter(|_| self.concluded == Some(YesNo::Yes));
        claim.is_other_info = self.is_other_info;
        claim.concluded = self.concluded;
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SupportingEvidenceForm {
    pub send_by_post: bool,
}

impl SupportingEvidenceForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            send_by_post: claim.send_by_post.unwrap_or(false),
        }
    }
}

/// Enhanced rates and assigned counsel both need documentary evidence.
pub fn evidence_required(claim: &Claim) -> bool {
    claim.claims_reason(ReasonForClaim::EnhancedRates)
        || claim.claims_reason(ReasonForClaim::CounselOrAgentAssigned)
}

impl StepForm<Claim> for SupportingEvidenceForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let checker = Checker::new(params, errors);
        Self {
            send_by_post: checker.flag("send_by_post"),
        }
    }

    fn validate(&self, claim: &Claim, errors: &mut FormErrors) {
        if evidence_required(claim) && claim.supporting_evidence.is_empty() && !self.send_by_post {
            errors.add("supporting_evidence", ErrorKind::Blank);
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.send_by_post = Some(self.send_by_post);
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EqualityForm {
    pub answer_equality: Option<YesNo>,
}

impl EqualityForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            answer_equality: claim.answer_equality,
        }
    }
}

impl StepForm<Claim> for EqualityForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            answer_equality: checker.yes_no("answer_equality"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("answer_equality") {
            rules::present(errors, "answer_equality", &self.answer_equality);
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.answer_equality = self.answer_equality;
        if self.answer_equality != Some(YesNo::Yes) {
            claim.gender = None;
            claim.ethnic_group = None;
            claim.disability = None;
        }
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EqualityQuestionsForm {
    pub gender: Option<Gender>,
    pub ethnic_group: Option<EthnicGroup>,
    pub disability: Option<Disability>,
}

impl EqualityQuestionsForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            gender: claim.gender,
            ethnic_group: claim.ethnic_group,
            disability: claim.disability,
        }
    }
}

impl StepForm<Claim> for EqualityQuestionsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            gender: checker.code("gender"),
            ethnic_group: checker.code("ethnic_group"),
            disability: checker.code("disability"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("gender") {
            rules::present(errors, "gender", &self.gender);
        }
        if !errors.on("ethnic_group") {
            rules::present(errors, "ethnic_group", &self.ethnic_group);
        }
        if !errors.on("disability") {
            rules::present(errors, "disability", &self.disability);
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.gender = self.gender;
        claim.ethnic_group = self.ethnic_group;
        claim.disability = self.disability;
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SolicitorDeclarationForm {
    pub signatory_name: Option<String>,
}

impl StepForm<Claim> for SolicitorDeclarationForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let checker = Checker::new(params, errors);
        Self {
            signatory_name: checker.text("signatory_name"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        static SIGNATORY: OnceLock<regex::Regex> = OnceLock::new();
        // At least two names, letters and common punctuation only.
        let format = pattern(&SIGNATORY, r"(?i)^[a-z,.'\-]+( +[a-z,.'\-]+)+$");
        rules::matches(errors, "signatory_name", &self.signatory_name, format);
    }

    /// Submits the claim: the state moves on and the claimed totals are stamped.
    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.signatory_name = self.signatory_name;
        claim.update_work_item_positions();
        claim.update_disbursement_positions();

        let summary = CostSummary::for_claim(claim);
        claim.submitted_total = Some(summary.total);
        claim.submitted_total_inc_vat = Some(summary.total_inc_vat);
        claim.status = match claim.status {
            ClaimStatus::SentBack => ClaimStatus::ProviderUpdated,
            _ => ClaimStatus::Submitted,
        };
        claim.submitted_at = Some(Utc::now());
        Ok(RecordRef::Application)
    }
}
