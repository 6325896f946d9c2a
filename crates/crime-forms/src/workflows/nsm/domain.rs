use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::codes::{
    ClaimType, Disability, DisbursementType, EthnicGroup, Gender, MatterType,
    OtherDisbursementType, OutcomeCode, Plea, PleaCategory, ReasonForClaim, WorkType,
};
use crate::workflows::steps::navigation::{HasNavigation, NavigationStack};
use crate::workflows::steps::values::{Coded, YesNo};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(pub String);

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Draft,
    Submitted,
    Granted,
    PartGrant,
    Review,
    SentBack,
    ProviderUpdated,
    Rejected,
    Expired,
}

impl ClaimStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Granted => "granted",
            Self::PartGrant => "part_grant",
            Self::Review => "review",
            Self::SentBack => "sent_back",
            Self::ProviderUpdated => "provider_updated",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Provider-editable states; everything else is read-only for steps.
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::SentBack)
    }

    /// States an assessment caseworker can have produced.
    pub const fn is_assessed(self) -> bool {
        matches!(
            self,
            Self::Granted | Self::PartGrant | Self::Rejected | Self::SentBack | Self::Expired
        )
    }

    /// Assessed states that carry adjusted line items.
    pub const fn carries_adjustments(self) -> bool {
        matches!(self, Self::Granted | Self::PartGrant)
    }

    pub const fn is_submitted(self) -> bool {
        matches!(self, Self::Submitted | Self::ProviderUpdated) || self.is_assessed()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmOffice {
    pub name: Option<String>,
    pub account_number: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub town: Option<String>,
    pub postcode: Option<String>,
    pub vat_registered: Option<YesNo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solicitor {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub reference_number: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defendant {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub maat: Option<String>,
    pub main: bool,
    pub position: u32,
}

impl Defendant {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub work_type: Option<WorkType>,
    /// Minutes.
    pub time_spent: Option<i64>,
    pub completed_on: Option<NaiveDate>,
    pub fee_earner: Option<String>,
    pub uplift: Option<i64>,
    pub position: u32,
    pub allowed_time_spent: Option<i64>,
    pub allowed_uplift: Option<i64>,
    pub allowed_work_type: Option<WorkType>,
    pub adjustment_comment: Option<String>,
}

impl WorkItem {
    pub fn blank(id: String) -> Self {
        Self {
            id,
            work_type: None,
            time_spent: None,
            completed_on: None,
            fee_earner: None,
            uplift: None,
            position: 0,
            allowed_time_spent: None,
            allowed_uplift: None,
            allowed_work_type: None,
            adjustment_comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disbursement {
    pub id: String,
    pub disbursement_date: Option<NaiveDate>,
    pub disbursement_type: Option<DisbursementType>,
    pub other_type: Option<OtherDisbursementType>,
    pub miles: Option<Decimal>,
    pub total_cost_without_vat: Option<Decimal>,
    pub details: Option<String>,
    pub prior_authority: Option<YesNo>,
    pub apply_vat: Option<bool>,
    pub vat_rate: Option<Decimal>,
    pub vat_amount: Option<Decimal>,
    pub position: u32,
    pub allowed_total_cost_without_vat: Option<Decimal>,
    pub allowed_vat_amount: Option<Decimal>,
    pub allowed_miles: Option<Decimal>,
    pub allowed_apply_vat: Option<bool>,
    pub adjustment_comment: Option<String>,
}

impl Disbursement {
    pub fn blank(id: String) -> Self {
        Self {
            id,
            disbursement_date: None,
            disbursement_type: None,
            other_type: None,
            miles: None,
            total_cost_without_vat: None,
            details: None,
            prior_authority: None,
            apply_vat: None,
            vat_rate: None,
            vat_amount: None,
            position: 0,
            allowed_total_cost_without_vat: None,
            allowed_vat_amount: None,
            allowed_miles: None,
            allowed_apply_vat: None,
            adjustment_comment: None,
        }
    }

    /// Label used for ordering and display: the free-text kind for `other`.
    pub fn translated_type(&self) -> Option<&'static str> {
        match (self.disbursement_type, self.other_type) {
            (Some(DisbursementType::Other), Some(other)) => Some(other.label()),
            (Some(kind), _) => Some(kind.label()),
            (None, _) => None,
        }
    }
}

/// Uploaded file metadata; the bytes live in external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingDocument {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub file_path: String,
    pub document_type: String,
    pub created_at: DateTime<Utc>,
}

/// A non-standard magistrates' fee claim and every record it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub status: ClaimStatus,
    pub submitter: String,
    pub office_code: Option<String>,

    pub claim_type: Option<ClaimType>,
    pub rep_order_date: Option<NaiveDate>,
    pub cntp_order: Option<String>,
    pub cntp_date: Option<NaiveDate>,

    pub firm_office: Option<FirmOffice>,
    pub solicitor: Option<Solicitor>,

    pub ufn: Option<String>,
    pub main_offence: Option<String>,
    pub main_offence_date: Option<NaiveDate>,
    pub assigned_counsel: Option<YesNo>,
    pub unassigned_counsel: Option<YesNo>,
    pub agent_instructed: Option<YesNo>,
    pub remitted_to_magistrate: Option<YesNo>,
    pub remitted_to_magistrate_date: Option<NaiveDate>,
    pub defendants: Vec<Defendant>,

    pub first_hearing_date: Option<NaiveDate>,
    pub number_of_hearing: Option<i64>,
    pub court: Option<String>,
    pub office_in_undesignated_area: Option<YesNo>,
    pub court_in_undesignated_area: Option<YesNo>,
    pub transferred_to_undesignated_area: Option<YesNo>,
    pub hearing_outcome: Option<OutcomeCode>,
    pub matter_type: Option<MatterType>,

    pub plea: Option<Plea>,
    pub plea_category: Option<PleaCategory>,
    pub arrest_warrant_date: Option<NaiveDate>,
    pub cracked_trial_date: Option<NaiveDate>,

    pub reasons_for_claim: Vec<ReasonForClaim>,
    pub representation_order_withdrawn_date: Option<NaiveDate>,
    pub reason_for_claim_other_details: Option<String>,

    pub prosecution_evidence: Option<i64>,
    pub defence_statement: Option<i64>,
    pub number_of_witnesses: Option<i64>,
    pub supplemental_claim: Option<YesNo>,
    pub preparation_time: Option<YesNo>,
    pub time_spent: Option<i64>,
    pub work_before: Option<YesNo>,
    pub work_before_date: Option<NaiveDate>,
    pub work_after: Option<YesNo>,
    pub work_after_date: Option<NaiveDate>,

    pub work_items: Vec<WorkItem>,

    pub letters: Option<i64>,
    pub letters_uplift: Option<i64>,
    pub calls: Option<i64>,
    pub calls_uplift: Option<i64>,
    pub allowed_letters: Option<i64>,
    pub allowed_letters_uplift: Option<i64>,
    pub letters_adjustment_comment: Option<String>,
    pub allowed_calls: Option<i64>,
    pub allowed_calls_uplift: Option<i64>,
    pub calls_adjustment_comment: Option<String>,

    pub has_disbursements: Option<YesNo>,
    pub disbursements: Vec<Disbursement>,

    pub is_other_info: Option<YesNo>,
    pub other_info: Option<String>,
    pub concluded: Option<YesNo>,
    pub conclusion: Option<String>,
    pub send_by_post: Option<bool>,
    pub supporting_evidence: Vec<SupportingDocument>,

    pub answer_equality: Option<YesNo>,
    pub gender: Option<Gender>,
    pub ethnic_group: Option<EthnicGroup>,
    pub disability: Option<Disability>,

    pub signatory_name: Option<String>,
    pub submitted_total: Option<Decimal>,
    pub submitted_total_inc_vat: Option<Decimal>,
    pub assessment_comment: Option<String>,

    pub navigation: NavigationStack,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    next_record: u64,
}

impl HasNavigation for Claim {
    fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }
}

impl Claim {
    pub fn new(id: ClaimId, submitter: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: ClaimStatus::Draft,
            submitter: submitter.into(),
            office_code: None,
            claim_type: None,
            rep_order_date: None,
            cntp_order: None,
            cntp_date: None,
            firm_office: None,
            solicitor: None,
            ufn: None,
            main_offence: None,
            main_offence_date: None,
            assigned_counsel: None,
            unassigned_counsel: None,
            agent_instructed: None,
            remitted_to_magistrate: None,
            remitted_to_magistrate_date: None,
            defendants: Vec::new(),
            first_hearing_date: None,
            number_of_hearing: None,
            court: None,
            office_in_undesignated_area: None,
            court_in_undesignated_area: None,
            transferred_to_undesignated_area: None,
            hearing_outcome: None,
            matter_type: None,
            plea: None,
            plea_category: None,
            arrest_warrant_date: None,
            cracked_trial_date: None,
            reasons_for_claim: Vec::new(),
            representation_order_withdrawn_date: None,
            reason_for_claim_other_details: None,
            prosecution_evidence: None,
            defence_statement: None,
            number_of_witnesses: None,
            supplemental_claim: None,
            preparation_time: None,
            time_spent: None,
            work_before: None,
            work_before_date: None,
            work_after: None,
            work_after_date: None,
            work_items: Vec::new(),
            letters: None,
            letters_uplift: None,
            calls: None,
            calls_uplift: None,
            allowed_letters: None,
            allowed_letters_uplift: None,
            letters_adjustment_comment: None,
            allowed_calls: None,
            allowed_calls_uplift: None,
            calls_adjustment_comment: None,
            has_disbursements: None,
            disbursements: Vec::new(),
            is_other_info: None,
            other_info: None,
            concluded: None,
            conclusion: None,
            send_by_post: None,
            supporting_evidence: Vec::new(),
            answer_equality: None,
            gender: None,
            ethnic_group: None,
            disability: None,
            signatory_name: None,
            submitted_total: None,
            submitted_total_inc_vat: None,
            assessment_comment: None,
            navigation: NavigationStack::new(),
            created_at: now,
            updated_at: now,
            submitted_at: None,
            next_record: 1,
        }
    }

    /// Representation order date, falling back to the CNTP date for breaches.
    pub fn date(&self) -> Option<NaiveDate> {
        self.rep_order_date.or(self.cntp_date)
    }

    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .0
            .char_indices()
            .nth(8)
            .map(|(index, _)| index)
            .unwrap_or(self.id.0.len());
        &self.id.0[..end]
    }

    pub fn vat_registered(&self) -> bool {
        self.firm_office
            .as_ref()
            .and_then(|office| office.vat_registered)
            .map(YesNo::is_yes)
            .unwrap_or(false)
    }

    /// Travel and waiting are claimable once the case left the designated area.
    pub fn prog_stage_reached(&self) -> bool {
        [
            self.office_in_undesignated_area,
            self.court_in_undesignated_area,
            self.transferred_to_undesignated_area,
        ]
        .into_iter()
        .any(|answer| answer == Some(YesNo::Yes))
    }

    pub fn claims_reason(&self, reason: ReasonForClaim) -> bool {
        self.reasons_for_claim.contains(&reason)
    }

    /// Uplifts are only claimable alongside enhanced rates.
    pub fn allows_uplift(&self) -> bool {
        self.claims_reason(ReasonForClaim::EnhancedRates)
    }

    pub fn main_defendant(&self) -> Option<&Defendant> {
        self.defendants.iter().find(|defendant| defendant.main)
    }

    pub fn work_item(&self, id: &str) -> Option<&WorkItem> {
        self.work_items.iter().find(|item| item.id == id)
    }

    pub fn work_item_mut(&mut self, id: &str) -> Option<&mut WorkItem> {
        self.work_items.iter_mut().find(|item| item.id == id)
    }

    pub fn disbursement(&self, id: &str) -> Option<&Disbursement> {
        self.disbursements.iter().find(|item| item.id == id)
    }

    pub fn disbursement_mut(&mut self, id: &str) -> Option<&mut Disbursement> {
        self.disbursements.iter_mut().find(|item| item.id == id)
    }

    pub fn defendant_mut(&mut self, id: &str) -> Option<&mut Defendant> {
        self.defendants.iter_mut().find(|defendant| defendant.id == id)
    }

    pub fn next_record_id(&mut self, prefix: &str) -> String {
        let id = self.next_record;
        self.next_record += 1;
        format!("{prefix}-{id}")
    }

    pub fn add_defendant(&mut self) -> String {
        let id = self.next_record_id("def");
        let main = self.defendants.is_empty();
        let position = self.defendants.len() as u32 + 1;
        self.defendants.push(Defendant {
            id: id.clone(),
            first_name: None,
            last_name: None,
            maat: None,
            main,
            position,
        });
        id
    }

    /// Remove a defendant, promoting the next one when the main is removed.
    pub fn remove_defendant(&mut self, id: &str) -> bool {
        let Some(index) = self.defendants.iter().position(|d| d.id == id) else {
            return false;
        };
        let removed = self.defendants.remove(index);
        if removed.main {
            if let Some(first) = self.defendants.first_mut() {
                first.main = true;
            }
        }
        for (index, defendant) in self.defendants.iter_mut().enumerate() {
            defendant.position = index as u32 + 1;
        }
        true
    }

    pub fn add_work_item(&mut self, mut item: WorkItem) -> String {
        item.id = self.next_record_id("wi");
        let id = item.id.clone();
        self.work_items.push(item);
        self.update_work_item_positions();
        id
    }

    pub fn remove_work_item(&mut self, id: &str) -> bool {
        let before = self.work_items.len();
        self.work_items.retain(|item| item.id != id);
        let removed = self.work_items.len() != before;
        if removed {
            self.update_work_item_positions();
        }
        removed
    }

    pub fn add_disbursement(&mut self) -> String {
        let id = self.next_record_id("disb");
        self.disbursements.push(Disbursement::blank(id.clone()));
        self.update_disbursement_positions();
        id
    }

    pub fn remove_disbursement(&mut self, id: &str) -> bool {
        let before = self.disbursements.len();
        self.disbursements.retain(|item| item.id != id);
        let removed = self.disbursements.len() != before;
        if removed {
            self.update_disbursement_positions();
        }
        removed
    }

    /// Work item ids in canonical order: completion date, work type, creation.
    pub fn sorted_work_item_ids(&self) -> Vec<String> {
        let mut items: Vec<&WorkItem> = self.work_items.iter().collect();
        items.sort_by_key(|item| {
            (
                item.completed_on.unwrap_or_else(sort_floor),
                item.work_type.map(|kind| kind.code().to_lowercase()),
                record_sequence(&item.id),
            )
        });
        items.into_iter().map(|item| item.id.clone()).collect()
    }

    /// Disbursement ids in canonical order: date, translated type, creation.
    pub fn sorted_disbursement_ids(&self) -> Vec<String> {
        let mut items: Vec<&Disbursement> = self.disbursements.iter().collect();
        items.sort_by_key(|item| {
            (
                item.disbursement_date.unwrap_or_else(sort_floor),
                item.translated_type().map(str::to_lowercase),
                record_sequence(&item.id),
            )
        });
        items.into_iter().map(|item| item.id.clone()).collect()
    }

    pub fn work_item_position(&self, id: &str) -> Option<u32> {
        position_in(&self.sorted_work_item_ids(), id)
    }

    pub fn disbursement_position(&self, id: &str) -> Option<u32> {
        position_in(&self.sorted_disbursement_ids(), id)
    }

    /// Rewrite every cached work item position in one pass.
    pub fn update_work_item_positions(&mut self) {
        let order = self.sorted_work_item_ids();
        for item in &mut self.work_items {
            item.position = position_in(&order, &item.id).unwrap_or_default();
        }
        self.work_items.sort_by_key(|item| item.position);
    }

    pub fn update_disbursement_positions(&mut self) {
        let order = self.sorted_disbursement_ids();
        for item in &mut self.disbursements {
            item.position = position_in(&order, &item.id).unwrap_or_default();
        }
        self.disbursements.sort_by_key(|item| item.position);
    }
}

fn sort_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// Creation order, recovered from the per-claim record counter.
fn record_sequence(id: &str) -> u64 {
    id.rsplit('-')
        .next()
        .and_then(|sequence| sequence.parse().ok())
        .unwrap_or(u64::MAX)
}

fn position_in(order: &[String], id: &str) -> Option<u32> {
    order
        .iter()
        .position(|candidate| candidate == id)
        .map(|index| index as u32 + 1)
}
