//! Copies a caseworker's assessment back onto the stored claim.
//!
//! Only `allowed_*` shadows and comments are written. Failures are reported
//! and swallowed; anything synced before the failure is kept.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use super::codes::{LetterOrCall, WorkType};
use super::domain::Claim;
use crate::workflows::steps::ports::ErrorReporter;
use crate::workflows::steps::values::CodedField;

#[derive(Debug, Deserialize)]
struct AssessmentRecord {
    application: AssessedApplication,
}

#[derive(Debug, Deserialize)]
struct AssessedApplication {
    #[serde(default)]
    letters_and_calls: Vec<AssessedLetterOrCall>,
    #[serde(default)]
    work_items: Vec<AssessedWorkItem>,
    #[serde(default)]
    disbursements: Vec<AssessedDisbursement>,
    #[serde(default)]
    assessment_comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssessedLetterOrCall {
    #[serde(rename = "type")]
    kind: CodedField,
    #[serde(default)]
    count: Option<i64>,
    #[serde(default)]
    uplift: Option<i64>,
    #[serde(default)]
    adjustment_comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssessedWorkItem {
    id: String,
    #[serde(default)]
    time_spent: Option<i64>,
    #[serde(default)]
    uplift: Option<i64>,
    #[serde(default)]
    work_type: Option<CodedField>,
    #[serde(default)]
    adjustment_comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssessedDisbursement {
    id: String,
    #[serde(default)]
    total_cost_without_vat: Option<Decimal>,
    #[serde(default)]
    vat_amount: Option<Decimal>,
    #[serde(default)]
    miles: Option<Decimal>,
    #[serde(default)]
    apply_vat: Option<VatFlag>,
    #[serde(default)]
    adjustment_comment: Option<String>,
}

/// `apply_vat` arrives as a boolean or as the strings `"true"`/`"false"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VatFlag {
    Flag(bool),
    Text(String),
}

impl VatFlag {
    fn value(&self) -> bool {
        match self {
            VatFlag::Flag(flag) => *flag,
            VatFlag::Text(text) => text.eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("claim is {0}, which carries no assessment")]
    NotAssessed(&'static str),
    #[error("malformed assessment record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("assessment references unknown {kind} '{id}'")]
    UnknownLineItem { kind: &'static str, id: String },
    #[error("unknown {field} code '{code}'")]
    UnknownCode { field: &'static str, code: String },
}

/// What a sync run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub assessment_comment: bool,
    pub letters_and_calls: usize,
    pub work_items: usize,
    pub disbursements: usize,
    pub failure: Option<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failure.is_none()
    }
}

pub struct AssessmentSyncer<'a> {
    reporter: &'a dyn ErrorReporter,
}

impl<'a> AssessmentSyncer<'a> {
    pub fn new(reporter: &'a dyn ErrorReporter) -> Self {
        Self { reporter }
    }

    pub fn sync(&self, claim: &mut Claim, record: &Value) -> SyncReport {
        let mut report = SyncReport::default();
        match apply(claim, record, &mut report) {
            Ok(()) => {
                info!(
                    claim_id = %claim.id,
                    work_items = report.work_items,
                    disbursements = report.disbursements,
                    "assessment synced"
                );
            }
            Err(err) => {
                error!(claim_id = %claim.id, error = %err, "assessment sync failed");
                self.reporter.report("assessment sync", &err);
                report.failure = Some(err.to_string());
            }
        }
        report
    }
}

fn apply(claim: &mut Claim, record: &Value, report: &mut SyncReport) -> Result<(), SyncError> {
    if !claim.status.is_assessed() {
        return Err(SyncError::NotAssessed(claim.status.label()));
    }
    let record = AssessmentRecord::deserialize(record)?;
    let application = record.application;

    claim.assessment_comment = application.assessment_comment;
    report.assessment_comment = true;

    if !claim.status.carries_adjustments() {
        return Ok(());
    }

    for entry in &application.letters_and_calls {
        if sync_letter_or_call(claim, entry)? {
            report.letters_and_calls += 1;
        }
    }
    for entry in &application.work_items {
        if sync_work_item(claim, entry)? {
            report.work_items += 1;
        }
    }
    for entry in &application.disbursements {
        if sync_disbursement(claim, entry)? {
            report.disbursements += 1;
        }
    }
    Ok(())
}

/// A line item counts as adjusted only when the caseworker left a comment.
fn adjustment(comment: &Option<String>) -> Option<String> {
    comment
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Returns whether the entry was adjusted; unadjusted entries are left alone.
fn sync_letter_or_call(claim: &mut Claim, entry: &AssessedLetterOrCall) -> Result<bool, SyncError> {
    let kind = entry
        .kind
        .parse::<LetterOrCall>()
        .ok_or_else(|| SyncError::UnknownCode {
            field: "letters_and_calls.type",
            code: entry.kind.code().to_string(),
        })?;
    let Some(comment) = adjustment(&entry.adjustment_comment) else {
        return Ok(false);
    };
    match kind {
        LetterOrCall::Letters => {
            claim.allowed_letters = entry.count;
            claim.allowed_letters_uplift = entry.uplift;
            claim.letters_adjustment_comment = Some(comment);
        }
        LetterOrCall::Calls => {
            claim.allowed_calls = entry.count;
            claim.allowed_calls_uplift = entry.uplift;
            claim.calls_adjustment_comment = Some(comment);
        }
    }
    Ok(true)
}

fn sync_work_item(claim: &mut Claim, entry: &AssessedWorkItem) -> Result<bool, SyncError> {
    let item = claim
        .work_item_mut(&entry.id)
        .ok_or_else(|| SyncError::UnknownLineItem {
            kind: "work item",
            id: entry.id.clone(),
        })?;
    let Some(comment) = adjustment(&entry.adjustment_comment) else {
        return Ok(false);
    };
    let work_type = match &entry.work_type {
        Some(field) => Some(field.parse::<WorkType>().ok_or_else(|| SyncError::UnknownCode {
            field: "work_type",
            code: field.code().to_string(),
        })?),
        None => None,
    };

    item.allowed_time_spent = entry.time_spent;
    item.allowed_uplift = entry.uplift;
    item.allowed_work_type = work_type;
    item.adjustment_comment = Some(comment);
    Ok(true)
}

fn sync_disbursement(claim: &mut Claim, entry: &AssessedDisbursement) -> Result<bool, SyncError> {
    let item = claim
        .disbursement_mut(&entry.id)
        .ok_or_else(|| SyncError::UnknownLineItem {
            kind: "disbursement",
            id: entry.id.clone(),
        })?;
    let Some(comment) = adjustment(&entry.adjustment_comment) else {
        return Ok(false);
    };

    item.allowed_total_cost_without_vat = entry.total_cost_without_vat;
    item.allowed_vat_amount = entry.vat_amount;
    item.allowed_miles = entry.miles;
    item.allowed_apply_vat = entry.apply_vat.as_ref().map(VatFlag::value);
    item.adjustment_comment = Some(comment);
    Ok(true)
}
