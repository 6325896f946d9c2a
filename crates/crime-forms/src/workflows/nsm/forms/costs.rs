//! Steps that record the claimed costs: work items, letters and calls, and
//! disbursements.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::workflows::nsm::codes::{DisbursementType, OtherDisbursementType, WorkType};
use crate::workflows::nsm::domain::{Claim, Disbursement, WorkItem};
use crate::workflows::nsm::pricing::{disbursement_cost, disbursement_vat, Pricing};
use crate::workflows::steps::forms::{
    duration, rules, total_minutes, validate_duration, Checker, ErrorKind, FormErrors, FormParams,
    RecordMissing, RecordRef, StepForm, MAX_ITEMS,
};
use crate::workflows::steps::values::YesNo;

#[derive(Debug, Clone, Default)]
pub struct WorkItemForm {
    pub work_type: Option<WorkType>,
    pub time_spent_hours: Option<i64>,
    pub time_spent_minutes: Option<i64>,
    pub completed_on: Option<NaiveDate>,
    pub fee_earner: Option<String>,
    pub apply_uplift: bool,
    pub uplift: Option<i64>,
}

impl WorkItemForm {
    pub fn from_item(item: &WorkItem) -> Self {
        Self {
            work_type: item.work_type,
            time_spent_hours: item.time_spent.map(|minutes| minutes / 60),
            time_spent_minutes: item.time_spent.map(|minutes| minutes % 60),
            completed_on: item.completed_on,
            fee_earner: item.fee_earner.clone(),
            apply_uplift: item.uplift.is_some(),
            uplift: item.uplift,
        }
    }

    /// Uplift is dropped unless the claim allows it and the box is ticked.
    fn effective_uplift(&self, claim: &Claim) -> Option<i64> {
        if claim.allows_uplift() && self.apply_uplift {
            self.uplift
        } else {
            None
        }
    }

    fn write(self, claim: &Claim, item: &mut WorkItem) {
        item.uplift = self.effective_uplift(claim);
        item.work_type = self.work_type;
        item.time_spent = total_minutes(self.time_spent_hours, self.time_spent_minutes);
        item.completed_on = self.completed_on;
        item.fee_earner = self.fee_earner;
    }
}

impl StepForm<Claim> for WorkItemForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        let (time_spent_hours, time_spent_minutes) = duration(&mut checker, "time_spent");
        Self {
            work_type: checker.code("work_type"),
            time_spent_hours,
            time_spent_minutes,
            completed_on: checker.date("completed_on"),
            fee_earner: checker.text("fee_earner"),
            apply_uplift: checker.flag("apply_uplift"),
            uplift: checker.integer("uplift"),
        }
    }

    fn validate(&self, claim: &Claim, errors: &mut FormErrors) {
        match self.work_type {
            None if !errors.on("work_type") => errors.add("work_type", ErrorKind::Blank),
            Some(work_type) if !work_type.displayed_for(claim) => {
                errors.add("work_type", ErrorKind::Inclusion)
            }
            _ => {}
        }
        validate_duration(
            errors,
            "time_spent",
            self.time_spent_hours,
            self.time_spent_minutes,
        );
        if !errors.on("completed_on") {
            rules::past_date(errors, "completed_on", self.completed_on);
        }
        rules::present_text(errors, "fee_earner", &self.fee_earner);
        if claim.allows_uplift() && self.apply_uplift && !errors.on("uplift") {
            rules::between(errors, "uplift", self.uplift, 0, 100);
        }
    }

    fn persist(self, claim: &mut Claim, record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        let id = match record {
            RecordRef::New => {
                let mut item = WorkItem::blank(String::new());
                self.write(claim, &mut item);
                claim.add_work_item(item)
            }
            RecordRef::Existing(id) => {
                let mut item = claim
                    .work_item(id)
                    .cloned()
                    .ok_or_else(|| RecordMissing::new("work item", record))?;
                self.write(claim, &mut item);
                if let Some(slot) = claim.work_item_mut(id) {
                    *slot = item;
                }
                claim.update_work_item_positions();
                id.clone()
            }
            RecordRef::Application => return Err(RecordMissing::new("work item", record)),
        };
        Ok(RecordRef::Existing(id))
    }
}

/// At least one work item exists and every one of them is valid.
pub fn work_items_complete(claim: &Claim) -> bool {
    !claim.work_items.is_empty()
        && claim
            .work_items
            .iter()
            .all(|item| WorkItemForm::from_item(item).is_valid(claim))
}

#[derive(Debug, Clone, Default)]
pub struct WorkItemsForm {
    pub add_another: Option<YesNo>,
}

impl StepForm<Claim> for WorkItemsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            add_another: checker.yes_no("add_another"),
        }
    }

    fn validate(&self, claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("add_another") {
            rules::present(errors, "add_another", &self.add_another);
        }
        if self.add_another == Some(YesNo::No) && !work_items_complete(claim) {
            errors.add("work_items", ErrorKind::Invalid);
        }
    }

    fn persist(self, _claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkItemDeleteForm;

impl StepForm<Claim> for WorkItemDeleteForm {
    fn parse(_params: &FormParams, _errors: &mut FormErrors) -> Self {
        Self
    }

    fn validate(&self, _claim: &Claim, _errors: &mut FormErrors) {}

    fn persist(self, claim: &mut Claim, record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        match record.id() {
            Some(id) if claim.remove_work_item(id) => Ok(RecordRef::Application),
            _ => Err(RecordMissing::new("work item", record)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LettersCallsForm {
    pub letters: Option<i64>,
    pub calls: Option<i64>,
    pub apply_letters_uplift: bool,
    pub letters_uplift: Option<i64>,
    pub apply_calls_uplift: bool,
    pub calls_uplift: Option<i64>,
}

impl LettersCallsForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            letters: claim.letters,
            calls: claim.calls,
            apply_letters_uplift: claim.letters_uplift.is_some(),
            letters_uplift: claim.letters_uplift,
            apply_calls_uplift: claim.calls_uplift.is_some(),
            calls_uplift: claim.calls_uplift,
        }
    }
}

impl StepForm<Claim> for LettersCallsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            letters: checker.integer("letters"),
            calls: checker.integer("calls"),
            apply_letters_uplift: checker.flag("apply_letters_uplift"),
            letters_uplift: checker.integer("letters_uplift"),
            apply_calls_uplift: checker.flag("apply_calls_uplift"),
            calls_uplift: checker.integer("calls_uplift"),
        }
    }

    fn validate(&self, claim: &Claim, errors: &mut FormErrors) {
        for (field, value) in [("letters", self.letters), ("calls", self.calls)] {
            if value.is_some() && !errors.on(field) {
                rules::between(errors, field, value, 0, MAX_ITEMS);
            }
        }
        if !claim.allows_uplift() {
            return;
        }
        for (field, apply, value) in [
            ("letters_uplift", self.apply_letters_uplift, self.letters_uplift),
            ("calls_uplift", self.apply_calls_uplift, self.calls_uplift),
        ] {
            if apply && !errors.on(field) {
                rules::between(errors, field, value, 0, 100);
            }
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        let uplifts = claim.allows_uplift();
        claim.letters = self.letters;
        claim.calls = self.calls;
        claim.letters_uplift = self
            .letters_uplift
            .filter(|_| uplifts && self.apply_letters_uplift);
        claim.calls_uplift = self
            .calls_uplift
            .filter(|_| uplifts && self.apply_calls_uplift);
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisbursementAddForm {
    pub has_disbursements: Option<YesNo>,
}

impl DisbursementAddForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            has_disbursements: claim.has_disbursements,
        }
    }
}

impl StepForm<Claim> for DisbursementAddForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            has_disbursements: checker.yes_no("has_disbursements"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("has_disbursements") {
            rules::present(errors, "has_disbursements", &self.has_disbursements);
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.has_disbursements = self.has_disbursements;
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisbursementTypeForm {
    pub disbursement_date: Option<NaiveDate>,
    pub disbursement_type: Option<DisbursementType>,
    pub other_type: Option<OtherDisbursementType>,
}

impl DisbursementTypeForm {
    pub fn from_item(item: &Disbursement) -> Self {
        Self {
            disbursement_date: item.disbursement_date,
            disbursement_type: item.disbursement_type,
            other_type: item.other_type,
        }
    }
}

impl StepForm<Claim> for DisbursementTypeForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            disbursement_date: checker.date("disbursement_date"),
            disbursement_type: checker.code("disbursement_type"),
            other_type: checker.code("other_type"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("disbursement_date") {
            rules::past_date(errors, "disbursement_date", self.disbursement_date);
        }
        if !errors.on("disbursement_type") {
            rules::present(errors, "disbursement_type", &self.disbursement_type);
        }
        if self.disbursement_type == Some(DisbursementType::Other) && !errors.on("other_type") {
            rules::present(errors, "other_type", &self.other_type);
        }
    }

    fn persist(self, claim: &mut Claim, record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        let id = match record {
            RecordRef::New => claim.add_disbursement(),
            RecordRef::Existing(id) => id.clone(),
            RecordRef::Application => return Err(RecordMissing::new("disbursement", record)),
        };
        let item = claim
            .disbursement_mut(&id)
            .ok_or_else(|| RecordMissing::new("disbursement", record))?;
        if item.disbursement_type != self.disbursement_type {
            item.miles = None;
            item.total_cost_without_vat = None;
            item.vat_amount = None;
            item.vat_rate = None;
        }
        item.disbursement_date = self.disbursement_date;
        item.disbursement_type = self.disbursement_type;
        item.other_type = self
            .other_type
            .filter(|_| self.disbursement_type == Some(DisbursementType::Other));
        claim.update_disbursement_positions();
        Ok(RecordRef::Existing(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisbursementCostForm {
    pub miles: Option<Decimal>,
    pub total_cost_without_vat: Option<Decimal>,
    pub details: Option<String>,
    pub prior_authority: Option<YesNo>,
    pub apply_vat: bool,
}

impl DisbursementCostForm {
    pub fn from_item(item: &Disbursement) -> Self {
        Self {
            miles: item.miles,
            total_cost_without_vat: item.total_cost_without_vat,
            details: item.details.clone(),
            prior_authority: item.prior_authority,
            apply_vat: item.apply_vat.unwrap_or(false),
        }
    }

    /// Cost rules depend on the type chosen on the previous page.
    pub fn check(&self, disbursement_type: Option<DisbursementType>, errors: &mut FormErrors) {
        match disbursement_type {
            Some(kind) if kind.is_mileage() => {
                if !errors.on("miles") {
                    rules::amount(errors, "miles", self.miles);
                }
            }
            Some(_) => {
                if !errors.on("total_cost_without_vat") {
                    rules::amount(errors, "total_cost_without_vat", self.total_cost_without_vat);
                }
                if !errors.on("prior_authority") {
                    rules::present(errors, "prior_authority", &self.prior_authority);
                }
            }
            None => errors.add("disbursement_type", ErrorKind::Blank),
        }
        rules::present_text(errors, "details", &self.details);
    }
}

impl StepForm<Claim> for DisbursementCostForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            miles: checker.decimal("miles"),
            total_cost_without_vat: checker.decimal("total_cost_without_vat"),
            details: checker.text("details"),
            prior_authority: checker.yes_no("prior_authority"),
            apply_vat: checker.flag("apply_vat"),
        }
    }

    fn validate(&self, _claim: &Claim, _errors: &mut FormErrors) {}

    fn persist(self, claim: &mut Claim, record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        let pricing = Pricing::for_claim(claim);
        let id = record
            .id()
            .ok_or_else(|| RecordMissing::new("disbursement", record))?
            .to_string();
        let item = claim
            .disbursement_mut(&id)
            .ok_or_else(|| RecordMissing::new("disbursement", record))?;

        let mileage = item.disbursement_type.map(DisbursementType::is_mileage);
        let cost = disbursement_cost(
            item.disbursement_type,
            self.miles,
            self.total_cost_without_vat,
            &pricing,
        );
        if mileage == Some(true) {
            item.miles = self.miles;
            item.prior_authority = None;
        } else {
            item.miles = None;
            item.prior_authority = self.prior_authority;
        }
        item.total_cost_without_vat = Some(cost);
        item.details = self.details;
        item.apply_vat = Some(self.apply_vat);
        item.vat_rate = self.apply_vat.then_some(pricing.vat);
        item.vat_amount = Some(disbursement_vat(cost, self.apply_vat, &pricing));
        claim.update_disbursement_positions();
        Ok(RecordRef::Existing(id))
    }
}

/// Validates a cost submission against the record it addresses.
///
/// The cost rules need the stored disbursement type, which `StepForm::validate`
/// cannot see through the application alone when several records exist.
pub fn validate_disbursement_cost(
    form: &DisbursementCostForm,
    claim: &Claim,
    record: &RecordRef,
    errors: &mut FormErrors,
) {
    let disbursement_type = record
        .id()
        .and_then(|id| claim.disbursement(id))
        .and_then(|item| item.disbursement_type);
    form.check(disbursement_type, errors);
}

pub fn disbursement_complete(item: &Disbursement, claim: &Claim) -> bool {
    let mut errors = FormErrors::default();
    DisbursementTypeForm::from_item(item).validate(claim, &mut errors);
    DisbursementCostForm::from_item(item).check(item.disbursement_type, &mut errors);
    errors.is_empty()
}

/// Every disbursement has a valid type and cost page.
pub fn disbursements_complete(claim: &Claim) -> bool {
    claim
        .disbursements
        .iter()
        .all(|item| disbursement_complete(item, claim))
}

#[derive(Debug, Clone, Default)]
pub struct DisbursementsForm {
    pub add_another: Option<YesNo>,
}

impl StepForm<Claim> for DisbursementsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            add_another: checker.yes_no("add_another"),
        }
    }

    fn validate(&self, claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("add_another") {
            rules::present(errors, "add_another", &self.add_another);
        }
        if self.add_another == Some(YesNo::No) && !disbursements_complete(claim) {
            errors.add("disbursements", ErrorKind::Invalid);
        }
    }

    fn persist(self, _claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisbursementDeleteForm;

impl StepForm<Claim> for DisbursementDeleteForm {
    fn parse(_params: &FormParams, _errors: &mut FormErrors) -> Self {
        Self
    }

    fn validate(&self, _claim: &Claim, _errors: &mut FormErrors) {}

    fn persist(self, claim: &mut Claim, record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        match record.id() {
            Some(id) if claim.remove_disbursement(id) => {
                if claim.disbursements.is_empty() {
                    claim.has_disbursements = None;
                }
                Ok(RecordRef::Application)
            }
            _ => Err(RecordMissing::new("disbursement", record)),
        }
    }
}
