//! Steps describing the claim, the firm and the case.

use chrono::NaiveDate;

use crate::workflows::nsm::codes::{
    ClaimType, MatterType, OutcomeCode, Plea, ReasonForClaim,
};
use crate::workflows::nsm::domain::{Claim, Defendant, FirmOffice, Solicitor};
use crate::workflows::steps::forms::{
    duration, rules, total_minutes, validate_duration, Checker, ErrorKind, FormErrors, FormParams,
    RecordMissing, RecordRef, StepForm,
};
use crate::workflows::steps::values::YesNo;

#[derive(Debug, Clone, Default)]
pub struct ClaimTypeForm {
    pub claim_type: Option<ClaimType>,
    pub rep_order_date: Option<NaiveDate>,
    pub cntp_order: Option<String>,
    pub cntp_date: Option<NaiveDate>,
}

impl ClaimTypeForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            claim_type: claim.claim_type,
            rep_order_date: claim.rep_order_date,
            cntp_order: claim.cntp_order.clone(),
            cntp_date: claim.cntp_date,
        }
    }
}

impl StepForm<Claim> for ClaimTypeForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            claim_type: checker.code("claim_type"),
            rep_order_date: checker.date("rep_order_date"),
            cntp_order: checker.text("cntp_order"),
            cntp_date: checker.date("cntp_date"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        match self.claim_type {
            None if !errors.on("claim_type") => errors.add("claim_type", ErrorKind::Blank),
            Some(ClaimType::NonStandardMagistrate) => {
                rules::past_date(errors, "rep_order_date", self.rep_order_date)
            }
            Some(ClaimType::BreachOfInjunction) => {
                rules::present_text(errors, "cntp_order", &self.cntp_order);
                rules::past_date(errors, "cntp_date", self.cntp_date);
            }
            _ => {}
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.claim_type = self.claim_type;
        match self.claim_type {
            Some(ClaimType::NonStandardMagistrate) => {
                claim.rep_order_date = self.rep_order_date;
                claim.cntp_order = None;
                claim.cntp_date = None;
            }
            Some(ClaimType::BreachOfInjunction) => {
                claim.rep_order_date = None;
                claim.cntp_order = self.cntp_order;
                claim.cntp_date = self.cntp_date;
            }
            _ => {}
        }
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FirmDetailsForm {
    pub firm_name: Option<String>,
    pub account_number: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub town: Option<String>,
    pub postcode: Option<String>,
    pub vat_registered: Option<YesNo>,
    pub solicitor_first_name: Option<String>,
    pub solicitor_last_name: Option<String>,
    pub solicitor_reference_number: Option<String>,
}

impl FirmDetailsForm {
    pub fn from_claim(claim: &Claim) -> Self {
        let office = claim.firm_office.clone().unwrap_or_default();
        let solicitor = claim.solicitor.clone().unwrap_or_default();
        Self {
            firm_name: office.name,
            account_number: office.account_number,
            address_line_1: office.address_line_1,
            address_line_2: office.address_line_2,
            town: office.town,
            postcode: office.postcode,
            vat_registered: office.vat_registered,
            solicitor_first_name: solicitor.first_name,
            solicitor_last_name: solicitor.last_name,
            solicitor_reference_number: solicitor.reference_number,
        }
    }

    fn parse_fields(checker: &mut Checker<'_>) -> Self {
        Self {
            firm_name: checker.text("firm_name"),
            account_number: checker.text("account_number"),
            address_line_1: checker.text("address_line_1"),
            address_line_2: checker.text("address_line_2"),
            town: checker.text("town"),
            postcode: checker.text("postcode"),
            vat_registered: checker.yes_no("vat_registered"),
            solicitor_first_name: checker.text("solicitor_first_name"),
            solicitor_last_name: checker.text("solicitor_last_name"),
            solicitor_reference_number: checker.text("solicitor_reference_number"),
        }
    }

    fn check(&self, errors: &mut FormErrors) {
        rules::present_text(errors, "firm_name", &self.firm_name);
        rules::present_text(errors, "account_number", &self.account_number);
        rules::present_text(errors, "address_line_1", &self.address_line_1);
        rules::present_text(errors, "town", &self.town);
        rules::postcode(errors, "postcode", &self.postcode);
        if !errors.on("vat_registered") {
            rules::present(errors, "vat_registered", &self.vat_registered);
        }
        rules::present_text(errors, "solicitor_first_name", &self.solicitor_first_name);
        rules::present_text(errors, "solicitor_last_name", &self.solicitor_last_name);
        rules::present_text(
            errors,
            "solicitor_reference_number",
            &self.solicitor_reference_number,
        );
    }

    pub fn is_complete(&self) -> bool {
        let mut errors = FormErrors::default();
        self.check(&mut errors);
        errors.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactDetailsForm {
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub contact_email: Option<String>,
}

impl ContactDetailsForm {
    pub fn from_claim(claim: &Claim) -> Self {
        let solicitor = claim.solicitor.clone().unwrap_or_default();
        Self {
            contact_first_name: solicitor.contact_first_name,
            contact_last_name: solicitor.contact_last_name,
            contact_email: solicitor.contact_email,
        }
    }

    fn check(&self, errors: &mut FormErrors) {
        rules::present_text(errors, "contact_first_name", &self.contact_first_name);
        rules::present_text(errors, "contact_last_name", &self.contact_last_name);
        rules::email(errors, "contact_email", &self.contact_email);
    }

    pub fn is_complete(&self) -> bool {
        let mut errors = FormErrors::default();
        self.check(&mut errors);
        errors.is_empty()
    }
}

/// The firm details page posts the firm, solicitor and contact together.
#[derive(Debug, Clone, Default)]
pub struct FirmDetailsStep {
    pub firm: FirmDetailsForm,
    pub contact: ContactDetailsForm,
}

impl StepForm<Claim> for FirmDetailsStep {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        let firm = FirmDetailsForm::parse_fields(&mut checker);
        let contact = ContactDetailsForm {
            contact_first_name: checker.text("contact_first_name"),
            contact_last_name: checker.text("contact_last_name"),
            contact_email: checker.text("contact_email"),
        };
        Self { firm, contact }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        self.firm.check(errors);
        self.contact.check(errors);
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        let firm = self.firm;
        claim.firm_office = Some(FirmOffice {
            name: firm.firm_name,
            account_number: firm.account_number,
            address_line_1: firm.address_line_1,
            address_line_2: firm.address_line_2,
            town: firm.town,
            postcode: firm.postcode.map(|code| code.to_uppercase()),
            vat_registered: firm.vat_registered,
        });
        claim.solicitor = Some(Solicitor {
            first_name: firm.solicitor_first_name,
            last_name: firm.solicitor_last_name,
            reference_number: firm.solicitor_reference_number,
            contact_first_name: self.contact.contact_first_name,
            contact_last_name: self.contact.contact_last_name,
            contact_email: self.contact.contact_email,
        });
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CaseDetailsForm {
    pub ufn: Option<String>,
    pub main_offence: Option<String>,
    pub main_offence_date: Option<NaiveDate>,
    pub assigned_counsel: Option<YesNo>,
    pub unassigned_counsel: Option<YesNo>,
    pub agent_instructed: Option<YesNo>,
    pub remitted_to_magistrate: Option<YesNo>,
    pub remitted_to_magistrate_date: Option<NaiveDate>,
}

impl CaseDetailsForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            ufn: claim.ufn.clone(),
            main_offence: claim.main_offence.clone(),
            main_offence_date: claim.main_offence_date,
            assigned_counsel: claim.assigned_counsel,
            unassigned_counsel: claim.unassigned_counsel,
            agent_instructed: claim.agent_instructed,
            remitted_to_magistrate: claim.remitted_to_magistrate,
            remitted_to_magistrate_date: claim.remitted_to_magistrate_date,
        }
    }
}

impl StepForm<Claim> for CaseDetailsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            ufn: checker.text("ufn"),
            main_offence: checker.text("main_offence"),
            main_offence_date: checker.date("main_offence_date"),
            assigned_counsel: checker.yes_no("assigned_counsel"),
            unassigned_counsel: checker.yes_no("unassigned_counsel"),
            agent_instructed: checker.yes_no("agent_instructed"),
            remitted_to_magistrate: checker.yes_no("remitted_to_magistrate"),
            remitted_to_magistrate_date: checker.date("remitted_to_magistrate_date"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        rules::ufn(errors, "ufn", &self.ufn);
        rules::present_text(errors, "main_offence", &self.main_offence);
        if !errors.on("main_offence_date") {
            rules::past_date(errors, "main_offence_date", self.main_offence_date);
        }
        for (field, value) in [
            ("assigned_counsel", self.assigned_counsel),
            ("unassigned_counsel", self.unassigned_counsel),
            ("agent_instructed", self.agent_instructed),
            ("remitted_to_magistrate", self.remitted_to_magistrate),
        ] {
            if !errors.on(field) {
                rules::present(errors, field, &value);
            }
        }
        if self.remitted_to_magistrate == Some(YesNo::Yes)
            && !errors.on("remitted_to_magistrate_date")
        {
            rules::past_date(
                errors,
                "remitted_to_magistrate_date",
                self.remitted_to_magistrate_date,
            );
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.ufn = self.ufn;
        claim.main_offence = self.main_offence;
        claim.main_offence_date = self.main_offence_date;
        claim.assigned_counsel = self.assigned_counsel;
        claim.unassigned_counsel = self.unassigned_counsel;
        claim.agent_instructed = self.agent_instructed;
        claim.remitted_to_magistrate = self.remitted_to_magistrate;
        claim.remitted_to_magistrate_date = match self.remitted_to_magistrate {
            Some(YesNo::Yes) => self.remitted_to_magistrate_date,
            _ => None,
        };
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefendantDetailsForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub maat: Option<String>,
}

impl DefendantDetailsForm {
    pub fn from_defendant(defendant: &Defendant) -> Self {
        Self {
            first_name: defendant.first_name.clone(),
            last_name: defendant.last_name.clone(),
            maat: defendant.maat.clone(),
        }
    }
}

impl StepForm<Claim> for DefendantDetailsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let checker = Checker::new(params, errors);
        Self {
            first_name: checker.text("first_name"),
            last_name: checker.text("last_name"),
            maat: checker.text("maat"),
        }
    }

    fn validate(&self, claim: &Claim, errors: &mut FormErrors) {
        rules::present_text(errors, "first_name", &self.first_name);
        rules::present_text(errors, "last_name", &self.last_name);
        // Breach of injunction cases have no representation order, so no MAAT id.
        if claim.claim_type == Some(ClaimType::NonStandardMagistrate) {
            match self.maat.as_deref() {
                None => errors.add("maat", ErrorKind::Blank),
                Some(maat) if maat.len() != 7 || !maat.chars().all(|c| c.is_ascii_digit()) => {
                    errors.add("maat", ErrorKind::Invalid)
                }
                Some(_) => {}
            }
        }
    }

    fn persist(self, claim: &mut Claim, record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        let id = match record {
            RecordRef::New => claim.add_defendant(),
            RecordRef::Existing(id) => id.clone(),
            RecordRef::Application => return Err(RecordMissing::new("defendant", record)),
        };
        let defendant = claim
            .defendant_mut(&id)
            .ok_or_else(|| RecordMissing::new("defendant", record))?;
        defendant.first_name = self.first_name;
        defendant.last_name = self.last_name;
        defendant.maat = self.maat;
        Ok(RecordRef::Existing(id))
    }
}

/// Every defendant is complete and exactly one is flagged main.
pub fn defendants_complete(claim: &Claim) -> bool {
    !claim.defendants.is_empty()
        && claim.defendants.iter().filter(|d| d.main).count() == 1
        && claim
            .defendants
            .iter()
            .all(|d| DefendantDetailsForm::from_defendant(d).is_valid(claim))
}

#[derive(Debug, Clone, Default)]
pub struct DefendantSummaryForm {
    pub add_another: Option<YesNo>,
}

impl StepForm<Claim> for DefendantSummaryForm {
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
        if self.add_another == Some(YesNo::No) && !defendants_complete(claim) {
            errors.add("defendants", ErrorKind::Invalid);
        }
    }

    fn persist(self, _claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefendantDeleteForm;

impl StepForm<Claim> for DefendantDeleteForm {
    fn parse(_params: &FormParams, _errors: &mut FormErrors) -> Self {
        Self
    }

    fn validate(&self, _claim: &Claim, _errors: &mut FormErrors) {}

    fn persist(self, claim: &mut Claim, record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        match record.id() {
            Some(id) if claim.remove_defendant(id) => Ok(RecordRef::Application),
            _ => Err(RecordMissing::new("defendant", record)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HearingDetailsForm {
    pub first_hearing_date: Option<NaiveDate>,
    pub number_of_hearing: Option<i64>,
    pub court: Option<String>,
    pub office_in_undesignated_area: Option<YesNo>,
    pub court_in_undesignated_area: Option<YesNo>,
    pub transferred_to_undesignated_area: Option<YesNo>,
    pub hearing_outcome: Option<OutcomeCode>,
    pub matter_type: Option<MatterType>,
}

impl HearingDetailsForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            first_hearing_date: claim.first_hearing_date,
            number_of_hearing: claim.number_of_hearing,
            court: claim.court.clone(),
            office_in_undesignated_area: claim.office_in_undesignated_area,
            court_in_undesignated_area: claim.court_in_undesignated_area,
            transferred_to_undesignated_area: claim.transferred_to_undesignated_area,
            hearing_outcome: claim.hearing_outcome,
            matter_type: claim.matter_type,
        }
    }
}

impl StepForm<Claim> for HearingDetailsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            first_hearing_date: checker.date("first_hearing_date"),
            number_of_hearing: checker.integer("number_of_hearing"),
            court: checker.text("court"),
            office_in_undesignated_area: checker.yes_no("office_in_undesignated_area"),
            court_in_undesignated_area: checker.yes_no("court_in_undesignated_area"),
            transferred_to_undesignated_area: checker.yes_no("transferred_to_undesignated_area"),
            hearing_outcome: checker.code("hearing_outcome"),
            matter_type: checker.code("matter_type"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("first_hearing_date") {
            rules::past_date(errors, "first_hearing_date", self.first_hearing_date);
        }
        if !errors.on("number_of_hearing") {
            rules::at_least(errors, "number_of_hearing", self.number_of_hearing, 1);
        }
        rules::present_text(errors, "court", &self.court);
        let mut required = vec![
            ("office_in_undesignated_area", self.office_in_undesignated_area),
            ("court_in_undesignated_area", self.court_in_undesignated_area),
        ];
        if self.court_in_undesignated_area == Some(YesNo::No) {
            required.push((
                "transferred_to_undesignated_area",
                self.transferred_to_undesignated_area,
            ));
        }
        for (field, value) in required {
            if !errors.on(field) {
                rules::present(errors, field, &value);
            }
        }
        if !errors.on("hearing_outcome") {
            rules::present(errors, "hearing_outcome", &self.hearing_outcome);
        }
        if !errors.on("matter_type") {
            rules::present(errors, "matter_type", &self.matter_type);
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.first_hearing_date = self.first_hearing_date;
        claim.number_of_hearing = self.number_of_hearing;
        claim.court = self.court;
        claim.office_in_undesignated_area = self.office_in_undesignated_area;
        claim.court_in_undesignated_area = self.court_in_undesignated_area;
        claim.transferred_to_undesignated_area = match self.court_in_undesignated_area {
            Some(YesNo::No) => self.transferred_to_undesignated_area,
            _ => None,
        };
        claim.hearing_outcome = self.hearing_outcome;
        claim.matter_type = self.matter_type;
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CaseDisposalForm {
    pub plea: Option<Plea>,
    pub arrest_warrant_date: Option<NaiveDate>,
    pub cracked_trial_date: Option<NaiveDate>,
}

impl CaseDisposalForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            plea: claim.plea,
            arrest_warrant_date: claim.arrest_warrant_date,
            cracked_trial_date: claim.cracked_trial_date,
        }
    }
}

impl StepForm<Claim> for CaseDisposalForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            plea: checker.code("plea"),
            arrest_warrant_date: checker.date("arrest_warrant_date"),
            cracked_trial_date: checker.date("cracked_trial_date"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        if !errors.on("plea") {
            rules::present(errors, "plea", &self.plea);
        }
        match self.plea {
            Some(Plea::ArrestWarrant) if !errors.on("arrest_warrant_date") => {
                rules::past_date(errors, "arrest_warrant_date", self.arrest_warrant_date)
            }
            Some(Plea::CrackedTrial) if !errors.on("cracked_trial_date") => {
                rules::past_date(errors, "cracked_trial_date", self.cracked_trial_date)
            }
            _ => {}
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.plea = self.plea;
        claim.plea_category = self.plea.map(Plea::category);
        claim.arrest_warrant_date = self
            .arrest_warrant_date
            .filter(|_| self.plea == Some(Plea::ArrestWarrant));
        claim.cracked_trial_date = self
            .cracked_trial_date
            .filter(|_| self.plea == Some(Plea::CrackedTrial));
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReasonForClaimForm {
    pub reasons_for_claim: Vec<ReasonForClaim>,
    pub representation_order_withdrawn_date: Option<NaiveDate>,
    pub reason_for_claim_other_details: Option<String>,
}

impl ReasonForClaimForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            reasons_for_claim: claim.reasons_for_claim.clone(),
            representation_order_withdrawn_date: claim.representation_order_withdrawn_date,
            reason_for_claim_other_details: claim.reason_for_claim_other_details.clone(),
        }
    }

    fn includes(&self, reason: ReasonForClaim) -> bool {
        self.reasons_for_claim.contains(&reason)
    }
}

impl StepForm<Claim> for ReasonForClaimForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            reasons_for_claim: checker.codes("reasons_for_claim"),
            representation_order_withdrawn_date: checker
                .date("representation_order_withdrawn_date"),
            reason_for_claim_other_details: checker.text("reason_for_claim_other_details"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        if self.reasons_for_claim.is_empty() && !errors.on("reasons_for_claim") {
            errors.add("reasons_for_claim", ErrorKind::Blank);
        }
        if self.includes(ReasonForClaim::RepresentationOrderWithdrawn)
            && !errors.on("representation_order_withdrawn_date")
        {
            rules::past_date(
                errors,
                "representation_order_withdrawn_date",
                self.representation_order_withdrawn_date,
            );
        }
        if self.includes(ReasonForClaim::Other) {
            rules::present_text(
                errors,
                "reason_for_claim_other_details",
                &self.reason_for_claim_other_details,
            );
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        let withdrawn = self.includes(ReasonForClaim::RepresentationOrderWithdrawn);
        let other = self.includes(ReasonForClaim::Other);
        claim.representation_order_withdrawn_date = self
            .representation_order_withdrawn_date
            .filter(|_| withdrawn);
        claim.reason_for_claim_other_details =
            self.reason_for_claim_other_details.filter(|_| other);
        claim.reasons_for_claim = self.reasons_for_claim;
        if !claim.allows_uplift() {
            strip_uplifts(claim);
        }
        Ok(RecordRef::Application)
    }
}

/// Uplifts only survive while enhanced rates are claimed.
fn strip_uplifts(claim: &mut Claim) {
    claim.letters_uplift = None;
    claim.calls_uplift = None;
    for item in &mut claim.work_items {
        item.uplift = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClaimDetailsForm {
    pub prosecution_evidence: Option<i64>,
    pub defence_statement: Option<i64>,
    pub number_of_witnesses: Option<i64>,
    pub supplemental_claim: Option<YesNo>,
    pub preparation_time: Option<YesNo>,
    pub time_spent_hours: Option<i64>,
    pub time_spent_minutes: Option<i64>,
    pub work_before: Option<YesNo>,
    pub work_before_date: Option<NaiveDate>,
    pub work_after: Option<YesNo>,
    pub work_after_date: Option<NaiveDate>,
}

impl ClaimDetailsForm {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            prosecution_evidence: claim.prosecution_evidence,
            defence_statement: claim.defence_statement,
            number_of_witnesses: claim.number_of_witnesses,
            supplemental_claim: claim.supplemental_claim,
            preparation_time: claim.preparation_time,
            time_spent_hours: claim.time_spent.map(|minutes| minutes / 60),
            time_spent_minutes: claim.time_spent.map(|minutes| minutes % 60),
            work_before: claim.work_before,
            work_before_date: claim.work_before_date,
            work_after: claim.work_after,
            work_after_date: claim.work_after_date,
        }
    }
}

impl StepForm<Claim> for ClaimDetailsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        let (time_spent_hours, time_spent_minutes) = duration(&mut checker, "time_spent");
        Self {
            prosecution_evidence: checker.integer("prosecution_evidence"),
            defence_statement: checker.integer("defence_statement"),
            number_of_witnesses: checker.integer("number_of_witnesses"),
            supplemental_claim: checker.yes_no("supplemental_claim"),
            preparation_time: checker.yes_no("preparation_time"),
            time_spent_hours,
            time_spent_minutes,
            work_before: checker.yes_no("work_before"),
            work_before_date: checker.date("work_before_date"),
            work_after: checker.yes_no("work_after"),
            work_after_date: checker.date("work_after_date"),
        }
    }

    fn validate(&self, _claim: &Claim, errors: &mut FormErrors) {
        for (field, value) in [
            ("prosecution_evidence", self.prosecution_evidence),
            ("defence_statement", self.defence_statement),
            ("number_of_witnesses", self.number_of_witnesses),
        ] {
            if !errors.on(field) {
                rules::at_least(errors, field, value, 0);
            }
        }
        for (field, value) in [
            ("supplemental_claim", self.supplemental_claim),
            ("preparation_time", self.preparation_time),
            ("work_before", self.work_before),
            ("work_after", self.work_after),
        ] {
            if !errors.on(field) {
                rules::present(errors, field, &value);
            }
        }
        if self.preparation_time == Some(YesNo::Yes) {
            validate_duration(
                errors,
                "time_spent",
                self.time_spent_hours,
                self.time_spent_minutes,
            );
        }
        if self.work_before == Some(YesNo::Yes) && !errors.on("work_before_date") {
            rules::past_date(errors, "work_before_date", self.work_before_date);
        }
        if self.work_after == Some(YesNo::Yes) && !errors.on("work_after_date") {
            rules::past_date(errors, "work_after_date", self.work_after_date);
        }
    }

    fn persist(self, claim: &mut Claim, _record: &RecordRef) -> Result<RecordRef, RecordMissing> {
        claim.prosecution_evidence = self.prosecution_evidence;
        claim.defence_statement = self.defence_statement;
        claim.number_of_witnesses = self.number_of_witnesses;
        claim.supplemental_claim = self.supplemental_claim;
        claim.preparation_time = self.preparation_time;
        claim.time_spent = match self.preparation_time {
            Some(YesNo::Yes) => total_minutes(self.time_spent_hours, self.time_spent_minutes),
            _ => None,
        };
        claim.work_before = self.work_before;
        claim.work_before_date = self
            .work_before_date
            .filter(|_| self.work_before == Some(YesNo::Yes));
        claim.work_after = self.work_after;
        claim.work_after_date = self
            .work_after_date
            .filter(|_| self.work_after == Some(YesNo::Yes));
        Ok(RecordRef::Application)
    }
}
