//! Step registry for prior authority applications and the form behind each step.

use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use super::codes::{CostType, ServiceType};
use super::domain::{
    AdditionalCost, ApplicationStatus, CostBasis, PriorAuthorityApplication, Quote,
};
use crate::workflows::steps::forms::{
    duration, pattern, rules, run_step, total_minutes, validate_duration, Checker, ErrorKind,
    FormErrors, FormParams, RecordMissing, RecordRef, StepForm, MAX_ITEMS,
};
use crate::workflows::steps::values::YesNo;

/// Route prefix for prior authority applications.
pub const APPLICATIONS_PREFIX: &str = "/prior-authority/applications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorAuthorityStep {
    Ufn,
    CaseContact,
    ClientDetail,
    PrimaryQuote,
    AdditionalCosts,
    AdditionalCostDetail,
    ReasonWhy,
    CheckAnswers,
}

impl PriorAuthorityStep {
    pub const ALL: [Self; 8] = [
        Self::Ufn,
        Self::CaseContact,
        Self::ClientDetail,
        Self::PrimaryQuote,
        Self::AdditionalCosts,
        Self::AdditionalCostDetail,
        Self::ReasonWhy,
        Self::CheckAnswers,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ufn => "ufn",
            Self::CaseContact => "case_contact",
            Self::ClientDetail => "client_detail",
            Self::PrimaryQuote => "primary_quote",
            Self::AdditionalCosts => "additional_costs",
            Self::AdditionalCostDetail => "additional_cost_detail",
            Self::ReasonWhy => "reason_why",
            Self::CheckAnswers => "check_answers",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.name() == name)
    }

    pub const fn is_record_step(self) -> bool {
        matches!(self, Self::AdditionalCostDetail)
    }
}

pub fn step_path(
    application: &PriorAuthorityApplication,
    step: &str,
    record: Option<&str>,
) -> String {
    let mut path = format!("{APPLICATIONS_PREFIX}/{}/steps/{step}", application.id);
    if let Some(record) = record {
        path.push('/');
        path.push_str(record);
    }
    path
}

/// Parse, validate and persist one step submission against an application.
pub fn apply(
    step: PriorAuthorityStep,
    params: &FormParams,
    application: &mut PriorAuthorityApplication,
    record: &RecordRef,
) -> Result<Result<RecordRef, FormErrors>, RecordMissing> {
    match step {
        PriorAuthorityStep::Ufn => run_step::<_, UfnForm>(params, application, record),
        PriorAuthorityStep::CaseContact => run_step::<_, CaseContactForm>(params, application, record),
        PriorAuthorityStep::ClientDetail => {
            run_step::<_, ClientDetailForm>(params, application, record)
        }
        PriorAuthorityStep::PrimaryQuote => {
            run_step::<_, PrimaryQuoteForm>(params, application, record)
        }
        PriorAuthorityStep::AdditionalCosts => {
            run_step::<_, AdditionalCostsForm>(params, application, record)
        }
        PriorAuthorityStep::AdditionalCostDetail => {
            run_step::<_, AdditionalCostDetailForm>(params, application, record)
        }
        PriorAuthorityStep::ReasonWhy => run_step::<_, ReasonWhyForm>(params, application, record),
        PriorAuthorityStep::CheckAnswers => {
            run_step::<_, CheckAnswersForm>(params, application, record)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UfnForm {
    pub ufn: Option<String>,
}

impl UfnForm {
    pub fn from_application(application: &PriorAuthorityApplication) -> Self {
        Self {
            ufn: application.ufn.clone(),
        }
    }
}

impl StepForm<PriorAuthorityApplication> for UfnForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let checker = Checker::new(params, errors);
        Self {
            ufn: checker.text("ufn"),
        }
    }

    fn validate(&self, _application: &PriorAuthorityApplication, errors: &mut FormErrors) {
        rules::ufn(errors, "ufn", &self.ufn);
    }

    /// A UFN turns the pre-draft into a listed draft.
    fn persist(
        self,
        application: &mut PriorAuthorityApplication,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        application.ufn = self.ufn;
        if application.status == ApplicationStatus::PreDraft {
            application.status = ApplicationStatus::Draft;
        }
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CaseContactForm {
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub firm_name: Option<String>,
    pub firm_account_number: Option<String>,
}

impl CaseContactForm {
    pub fn from_application(application: &PriorAuthorityApplication) -> Self {
        Self {
            contact_name: application.contact_name.clone(),
            contact_email: application.contact_email.clone(),
            firm_name: application.firm_name.clone(),
            firm_account_number: application.firm_account_number.clone(),
        }
    }
}

impl StepForm<PriorAuthorityApplication> for CaseContactForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let checker = Checker::new(params, errors);
        Self {
            contact_name: checker.text("contact_name"),
            contact_email: checker.text("contact_email"),
            firm_name: checker.text("firm_name"),
            firm_account_number: checker.text("firm_account_number"),
        }
    }

    fn validate(&self, _application: &PriorAuthorityApplication, errors: &mut FormErrors) {
        static ACCOUNT: OnceLock<regex::Regex> = OnceLock::new();
        rules::present_text(errors, "contact_name", &self.contact_name);
        rules::email(errors, "contact_email", &self.contact_email);
        rules::present_text(errors, "firm_name", &self.firm_name);
        rules::matches(
            errors,
            "firm_account_number",
            &self.firm_account_number,
            pattern(&ACCOUNT, r"(?i)^[0-9][A-Z][0-9]{3}[A-Z]$"),
        );
    }

    fn persist(
        self,
        application: &mut PriorAuthorityApplication,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        application.contact_name = self.contact_name;
        application.contact_email = self.contact_email;
        application.firm_name = self.firm_name;
        application.firm_account_number = self.firm_account_number.map(|code| code.to_uppercase());
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientDetailForm {
    pub client_first_name: Option<String>,
    pub client_last_name: Option<String>,
    pub client_date_of_birth: Option<NaiveDate>,
}

impl ClientDetailForm {
    pub fn from_application(application: &PriorAuthorityApplication) -> Self {
        Self {
            client_first_name: application.client_first_name.clone(),
            client_last_name: application.client_last_name.clone(),
            client_date_of_birth: application.client_date_of_birth,
        }
    }
}

impl StepForm<PriorAuthorityApplication> for ClientDetailForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            client_first_name: checker.text("client_first_name"),
            client_last_name: checker.text("client_last_name"),
            client_date_of_birth: checker.date("client_date_of_birth"),
        }
    }

    fn validate(&self, _application: &PriorAuthorityApplication, errors: &mut FormErrors) {
        rules::present_text(errors, "client_first_name", &self.client_first_name);
        rules::present_text(errors, "client_last_name", &self.client_last_name);
        if !errors.on("client_date_of_birth") {
            rules::past_date(errors, "client_date_of_birth", self.client_date_of_birth);
        }
    }

    fn persist(
        self,
        application: &mut PriorAuthorityApplication,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        application.client_first_name = self.client_first_name;
        application.client_last_name = self.client_last_name;
        application.client_date_of_birth = self.client_date_of_birth;
        Ok(RecordRef::Application)
    }
}

/// Cost basis fields as submitted, shared by quotes and additional costs.
#[derive(Debug, Clone, Default)]
pub struct CostFields {
    pub cost_type: Option<CostType>,
    pub cost_per_hour: Option<Decimal>,
    pub period_hours: Option<i64>,
    pub period_minutes: Option<i64>,
    pub cost_per_item: Option<Decimal>,
    pub items: Option<i64>,
}

impl CostFields {
    fn parse(checker: &mut Checker<'_>, type_field: &str) -> Self {
        let (period_hours, period_minutes) = duration(checker, "period");
        Self {
            cost_type: checker.code(type_field),
            cost_per_hour: checker.decimal("cost_per_hour"),
            period_hours,
            period_minutes,
            cost_per_item: checker.decimal("cost_per_item"),
            items: checker.integer("items"),
        }
    }

    fn from_basis(basis: &CostBasis) -> Self {
        Self {
            cost_type: basis.cost_type,
            cost_per_hour: basis.cost_per_hour,
            period_hours: basis.period.map(|minutes| minutes / 60),
            period_minutes: basis.period.map(|minutes| minutes % 60),
            cost_per_item: basis.cost_per_item,
            items: basis.items,
        }
    }

    fn validate(&self, type_field: &str, errors: &mut FormErrors) {
        match self.cost_type {
            None if !errors.on(type_field) => errors.add(type_field, ErrorKind::Blank),
            None => {}
            Some(CostType::PerHour) => {
                validate_duration(errors, "period", self.period_hours, self.period_minutes);
                if !errors.on("cost_per_hour") {
                    rules::amount(errors, "cost_per_hour", self.cost_per_hour);
                }
            }
            Some(CostType::PerItem) => {
                if !errors.on("items") {
                    rules::between(errors, "items", self.items, 1, MAX_ITEMS);
                }
                if !errors.on("cost_per_item") {
                    rules::amount(errors, "cost_per_item", self.cost_per_item);
                }
            }
        }
    }

    /// Keep only the chosen basis; the other basis' fields are cleared.
    fn into_basis(self) -> CostBasis {
        match self.cost_type {
            Some(CostType::PerHour) => CostBasis::per_hour(
                self.cost_per_hour,
                total_minutes(self.period_hours, self.period_minutes),
            ),
            Some(CostType::PerItem) => CostBasis::per_item(self.cost_per_item, self.items),
            None => CostBasis::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrimaryQuoteForm {
    pub service_type: Option<ServiceType>,
    pub custom_service_name: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub organisation: Option<String>,
    pub town: Option<String>,
    pub postcode: Option<String>,
    pub cost: CostFields,
    pub travel_time_hours: Option<i64>,
    pub travel_time_minutes: Option<i64>,
    pub travel_cost_per_hour: Option<Decimal>,
}

impl PrimaryQuoteForm {
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            service_type: quote.service_type,
            custom_service_name: quote.custom_service_name.clone(),
            contact_first_name: quote.contact_first_name.clone(),
            contact_last_name: quote.contact_last_name.clone(),
            organisation: quote.organisation.clone(),
            town: quote.town.clone(),
            postcode: quote.postcode.clone(),
            cost: CostFields::from_basis(&quote.cost),
            travel_time_hours: quote.travel_time.map(|minutes| minutes / 60),
            travel_time_minutes: quote.travel_time.map(|minutes| minutes % 60),
            travel_cost_per_hour: quote.travel_cost_per_hour,
        }
    }

    fn has_travel(&self, errors: &FormErrors) -> bool {
        self.travel_time_hours.is_some()
            || self.travel_time_minutes.is_some()
            || self.travel_cost_per_hour.is_some()
            || ["travel_time_hours", "travel_time_minutes", "travel_cost_per_hour"]
                .into_iter()
                .any(|field| errors.on(field))
    }
}

impl StepForm<PriorAuthorityApplication> for PrimaryQuoteForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        let (travel_time_hours, travel_time_minutes) = duration(&mut checker, "travel_time");
        Self {
            service_type: checker.code("service_type"),
            custom_service_name: checker.text("custom_service_name"),
            contact_first_name: checker.text("contact_first_name"),
            contact_last_name: checker.text("contact_last_name"),
            organisation: checker.text("organisation"),
            town: checker.text("town"),
            postcode: checker.text("postcode"),
            cost: CostFields::parse(&mut checker, "cost_type"),
            travel_time_hours,
            travel_time_minutes,
            travel_cost_per_hour: checker.decimal("travel_cost_per_hour"),
        }
    }

    fn validate(&self, _application: &PriorAuthorityApplication, errors: &mut FormErrors) {
        if !errors.on("service_type") {
            rules::present(errors, "service_type", &self.service_type);
        }
        if self.service_type.is_some_and(ServiceType::needs_name) {
            rules::present_text(errors, "custom_service_name", &self.custom_service_name);
        }
        rules::present_text(errors, "contact_first_name", &self.contact_first_name);
        rules::present_text(errors, "contact_last_name", &self.contact_last_name);
        rules::present_text(errors, "organisation", &self.organisation);
        rules::present_text(errors, "town", &self.town);
        rules::postcode(errors, "postcode", &self.postcode);
        self.cost.validate("cost_type", errors);

        // Travel is optional, but time and rate come together.
        if self.has_travel(errors) {
            validate_duration(
                errors,
                "travel_time",
                self.travel_time_hours,
                self.travel_time_minutes,
            );
            if !errors.on("travel_cost_per_hour") {
                rules::amount(errors, "travel_cost_per_hour", self.travel_cost_per_hour);
            }
        }
    }

    fn persist(
        self,
        application: &mut PriorAuthorityApplication,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        let travel_time = total_minutes(self.travel_time_hours, self.travel_time_minutes);
        application.primary_quote = Quote {
            custom_service_name: self
                .custom_service_name
                .filter(|_| self.service_type.is_some_and(ServiceType::needs_name)),
            service_type: self.service_type,
            contact_first_name: self.contact_first_name,
            contact_last_name: self.contact_last_name,
            organisation: self.organisation,
            town: self.town,
            postcode: self.postcode.map(|postcode| postcode.to_uppercase()),
            cost: self.cost.into_basis(),
            travel_cost_per_hour: self.travel_cost_per_hour.filter(|_| travel_time.is_some()),
            travel_time,
        };
        Ok(RecordRef::Application)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdditionalCostsForm {
    pub additional_costs_still_to_add: Option<YesNo>,
}

impl StepForm<PriorAuthorityApplication> for AdditionalCostsForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            additional_costs_still_to_add: checker.yes_no("additional_costs_still_to_add"),
        }
    }

    fn validate(&self, application: &PriorAuthorityApplication, errors: &mut FormErrors) {
        if !errors.on("additional_costs_still_to_add") {
            rules::present(
                errors,
                "additional_costs_still_to_add",
                &self.additional_costs_still_to_add,
            );
        }
        if self.additional_costs_still_to_add == Some(YesNo::No)
            && !additional_costs_complete(application)
        {
            errors.add("additional_costs", ErrorKind::Invalid);
        }
    }

    fn persist(
        self,
        application: &mut PriorAuthorityApplication,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        application.additional_costs_still_to_add = self.additional_costs_still_to_add;
        Ok(RecordRef::Application)
    }
}

/// Every recorded additional cost passes its own form.
pub fn additional_costs_complete(application: &PriorAuthorityApplication) -> bool {
    application
        .additional_costs
        .iter()
        .all(|cost| AdditionalCostDetailForm::from_cost(cost).is_valid(application))
}

#[derive(Debug, Clone, Default)]
pub struct AdditionalCostDetailForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cost: CostFields,
}

impl AdditionalCostDetailForm {
    pub fn from_cost(cost: &AdditionalCost) -> Self {
        Self {
            name: cost.name.clone(),
            description: cost.description.clone(),
            cost: CostFields::from_basis(&cost.cost),
        }
    }
}

impl StepForm<PriorAuthorityApplication> for AdditionalCostDetailForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let mut checker = Checker::new(params, errors);
        Self {
            name: checker.text("name"),
            description: checker.text("description"),
            cost: CostFields::parse(&mut checker, "unit_type"),
        }
    }

    fn validate(&self, _application: &PriorAuthorityApplication, errors: &mut FormErrors) {
        rules::present_text(errors, "name", &self.name);
        rules::present_text(errors, "description", &self.description);
        self.cost.validate("unit_type", errors);
    }

    fn persist(
        self,
        application: &mut PriorAuthorityApplication,
        record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        let id = match record {
            RecordRef::New => application.add_additional_cost(),
            RecordRef::Existing(id) if application.additional_cost(id).is_some() => id.clone(),
            RecordRef::Existing(_) | RecordRef::Application => {
                return Err(RecordMissing::new("additional cost", record))
            }
        };
        if let Some(cost) = application.additional_cost_mut(&id) {
            cost.name = self.name;
            cost.description = self.description;
            cost.cost = self.cost.into_basis();
        }
        Ok(RecordRef::Existing(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReasonWhyForm {
    pub reason_why: Option<String>,
}

impl ReasonWhyForm {
    pub fn from_application(application: &PriorAuthorityApplication) -> Self {
        Self {
            reason_why: application.reason_why.clone(),
        }
    }
}

impl StepForm<PriorAuthorityApplication> for ReasonWhyForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let checker = Checker::new(params, errors);
        Self {
            reason_why: checker.text("reason_why"),
        }
    }

    fn validate(&self, _application: &PriorAuthorityApplication, errors: &mut FormErrors) {
        rules::present_text(errors, "reason_why", &self.reason_why);
    }

    fn persist(
        self,
        application: &mut PriorAuthorityApplication,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        application.reason_why = self.reason_why;
        Ok(RecordRef::Application)
    }
}

/// Final confirmations. Saving as a draft skips both checks and writes nothing.
#[derive(Debug, Clone, Default)]
pub struct CheckAnswersForm {
    pub confirm_excluding_vat: bool,
    pub confirm_travel_expenditure: bool,
    pub commit_draft: bool,
}

impl StepForm<PriorAuthorityApplication> for CheckAnswersForm {
    fn parse(params: &FormParams, errors: &mut FormErrors) -> Self {
        let checker = Checker::new(params, errors);
        Self {
            confirm_excluding_vat: checker.flag("confirm_excluding_vat"),
            confirm_travel_expenditure: checker.flag("confirm_travel_expenditure"),
            commit_draft: checker.flag("commit_draft"),
        }
    }

    fn validate(&self, _application: &PriorAuthorityApplication, errors: &mut FormErrors) {
        if self.commit_draft {
            return;
        }
        rules::accepted(errors, "confirm_excluding_vat", self.confirm_excluding_vat);
        rules::accepted(
            errors,
            "confirm_travel_expenditure",
            self.confirm_travel_expenditure,
        );
    }

    fn persist(
        self,
        application: &mut PriorAuthorityApplication,
        _record: &RecordRef,
    ) -> Result<RecordRef, RecordMissing> {
        if self.commit_draft {
            return Ok(RecordRef::Application);
        }
        application.confirm_excluding_vat = Some(true);
        application.confirm_travel_expenditure = Some(true);
        application.status = match application.status {
            ApplicationStatus::SentBack => ApplicationStatus::ProviderUpdated,
            _ => ApplicationStatus::Submitted,
        };
        application.submitted_at = Some(Utc::now());
        Ok(RecordRef::Application)
    }
}

/// Rebuild the quote form from storage to check it is still complete.
pub fn primary_quote_complete(application: &PriorAuthorityApplication) -> bool {
    PrimaryQuoteForm::from_quote(&application.primary_quote).is_valid(application)
}
