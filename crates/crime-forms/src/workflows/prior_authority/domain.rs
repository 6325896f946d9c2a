use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::codes::{CostType, ServiceType};
use crate::workflows::nsm::domain::SupportingDocument;
use crate::workflows::steps::navigation::{HasNavigation, NavigationStack};
use crate::workflows::steps::values::{Coded, YesNo};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    PreDraft,
    Draft,
    Submitted,
    Granted,
    PartGrant,
    Rejected,
    SentBack,
    ProviderUpdated,
    Expired,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PreDraft => "pre_draft",
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Granted => "granted",
            Self::PartGrant => "part_grant",
            Self::Rejected => "rejected",
            Self::SentBack => "sent_back",
            Self::ProviderUpdated => "provider_updated",
            Self::Expired => "expired",
        }
    }

    pub const fn is_editable(self) -> bool {
        matches!(self, Self::PreDraft | Self::Draft | Self::SentBack)
    }

    pub const fn is_submitted(self) -> bool {
        !self.is_editable()
    }

    /// Listed with the provider's applications; pre-drafts have no UFN yet.
    pub const fn is_listed(self) -> bool {
        !matches!(self, Self::PreDraft)
    }
}

/// Price of a service, either by time or by item.
///
/// Only the fields of the chosen basis are kept; switching basis clears the
/// other set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBasis {
    pub cost_type: Option<CostType>,
    pub cost_per_hour: Option<Decimal>,
    /// Minutes.
    pub period: Option<i64>,
    pub cost_per_item: Option<Decimal>,
    pub items: Option<i64>,
}

impl CostBasis {
    pub fn per_hour(cost_per_hour: Option<Decimal>, period: Option<i64>) -> Self {
        Self {
            cost_type: Some(CostType::PerHour),
            cost_per_hour,
            period,
            cost_per_item: None,
            items: None,
        }
    }

    pub fn per_item(cost_per_item: Option<Decimal>, items: Option<i64>) -> Self {
        Self {
            cost_type: Some(CostType::PerItem),
            cost_per_hour: None,
            period: None,
            cost_per_item,
            items,
        }
    }
}

/// The quote the application is built around.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub service_type: Option<ServiceType>,
    pub custom_service_name: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub organisation: Option<String>,
    pub town: Option<String>,
    pub postcode: Option<String>,
    pub cost: CostBasis,
    /// Minutes.
    pub travel_time: Option<i64>,
    pub travel_cost_per_hour: Option<Decimal>,
}

impl Quote {
    pub fn service_name(&self) -> Option<String> {
        match self.service_type {
            Some(ServiceType::Custom) => self.custom_service_name.clone(),
            Some(service) => Some(service.label().to_string()),
            None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalCost {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub cost: CostBasis,
}

impl AdditionalCost {
    pub fn blank(id: String) -> Self {
        Self {
            id,
            name: None,
            description: None,
            cost: CostBasis::default(),
        }
    }
}

/// A request for prior authority to incur expenditure, such as an expert's fees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorAuthorityApplication {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub submitter: String,
    pub office_code: Option<String>,

    pub ufn: Option<String>,

    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub firm_name: Option<String>,
    pub firm_account_number: Option<String>,

    pub client_first_name: Option<String>,
    pub client_last_name: Option<String>,
    pub client_date_of_birth: Option<NaiveDate>,

    pub primary_quote: Quote,
    pub additional_costs_still_to_add: Option<YesNo>,
    pub additional_costs: Vec<AdditionalCost>,
    pub reason_why: Option<String>,
    pub supporting_documents: Vec<SupportingDocument>,

    pub confirm_excluding_vat: Option<bool>,
    pub confirm_travel_expenditure: Option<bool>,

    pub navigation: NavigationStack,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    next_record: u64,
}

impl HasNavigation for PriorAuthorityApplication {
    fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }
}

impl PriorAuthorityApplication {
    pub fn new(id: ApplicationId, submitter: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: ApplicationStatus::PreDraft,
            submitter: submitter.into(),
            office_code: None,
            ufn: None,
            contact_name: None,
            contact_email: None,
            firm_name: None,
            firm_account_number: None,
            client_first_name: None,
            client_last_name: None,
            client_date_of_birth: None,
            primary_quote: Quote::default(),
            additional_costs_still_to_add: None,
            additional_costs: Vec::new(),
            reason_why: None,
            supporting_documents: Vec::new(),
            confirm_excluding_vat: None,
            confirm_travel_expenditure: None,
            navigation: NavigationStack::new(),
            created_at: now,
            updated_at: now,
            submitted_at: None,
            next_record: 1,
        }
    }

    pub fn client_name(&self) -> Option<String> {
        let name = [self.client_first_name.as_deref(), self.client_last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }

    pub fn next_record_id(&mut self, prefix: &str) -> String {
        let id = self.next_record;
        self.next_record += 1;
        format!("{prefix}-{id}")
    }

    pub fn additional_cost(&self, id: &str) -> Option<&AdditionalCost> {
        self.additional_costs.iter().find(|cost| cost.id == id)
    }

    pub fn additional_cost_mut(&mut self, id: &str) -> Option<&mut AdditionalCost> {
        self.additional_costs.iter_mut().find(|cost| cost.id == id)
    }

    pub fn add_additional_cost(&mut self) -> String {
        let id = self.next_record_id("cost");
        self.additional_costs.push(AdditionalCost::blank(id.clone()));
        id
    }
}
