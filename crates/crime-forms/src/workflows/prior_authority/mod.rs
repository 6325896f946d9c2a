//! Prior authority applications (`crm4`).
//!
//! A provider asks for approval before spending on an expert or other
//! service. The application collects case and client details, a primary
//! quote priced per hour or per item, any additional costs, and the reason
//! the spend is needed. Submitting sends the `crm4` document to the app
//! store queue.

pub mod codes;
pub mod decisions;
pub mod domain;
pub mod forms;
pub mod payload;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod service;
pub mod tasks;

pub use decisions::PriorAuthorityDecisionTree;
pub use domain::{
    AdditionalCost, ApplicationId, ApplicationStatus, CostBasis, PriorAuthorityApplication, Quote,
};
pub use forms::{PriorAuthorityStep, APPLICATIONS_PREFIX};
pub use payload::{CostBasedRisk, PriorAuthorityPayloadBuilder};
pub use pricing::{ApplicationCosts, QuotePreview};
pub use repository::PriorAuthorityRepository;
pub use router::prior_authority_router;
pub use service::{ApplicationSummary, PriorAuthorityService, PriorAuthorityServiceError};
pub use tasks::{PriorAuthorityTask, TaskSection};

#[cfg(test)]
mod tests;
