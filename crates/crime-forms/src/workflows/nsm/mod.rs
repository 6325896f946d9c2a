//! Non-standard magistrates' fee claims (`crm7`).
//!
//! A claim moves through the task list from claim type to the solicitor
//! declaration. The declaration stamps the claimed totals, submits the
//! `crm7` document to the app store queue, and locks the claim until a
//! caseworker sends it back.

pub mod codes;
pub mod decisions;
pub mod domain;
pub mod forms;
pub mod payload;
pub mod pricing;
pub mod repository;
pub mod risk;
pub mod router;
pub mod service;
pub mod syncer;
pub mod tasks;

pub use decisions::NsmDecisionTree;
pub use domain::{Claim, ClaimId, ClaimStatus, Defendant, Disbursement, WorkItem};
pub use forms::{NsmStep, CLAIMS_PREFIX};
pub use payload::NsmPayloadBuilder;
pub use pricing::{CostPreview, CostSummary, Pricing};
pub use repository::ClaimRepository;
pub use risk::{RiskLevel, RiskScorer, RuleBasedRisk};
pub use router::nsm_router;
pub use service::{ClaimSummary, DocumentUpload, NsmClaimService, NsmServiceError, StepOutcome};
pub use syncer::{AssessmentSyncer, SyncReport};
pub use tasks::{NsmTask, TaskSection};

#[cfg(test)]
mod tests;
