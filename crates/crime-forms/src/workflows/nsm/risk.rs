use rust_decimal::Decimal;
use serde::Serialize;

use super::codes::ReasonForClaim;
use super::domain::Claim;
use super::pricing::CostSummary;
use crate::workflows::steps::values::YesNo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Assessment risk attached to a submitted application.
pub trait RiskScorer<A = Claim>: Send + Sync {
    fn score(&self, application: &A) -> RiskLevel;
}

/// Risk from the claim's reasons and claimed profit costs.
#[derive(Debug, Clone, Copy)]
pub struct RuleBasedRisk {
    low_risk_ceiling: Decimal,
}

impl Default for RuleBasedRisk {
    fn default() -> Self {
        Self {
            low_risk_ceiling: Decimal::from(500),
        }
    }
}

impl RuleBasedRisk {
    pub fn new(low_risk_ceiling: Decimal) -> Self {
        Self { low_risk_ceiling }
    }
}

impl RiskScorer for RuleBasedRisk {
    fn score(&self, claim: &Claim) -> RiskLevel {
        let high = claim.claims_reason(ReasonForClaim::EnhancedRates)
            || claim.claims_reason(ReasonForClaim::ExtraditionProceedings)
            || claim.assigned_counsel == Some(YesNo::Yes);
        if high {
            return RiskLevel::High;
        }

        if CostSummary::for_claim(claim).profit_costs < self.low_risk_ceiling {
            RiskLevel::Low
        } else {
            RiskLevel::Medium
        }
    }
}
