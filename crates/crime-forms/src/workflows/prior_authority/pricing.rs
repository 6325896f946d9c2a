use rust_decimal::Decimal;
use serde::Serialize;

use super::codes::CostType;
use super::domain::{CostBasis, PriorAuthorityApplication, Quote};
use crate::workflows::steps::forms::{total_minutes, Checker, FormErrors, FormParams};
use crate::workflows::steps::money::{item_cost, time_cost};

/// `round(cost_per_hour × period, 2)` or `cost_per_item × items`.
pub fn basis_cost(basis: &CostBasis) -> Decimal {
    match basis.cost_type {
        Some(CostType::PerHour) => time_cost(basis.cost_per_hour, basis.period),
        Some(CostType::PerItem) => item_cost(basis.cost_per_item, basis.items),
        None => Decimal::ZERO,
    }
}

pub fn travel_cost(quote: &Quote) -> Decimal {
    time_cost(quote.travel_cost_per_hour, quote.travel_time)
}

/// Requested amounts as shown on check-answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationCosts {
    pub service_cost: Decimal,
    pub travel_cost: Decimal,
    pub additional_costs: Decimal,
    pub total: Decimal,
}

impl ApplicationCosts {
    pub fn for_application(application: &PriorAuthorityApplication) -> Self {
        let quote = &application.primary_quote;
        let service_cost = basis_cost(&quote.cost);
        let travel_cost = travel_cost(quote);
        let additional_costs = application
            .additional_costs
            .iter()
            .map(|cost| basis_cost(&cost.cost))
            .fold(Decimal::ZERO, Decimal::saturating_add);

        Self {
            service_cost,
            travel_cost,
            additional_costs,
            total: service_cost
                .saturating_add(travel_cost)
                .saturating_add(additional_costs),
        }
    }
}

/// Running totals for a quote or additional cost page still being edited.
///
/// Malformed or missing quantities contribute zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuotePreview {
    pub cost: Decimal,
    pub travel_cost: Decimal,
}

impl QuotePreview {
    pub fn from_params(params: &FormParams) -> Self {
        let mut ignored = FormErrors::default();
        let mut checker = Checker::new(params, &mut ignored);

        let cost_type: Option<CostType> = checker
            .code("cost_type")
            .or_else(|| checker.code("unit_type"));
        let basis = match cost_type {
            Some(CostType::PerHour) => CostBasis::per_hour(
                checker.decimal("cost_per_hour"),
                total_minutes(
                    checker.integer("period_hours"),
                    checker.integer("period_minutes"),
                ),
            ),
            Some(CostType::PerItem) => {
                CostBasis::per_item(checker.decimal("cost_per_item"), checker.integer("items"))
            }
            None => CostBasis::default(),
        };
        let travel_cost = time_cost(
            checker.decimal("travel_cost_per_hour"),
            total_minutes(
                checker.integer("travel_time_hours"),
                checker.integer("travel_time_minutes"),
            ),
        );

        Self {
            cost: basis_cost(&basis),
            travel_cost,
        }
    }
}
