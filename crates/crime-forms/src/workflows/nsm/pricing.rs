use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::codes::{DisbursementType, LetterOrCall, WorkType};
use super::domain::{Claim, Disbursement, WorkItem};
use crate::workflows::steps::forms::{total_minutes, Checker, FormErrors, FormParams};
use crate::workflows::steps::money::{minutes_at, percentage_uplift, round_pennies, vat_on};

/// Rate schedule applied to a claim, chosen by the claim's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pricing {
    pub preparation: Decimal,
    pub advocacy: Decimal,
    pub attendance_with_counsel: Decimal,
    pub attendance_without_counsel: Decimal,
    pub travel: Decimal,
    pub waiting: Decimal,
    pub letters: Decimal,
    pub calls: Decimal,
    pub car: Decimal,
    pub motorcycle: Decimal,
    pub bike: Decimal,
    pub vat: Decimal,
}

/// First day the uplifted schedule applies.
pub fn uplifted_rates_from() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 30).unwrap_or_default()
}

impl Pricing {
    pub fn for_claim(claim: &Claim) -> Self {
        match claim.date() {
            Some(date) if date >= uplifted_rates_from() => Self::uplifted(),
            _ => Self::standard(),
        }
    }

    pub fn standard() -> Self {
        Self {
            preparation: Decimal::new(5215, 2),
            advocacy: Decimal::new(6542, 2),
            attendance_with_counsel: Decimal::new(3568, 2),
            attendance_without_counsel: Decimal::new(5215, 2),
            travel: Decimal::new(2483, 2),
            waiting: Decimal::new(2483, 2),
            letters: Decimal::new(409, 2),
            calls: Decimal::new(409, 2),
            car: Decimal::new(45, 2),
            motorcycle: Decimal::new(45, 2),
            bike: Decimal::new(25, 2),
            vat: Decimal::new(2, 1),
        }
    }

    pub fn uplifted() -> Self {
        Self {
            preparation: Decimal::new(5689, 2),
            advocacy: Decimal::new(7137, 2),
            attendance_with_counsel: Decimal::new(3892, 2),
            attendance_without_counsel: Decimal::new(5689, 2),
            travel: Decimal::new(2709, 2),
            waiting: Decimal::new(2709, 2),
            letters: Decimal::new(446, 2),
            calls: Decimal::new(446, 2),
            ..Self::standard()
        }
    }

    pub fn work_type(&self, work_type: WorkType) -> Decimal {
        match work_type {
            WorkType::Preparation => self.preparation,
            WorkType::Advocacy => self.advocacy,
            WorkType::AttendanceWithCounsel => self.attendance_with_counsel,
            WorkType::AttendanceWithoutCounsel => self.attendance_without_counsel,
            WorkType::Travel => self.travel,
            WorkType::Waiting => self.waiting,
        }
    }

    pub fn letter_or_call(&self, kind: LetterOrCall) -> Decimal {
        match kind {
            LetterOrCall::Letters => self.letters,
            LetterOrCall::Calls => self.calls,
        }
    }

    pub fn mileage(&self, disbursement_type: DisbursementType) -> Option<Decimal> {
        match disbursement_type {
            DisbursementType::Car => Some(self.car),
            DisbursementType::Motorcycle => Some(self.motorcycle),
            DisbursementType::Bike => Some(self.bike),
            DisbursementType::Other => None,
        }
    }
}

/// `(minutes / 60) × rate × (1 + uplift%)`, unrounded.
pub fn work_item_cost(item: &WorkItem, pricing: &Pricing) -> Decimal {
    match (item.work_type, item.time_spent) {
        (Some(work_type), Some(minutes)) => percentage_uplift(
            minutes_at(pricing.work_type(work_type), minutes),
            item.uplift,
        ),
        _ => Decimal::ZERO,
    }
}

/// Mileage is `miles × rate` rounded to pence; other types use the entered cost.
pub fn disbursement_cost(
    disbursement_type: Option<DisbursementType>,
    miles: Option<Decimal>,
    total_cost_without_vat: Option<Decimal>,
    pricing: &Pricing,
) -> Decimal {
    match disbursement_type.and_then(|kind| pricing.mileage(kind)) {
        Some(rate) => miles
            .map(|miles| round_pennies(miles.saturating_mul(rate)))
            .unwrap_or(Decimal::ZERO),
        None => total_cost_without_vat.unwrap_or(Decimal::ZERO),
    }
}

pub fn disbursement_vat(cost: Decimal, apply_vat: bool, pricing: &Pricing) -> Decimal {
    if apply_vat {
        vat_on(cost, pricing.vat)
    } else {
        Decimal::ZERO
    }
}

pub fn letters_or_calls_cost(
    count: Option<i64>,
    uplift: Option<i64>,
    kind: LetterOrCall,
    pricing: &Pricing,
) -> Decimal {
    let count = count.unwrap_or_default();
    percentage_uplift(
        pricing.letter_or_call(kind).saturating_mul(Decimal::from(count)),
        uplift,
    )
}

pub fn letters_and_calls_total(claim: &Claim, pricing: &Pricing) -> Decimal {
    letters_or_calls_cost(claim.letters, claim.letters_uplift, LetterOrCall::Letters, pricing)
        + letters_or_calls_cost(claim.calls, claim.calls_uplift, LetterOrCall::Calls, pricing)
}

fn stored_disbursement_cost(disbursement: &Disbursement) -> Decimal {
    disbursement
        .total_cost_without_vat
        .unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkTypeTotal {
    pub work_type: WorkType,
    pub minutes: i64,
    pub cost: Decimal,
}

/// Claimed totals as shown on check-answers and stamped at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostSummary {
    pub work_types: Vec<WorkTypeTotal>,
    pub letters_and_calls: Decimal,
    pub profit_costs: Decimal,
    pub profit_costs_vat: Decimal,
    pub disbursements: Decimal,
    pub disbursements_vat: Decimal,
    pub total: Decimal,
    pub total_inc_vat: Decimal,
}

impl CostSummary {
    pub fn for_claim(claim: &Claim) -> Self {
        let pricing = Pricing::for_claim(claim);

        let mut by_type: BTreeMap<WorkType, (i64, Decimal)> = BTreeMap::new();
        for item in &claim.work_items {
            if let Some(work_type) = item.work_type {
                let entry = by_type.entry(work_type).or_default();
                entry.0 += item.time_spent.unwrap_or_default();
                entry.1 += work_item_cost(item, &pricing);
            }
        }
        let work_types: Vec<WorkTypeTotal> = by_type
            .into_iter()
            .map(|(work_type, (minutes, cost))| WorkTypeTotal {
                work_type,
                minutes,
                cost: round_pennies(cost),
            })
            .collect();

        let letters_and_calls = round_pennies(letters_and_calls_total(claim, &pricing));
        let profit_costs =
            work_types.iter().map(|total| total.cost).sum::<Decimal>() + letters_and_calls;
        let profit_costs_vat = if claim.vat_registered() {
            vat_on(profit_costs, pricing.vat)
        } else {
            Decimal::ZERO
        };

        let disbursements = claim
            .disbursements
            .iter()
            .map(stored_disbursement_cost)
            .sum::<Decimal>();
        let disbursements_vat = claim
            .disbursements
            .iter()
            .filter_map(|disbursement| disbursement.vat_amount)
            .sum::<Decimal>();

        let total = profit_costs + disbursements;
        let total_inc_vat = total + profit_costs_vat + disbursements_vat;

        Self {
            work_types,
            letters_and_calls,
            profit_costs,
            profit_costs_vat,
            disbursements,
            disbursements_vat,
            total,
            total_inc_vat,
        }
    }
}

/// Running totals for a page still being filled in.
///
/// Inputs are read leniently: anything missing, malformed or negative
/// contributes zero instead of an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CostPreview {
    pub work_item: Decimal,
    pub letters: Decimal,
    pub calls: Decimal,
    pub disbursement: Decimal,
    pub disbursement_vat: Decimal,
}

impl CostPreview {
    pub fn from_params(claim: &Claim, params: &FormParams) -> Self {
        let pricing = Pricing::for_claim(claim);
        let mut ignored = FormErrors::default();
        let mut checker = Checker::new(params, &mut ignored);

        let uplift_for = |apply: bool, uplift: Option<i64>| {
            uplift.filter(|percent| apply && claim.allows_uplift() && (0..=100).contains(percent))
        };

        let work_type: Option<WorkType> = checker.code("work_type");
        let minutes = total_minutes(
            checker.integer("time_spent_hours"),
            checker.integer("time_spent_minutes"),
        )
        .filter(|minutes| *minutes > 0);
        let work_item = match (work_type, minutes) {
            (Some(work_type), Some(minutes)) => round_pennies(percentage_uplift(
                minutes_at(pricing.work_type(work_type), minutes),
                uplift_for(checker.flag("apply_uplift"), checker.integer("uplift")),
            )),
            _ => Decimal::ZERO,
        };

        let counter = |count: Option<i64>, uplift: Option<i64>, kind: LetterOrCall| {
            round_pennies(letters_or_calls_cost(
                count.filter(|count| *count > 0),
                uplift,
                kind,
                &pricing,
            ))
        };
        let letters = counter(
            checker.integer("letters"),
            uplift_for(
                checker.flag("apply_letters_uplift"),
                checker.integer("letters_uplift"),
            ),
            LetterOrCall::Letters,
        );
        let calls = counter(
            checker.integer("calls"),
            uplift_for(
                checker.flag("apply_calls_uplift"),
                checker.integer("calls_uplift"),
            ),
            LetterOrCall::Calls,
        );

        let positive = |value: Option<Decimal>| value.filter(|amount| *amount > Decimal::ZERO);
        let disbursement = disbursement_cost(
            checker.code("disbursement_type"),
            positive(checker.decimal("miles")),
            positive(checker.decimal("total_cost_without_vat")),
            &pricing,
        );
        let disbursement_vat =
            disbursement_vat(disbursement, checker.flag("apply_vat"), &pricing);

        Self {
            work_item,
            letters,
            calls,
            disbursement,
            disbursement_vat,
        }
    }
}
