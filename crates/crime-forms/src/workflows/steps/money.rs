use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round to pence, halves away from zero.
pub fn round_pennies(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Products here saturate at `Decimal::MAX` rather than overflow.
pub fn percentage_uplift(amount: Decimal, uplift: Option<i64>) -> Decimal {
    match uplift {
        Some(percent) if percent != 0 => {
            let factor = Decimal::ONE_HUNDRED.saturating_add(Decimal::from(percent));
            amount.saturating_mul(factor) / Decimal::ONE_HUNDRED
        }
        _ => amount,
    }
}

/// Cost of `minutes` at an hourly rate, unrounded.
pub fn minutes_at(rate_per_hour: Decimal, minutes: i64) -> Decimal {
    rate_per_hour.saturating_mul(Decimal::from(minutes)) / Decimal::from(60)
}

/// Time-based cost for previews: zero unless both inputs are usable.
pub fn time_cost(cost_per_hour: Option<Decimal>, minutes: Option<i64>) -> Decimal {
    match (cost_per_hour, minutes) {
        (Some(rate), Some(period)) if rate > Decimal::ZERO && period > 0 => {
            round_pennies(minutes_at(rate, period))
        }
        _ => Decimal::ZERO,
    }
}

/// Per-item cost for previews: zero unless both inputs are usable.
pub fn item_cost(cost_per_item: Option<Decimal>, items: Option<i64>) -> Decimal {
    match (cost_per_item, items) {
        (Some(cost), Some(count)) if cost > Decimal::ZERO && count > 0 => {
            cost.saturating_mul(Decimal::from(count))
        }
        _ => Decimal::ZERO,
    }
}

pub fn vat_on(amount: Decimal, rate: Decimal) -> Decimal {
    round_pennies(amount.saturating_mul(rate))
}

pub fn to_float(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// `£1,234.50` style display.
pub fn format_pounds(value: Decimal) -> String {
    let rounded = round_pennies(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, pence) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}£{grouped}.{pence}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("decimal literal")
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(round_pennies(dec("5.175")), dec("5.18"));
        assert_eq!(round_pennies(dec("1.035")), dec("1.04"));
        assert_eq!(round_pennies(dec("1.034")), dec("1.03"));
    }

    #[test]
    fn uplift_scales_by_percentage() {
        assert_eq!(percentage_uplift(dec("100"), Some(20)), dec("120"));
        assert_eq!(percentage_uplift(dec("100"), None), dec("100"));
    }

    #[test]
    fn time_cost_uses_hours_and_minutes() {
        assert_eq!(time_cost(Some(dec("50")), Some(90)), dec("75.00"));
        assert_eq!(time_cost(Some(dec("10")), Some(20)), dec("3.33"));
    }

    #[test]
    fn previews_fall_back_to_zero() {
        assert_eq!(time_cost(None, Some(60)), Decimal::ZERO);
        assert_eq!(time_cost(Some(dec("10")), Some(0)), Decimal::ZERO);
        assert_eq!(item_cost(Some(dec("-1")), Some(3)), Decimal::ZERO);
        assert_eq!(item_cost(Some(dec("2.50")), Some(4)), dec("10.00"));
    }

    #[test]
    fn oversized_products_saturate() {
        assert_eq!(
            item_cost(Some(dec("1000000000000")), Some(9_000_000_000_000_000_000)),
            Decimal::MAX
        );
        assert_eq!(
            percentage_uplift(dec("4460000000000000000"), Some(1_000_000_000_000_000_000)),
            Decimal::MAX / Decimal::ONE_HUNDRED
        );
        assert!(time_cost(Some(Decimal::MAX), Some(i64::MAX)) > Decimal::ZERO);
    }

    #[test]
    fn pounds_are_grouped_by_thousands() {
        assert_eq!(format_pounds(dec("1234567.5")), "£1,234,567.50");
        assert_eq!(format_pounds(dec("596.184")), "£596.18");
        assert_eq!(format_pounds(Decimal::ZERO), "£0.00");
    }
}
