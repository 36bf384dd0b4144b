//! Common numeric and calendar helpers for the viability calculations.
//!
//! Everything here saturates instead of panicking so the engine stays total
//! over any input record.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use viability_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest whole number, with halves going toward positive
/// infinity (`-2.5` becomes `-2`, `2.5` becomes `3`).
pub fn round_half_toward_positive(value: Decimal) -> Decimal {
    value.saturating_add(Decimal::new(5, 1)).floor()
}

/// Multiplies, clamping to the representable range on overflow.
pub fn saturating_mul(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        if a.is_sign_negative() != b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Divides, clamping to the representable range on overflow.
///
/// Returns `None` only for a zero divisor.
pub fn saturating_div(
    a: Decimal,
    b: Decimal,
) -> Option<Decimal> {
    if b.is_zero() {
        return None;
    }
    Some(a.checked_div(b).unwrap_or_else(|| {
        if a.is_sign_negative() != b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    }))
}

/// Converts an already-integral decimal to a day count, saturating at the
/// `i64` bounds.
pub fn to_day_count(value: Decimal) -> i64 {
    value.trunc().to_i64().unwrap_or(if value.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Shifts `date` by a signed number of days, clamping to the calendar range.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use viability_core::calculations::common::offset_days;
///
/// let d = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
/// assert_eq!(offset_days(d, 3), NaiveDate::from_ymd_opt(2025, 2, 2).unwrap());
/// assert_eq!(offset_days(d, -30), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
/// ```
pub fn offset_days(
    date: NaiveDate,
    days: i64,
) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    // =========================================================================
    // round_half_toward_positive tests
    // =========================================================================

    #[test]
    fn round_half_toward_positive_positive_midpoint_rounds_up() {
        assert_eq!(round_half_toward_positive(dec!(2.5)), dec!(3));
        assert_eq!(round_half_toward_positive(dec!(24.5)), dec!(25));
    }

    #[test]
    fn round_half_toward_positive_negative_midpoint_rounds_up() {
        assert_eq!(round_half_toward_positive(dec!(-2.5)), dec!(-2));
        assert_eq!(round_half_toward_positive(dec!(-2.6)), dec!(-3));
    }

    #[test]
    fn round_half_toward_positive_keeps_integers() {
        assert_eq!(round_half_toward_positive(dec!(280)), dec!(280));
        assert_eq!(round_half_toward_positive(dec!(0)), dec!(0));
    }

    // =========================================================================
    // saturating arithmetic tests
    // =========================================================================

    #[test]
    fn saturating_mul_clamps_on_overflow() {
        assert_eq!(saturating_mul(Decimal::MAX, dec!(2)), Decimal::MAX);
        assert_eq!(saturating_mul(Decimal::MAX, dec!(-2)), Decimal::MIN);
        assert_eq!(saturating_mul(dec!(1.5), dec!(100.14)), dec!(150.210));
    }

    #[test]
    fn saturating_div_rejects_zero_divisor() {
        assert_eq!(saturating_div(dec!(10), dec!(0)), None);
    }

    #[test]
    fn saturating_div_clamps_on_overflow() {
        assert_eq!(
            saturating_div(Decimal::MAX, dec!(0.0001)),
            Some(Decimal::MAX)
        );
        assert_eq!(saturating_div(dec!(10000), dec!(200)), Some(dec!(50)));
    }

    // =========================================================================
    // to_day_count / offset_days tests
    // =========================================================================

    #[test]
    fn to_day_count_saturates() {
        assert_eq!(to_day_count(dec!(116)), 116);
        assert_eq!(to_day_count(Decimal::MAX), i64::MAX);
        assert_eq!(to_day_count(Decimal::MIN), i64::MIN);
    }

    #[test]
    fn offset_days_moves_both_directions() {
        assert_eq!(offset_days(date(2025, 3, 10), 280), date(2025, 12, 15));
        assert_eq!(offset_days(date(2025, 3, 10), -84), date(2024, 12, 16));
        assert_eq!(offset_days(date(2025, 3, 10), 0), date(2025, 3, 10));
    }

    #[test]
    fn offset_days_clamps_to_calendar_range() {
        assert_eq!(offset_days(date(2025, 3, 10), i64::MAX), NaiveDate::MAX);
        assert_eq!(offset_days(date(2025, 3, 10), i64::MIN), NaiveDate::MIN);
    }
}
