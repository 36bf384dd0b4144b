//! Viability projection for a funded support plan.
//!
//! One linear pass over the client record:
//!
//! | Step | Derivation |
//! |------|------------|
//! | 1    | Today (read once, held fixed for the call) |
//! | 2    | Time horizon: days and weeks remaining, effective end date |
//! | 3    | Spend baseline: amount spent, weekly cost |
//! | 4    | Runway in weeks and the projected depletion date |
//! | 5    | Gap: required to finish, surplus/shortfall, buffer weeks |
//! | 6    | Status tier |
//! | 7    | Break-even hours per week |
//! | 8    | Advisory band |
//! | 9    | Weekly burn-down series |
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use viability_core::{ClientData, RateTable, TimeInputMode, ViabilityEngine, ViabilityStatus};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
//! let mut data = ClientData::defaults(today, &RateTable::default());
//! data.time_input_mode = TimeInputMode::Weeks;
//! data.manual_weeks_remaining = dec!(40);
//! data.hourly_rate = dec!(100);
//! data.hours_per_week = dec!(2);
//! data.current_balance = dec!(10000);
//!
//! let result = ViabilityEngine::new(today).calculate(&data);
//!
//! assert_eq!(result.weekly_cost, dec!(200));
//! assert_eq!(result.runway_weeks, dec!(50));
//! assert_eq!(result.surplus_shortfall, dec!(2000));
//! assert_eq!(result.status, ViabilityStatus::Platinum);
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{
    offset_days, round_half_toward_positive, saturating_div, saturating_mul, to_day_count,
};
use crate::clock::{Clock, SystemClock};
use crate::models::{
    AdviceKind, Advisory, AnalysisResult, BudgetSplit, BurnDownPoint, ClientData, TimeInputMode,
    ViabilityStatus,
};

/// Runway reported when nothing is being billed.
///
/// Only needs to dominate any realistic remaining plan length.
pub const RUNWAY_SENTINEL_WEEKS: Decimal = Decimal::from_parts(999, 0, 0, false, 0);

/// Extra weekly samples charted past the plan end.
const CHART_OVERSHOOT_WEEKS: i64 = 4;

/// Upper bound on charted weeks (a century), so absurd week counts cannot
/// allocate an unbounded series.
pub const MAX_CHART_WEEKS: i64 = 5_218;

const DAYS_PER_WEEK: Decimal = Decimal::from_parts(7, 0, 0, false, 0);

/// Projects a client record forward from a fixed "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViabilityEngine {
    today: NaiveDate,
}

/// Time horizon resolved from whichever field the mode makes authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Horizon {
    days_remaining: i64,
    weeks_remaining: Decimal,
    end_date: NaiveDate,
}

impl ViabilityEngine {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Reads the clock once; every derivation in a calculation shares that date.
    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.today())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Runs the full projection. Total over its input: degenerate records
    /// produce degenerate figures, never an error.
    pub fn calculate(
        &self,
        data: &ClientData,
    ) -> AnalysisResult {
        let horizon = self.horizon(data);

        let spent = self.spent(data.total_budget, data.current_balance);
        let weekly_cost = self.weekly_cost(data.hours_per_week, data.hourly_rate);

        let runway_weeks = self.runway_weeks(data.current_balance, weekly_cost);
        let depletion_date = self.depletion_date(runway_weeks);

        let required_to_finish = saturating_mul(weekly_cost, horizon.weeks_remaining);
        let surplus_shortfall = data.current_balance.saturating_sub(required_to_finish);
        let buffer_weeks = runway_weeks.saturating_sub(horizon.weeks_remaining);

        let status = ViabilityStatus::classify(runway_weeks, horizon.weeks_remaining);

        let break_even_hours = self.break_even_hours(
            data.current_balance,
            horizon.weeks_remaining,
            data.hourly_rate,
        );

        let advisory = Advisory {
            kind: AdviceKind::for_surplus(surplus_shortfall),
            hours_per_week: data.hours_per_week,
            surplus_shortfall,
            buffer_weeks,
            break_even_hours,
            depletion_date,
            plan_end_date: horizon.end_date,
        };

        let burn_down = self.burn_down(data.current_balance, weekly_cost, horizon.weeks_remaining);

        debug!(
            today = %self.today,
            days_remaining = horizon.days_remaining,
            %weekly_cost,
            %runway_weeks,
            %surplus_shortfall,
            status = status.as_str(),
            "viability calculated"
        );

        AnalysisResult {
            today: self.today,
            days_remaining: horizon.days_remaining,
            weeks_remaining: horizon.weeks_remaining,
            plan_start_date: data.plan_start_date,
            plan_end_date: horizon.end_date,
            depletion_date,
            spent,
            weekly_cost,
            runway_weeks,
            required_to_finish,
            surplus_shortfall,
            buffer_weeks,
            break_even_hours,
            status,
            advisory,
            budget_split: BudgetSplit::new(spent, data.current_balance),
            burn_down,
        }
    }

    /// Resolves days and weeks remaining plus the effective end date.
    ///
    /// Weeks mode takes the manual week count verbatim and synthesizes the end
    /// date from it. Dates mode counts days to the stored end date; a past end
    /// date leaves `days_remaining` non-positive and collapses weeks to zero.
    fn horizon(
        &self,
        data: &ClientData,
    ) -> Horizon {
        match data.time_input_mode {
            TimeInputMode::Weeks => {
                let weeks_remaining = data.manual_weeks_remaining;
                let days_remaining = to_day_count(round_half_toward_positive(saturating_mul(
                    weeks_remaining,
                    DAYS_PER_WEEK,
                )));
                Horizon {
                    days_remaining,
                    weeks_remaining,
                    end_date: offset_days(self.today, days_remaining),
                }
            }
            TimeInputMode::Dates => {
                let end_date = data.plan_end_date;
                let days_remaining = end_date.signed_duration_since(self.today).num_days();
                let weeks_remaining = if days_remaining > 0 {
                    Decimal::from(days_remaining) / DAYS_PER_WEEK
                } else {
                    Decimal::ZERO
                };
                Horizon {
                    days_remaining,
                    weeks_remaining,
                    end_date,
                }
            }
        }
    }

    /// Amount already spent, never negative.
    fn spent(
        &self,
        total_budget: Decimal,
        current_balance: Decimal,
    ) -> Decimal {
        total_budget
            .saturating_sub(current_balance)
            .max(Decimal::ZERO)
    }

    fn weekly_cost(
        &self,
        hours_per_week: Decimal,
        hourly_rate: Decimal,
    ) -> Decimal {
        saturating_mul(hours_per_week, hourly_rate)
    }

    /// Weeks the balance lasts at the weekly cost; the sentinel when nothing
    /// is being billed.
    fn runway_weeks(
        &self,
        current_balance: Decimal,
        weekly_cost: Decimal,
    ) -> Decimal {
        if weekly_cost > Decimal::ZERO {
            saturating_div(current_balance, weekly_cost).unwrap_or(RUNWAY_SENTINEL_WEEKS)
        } else {
            RUNWAY_SENTINEL_WEEKS
        }
    }

    fn depletion_date(
        &self,
        runway_weeks: Decimal,
    ) -> NaiveDate {
        let runway_days = to_day_count(saturating_mul(runway_weeks, DAYS_PER_WEEK).floor());
        offset_days(self.today, runway_days)
    }

    /// Hours per week that would exactly exhaust the balance by the end date.
    fn break_even_hours(
        &self,
        current_balance: Decimal,
        weeks_remaining: Decimal,
        hourly_rate: Decimal,
    ) -> Decimal {
        if weeks_remaining > Decimal::ZERO && hourly_rate > Decimal::ZERO {
            saturating_div(current_balance, saturating_mul(weeks_remaining, hourly_rate))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }

    /// Weekly balance samples from today through `ceil(weeks) + 4` weeks,
    /// clamped at zero so the curve flattens after depletion.
    fn burn_down(
        &self,
        current_balance: Decimal,
        weekly_cost: Decimal,
        weeks_remaining: Decimal,
    ) -> Vec<BurnDownPoint> {
        let weeks_to_chart = to_day_count(weeks_remaining.ceil())
            .saturating_add(CHART_OVERSHOOT_WEEKS)
            .min(MAX_CHART_WEEKS);
        if weeks_to_chart < 0 {
            return Vec::new();
        }

        (0..=weeks_to_chart)
            .map(|week| {
                let burned = saturating_mul(Decimal::from(week), weekly_cost);
                BurnDownPoint {
                    date: offset_days(self.today, week.saturating_mul(7)),
                    balance: current_balance.saturating_sub(burned).max(Decimal::ZERO),
                }
            })
            .collect()
    }
}

/// Projects `data` against the local wall-clock date.
pub fn calculate_viability(data: &ClientData) -> AnalysisResult {
    ViabilityEngine::from_clock(&SystemClock).calculate(data)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{RateTable, SupportLevel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 3, 10)
    }

    fn engine() -> ViabilityEngine {
        ViabilityEngine::new(today())
    }

    fn weeks_input(weeks: Decimal) -> ClientData {
        ClientData {
            support_level: SupportLevel::Level2,
            hourly_rate: dec!(100),
            time_input_mode: TimeInputMode::Weeks,
            plan_start_date: date(2024, 12, 16),
            plan_end_date: date(2025, 12, 15),
            manual_weeks_remaining: weeks,
            total_budget: dec!(18000),
            current_balance: dec!(10000),
            hours_per_week: dec!(2),
        }
    }

    // =========================================================================
    // horizon tests
    // =========================================================================

    #[test]
    fn horizon_weeks_mode_synthesizes_end_date() {
        let horizon = engine().horizon(&weeks_input(dec!(40)));

        assert_eq!(horizon.weeks_remaining, dec!(40));
        assert_eq!(horizon.days_remaining, 280);
        assert_eq!(horizon.end_date, date(2025, 12, 15));
    }

    #[test]
    fn horizon_weeks_mode_rounds_days() {
        // 3.5 * 7 = 24.5 -> 25
        let horizon = engine().horizon(&weeks_input(dec!(3.5)));

        assert_eq!(horizon.days_remaining, 25);
        assert_eq!(horizon.end_date, date(2025, 4, 4));
    }

    #[test]
    fn horizon_weeks_mode_ignores_stored_end_date() {
        let mut data = weeks_input(dec!(1));
        data.plan_end_date = date(2030, 1, 1);

        let horizon = engine().horizon(&data);

        assert_eq!(horizon.end_date, date(2025, 3, 17));
    }

    #[test]
    fn horizon_weeks_mode_keeps_negative_weeks() {
        let horizon = engine().horizon(&weeks_input(dec!(-2)));

        assert_eq!(horizon.weeks_remaining, dec!(-2));
        assert_eq!(horizon.days_remaining, -14);
        assert_eq!(horizon.end_date, date(2025, 2, 24));
    }

    #[test]
    fn horizon_dates_mode_counts_days_to_end() {
        let mut data = weeks_input(dec!(0));
        data.time_input_mode = TimeInputMode::Dates;
        data.plan_end_date = date(2025, 3, 20);

        let horizon = engine().horizon(&data);

        assert_eq!(horizon.days_remaining, 10);
        assert_eq!(horizon.weeks_remaining, dec!(10) / dec!(7));
        assert_eq!(horizon.end_date, date(2025, 3, 20));
    }

    #[test]
    fn horizon_dates_mode_past_end_collapses_weeks() {
        let mut data = weeks_input(dec!(40));
        data.time_input_mode = TimeInputMode::Dates;
        data.plan_end_date = date(2025, 3, 1);

        let horizon = engine().horizon(&data);

        assert_eq!(horizon.days_remaining, -9);
        assert_eq!(horizon.weeks_remaining, dec!(0));
    }

    #[test]
    fn horizon_dates_mode_end_today_is_zero() {
        let mut data = weeks_input(dec!(40));
        data.time_input_mode = TimeInputMode::Dates;
        data.plan_end_date = today();

        let horizon = engine().horizon(&data);

        assert_eq!(horizon.days_remaining, 0);
        assert_eq!(horizon.weeks_remaining, dec!(0));
    }

    // =========================================================================
    // spend baseline tests
    // =========================================================================

    #[test]
    fn spent_is_budget_minus_balance() {
        assert_eq!(engine().spent(dec!(18000), dec!(14500)), dec!(3500));
    }

    #[test]
    fn spent_never_negative() {
        assert_eq!(engine().spent(dec!(1000), dec!(1500)), dec!(0));
    }

    #[test]
    fn weekly_cost_multiplies_hours_by_rate() {
        assert_eq!(engine().weekly_cost(dec!(1.5), dec!(100.14)), dec!(150.21));
    }

    // =========================================================================
    // runway tests
    // =========================================================================

    #[test]
    fn runway_divides_balance_by_weekly_cost() {
        assert_eq!(engine().runway_weeks(dec!(10000), dec!(200)), dec!(50));
    }

    #[test]
    fn runway_zero_cost_is_sentinel() {
        assert_eq!(engine().runway_weeks(dec!(10000), dec!(0)), RUNWAY_SENTINEL_WEEKS);
    }

    #[test]
    fn runway_negative_cost_is_sentinel() {
        assert_eq!(engine().runway_weeks(dec!(10000), dec!(-5)), RUNWAY_SENTINEL_WEEKS);
    }

    #[test]
    fn depletion_date_floors_runway_days() {
        // 16.666.. weeks * 7 = 116.66.. -> 116 days
        let runway = dec!(10000) / dec!(600);

        assert_eq!(engine().depletion_date(runway), date(2025, 7, 4));
    }

    #[test]
    fn depletion_date_for_sentinel() {
        assert_eq!(
            engine().depletion_date(RUNWAY_SENTINEL_WEEKS),
            offset_days(today(), 6993)
        );
    }

    // =========================================================================
    // break-even tests
    // =========================================================================

    #[test]
    fn break_even_hours_exhausts_balance_by_end() {
        let result = engine().break_even_hours(dec!(10000), dec!(40), dec!(100));

        assert_eq!(result, dec!(2.5));
    }

    #[test]
    fn break_even_hours_zero_without_time_or_rate() {
        assert_eq!(engine().break_even_hours(dec!(10000), dec!(0), dec!(100)), dec!(0));
        assert_eq!(engine().break_even_hours(dec!(10000), dec!(-3), dec!(100)), dec!(0));
        assert_eq!(engine().break_even_hours(dec!(10000), dec!(40), dec!(0)), dec!(0));
    }

    // =========================================================================
    // burn-down tests
    // =========================================================================

    #[test]
    fn burn_down_has_ceil_weeks_plus_five_points() {
        let points = engine().burn_down(dec!(10000), dec!(200), dec!(2.1));

        assert_eq!(points.len(), 8);
        assert_eq!(points[0].date, today());
        assert_eq!(points[7].date, date(2025, 4, 28));
    }

    #[test]
    fn burn_down_clamps_at_zero() {
        let points = engine().burn_down(dec!(1000), dec!(400), dec!(2));

        let balances: Vec<Decimal> = points.iter().map(|p| p.balance).collect();
        assert_eq!(
            balances,
            vec![dec!(1000), dec!(600), dec!(200), dec!(0), dec!(0), dec!(0), dec!(0)]
        );
    }

    #[test]
    fn burn_down_flat_without_cost() {
        let points = engine().burn_down(dec!(500), dec!(0), dec!(1));

        assert!(points.iter().all(|p| p.balance == dec!(500)));
    }

    #[test]
    fn burn_down_empty_for_very_negative_weeks() {
        let points = engine().burn_down(dec!(500), dec!(10), dec!(-10));

        assert!(points.is_empty());
    }

    // =========================================================================
    // calculate (integration) tests
    // =========================================================================

    #[test]
    fn calculate_reference_defaults() {
        let data = ClientData::defaults(today(), &RateTable::default());

        let result = engine().calculate(&data);

        assert_eq!(result.days_remaining, 280);
        assert_eq!(result.weeks_remaining, dec!(40));
        assert_eq!(result.spent, dec!(3500));
        assert_eq!(result.weekly_cost, dec!(150.21));
        assert_eq!(result.required_to_finish, dec!(6008.40));
        assert_eq!(result.surplus_shortfall, dec!(8491.60));
        assert_eq!(result.status, ViabilityStatus::Platinum);
        assert_eq!(result.advisory.kind, AdviceKind::Opportunity);
        assert_eq!(result.burn_down.len(), 45);
    }

    #[test]
    fn calculate_advisory_carries_key_figures() {
        let mut data = weeks_input(dec!(40));
        data.hours_per_week = dec!(6);

        let result = engine().calculate(&data);

        assert_eq!(result.advisory.kind, AdviceKind::Danger);
        assert_eq!(result.advisory.hours_per_week, dec!(6));
        assert_eq!(result.advisory.surplus_shortfall, dec!(-14000));
        assert_eq!(result.advisory.break_even_hours, dec!(2.5));
        assert_eq!(result.advisory.depletion_date, date(2025, 7, 4));
        assert_eq!(result.advisory.plan_end_date, date(2025, 12, 15));
    }

    #[test]
    fn burn_down_is_capped_for_absurd_horizons() {
        let points = engine().burn_down(dec!(500), dec!(10), dec!(1000000000));

        assert_eq!(points.len(), MAX_CHART_WEEKS as usize + 1);
    }

    #[test]
    fn calculate_survives_extreme_money_inputs() {
        let mut data = weeks_input(dec!(40));
        data.hours_per_week = Decimal::MAX;
        data.hourly_rate = Decimal::MAX;
        data.current_balance = Decimal::MIN;

        let result = engine().calculate(&data);

        assert_eq!(result.weekly_cost, Decimal::MAX);
        assert_eq!(result.surplus_shortfall, Decimal::MIN);
        assert!(result.burn_down.iter().all(|p| p.balance == dec!(0)));
    }

    #[test]
    fn calculate_survives_extreme_horizon() {
        let result = engine().calculate(&weeks_input(Decimal::MAX));

        assert_eq!(result.plan_end_date, NaiveDate::MAX);
        assert_eq!(result.burn_down.len(), MAX_CHART_WEEKS as usize + 1);
    }
}
