use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Advisory tier for the funding position, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViabilityStatus {
    Platinum,
    Viable,
    Tight,
    NonViable,
}

impl ViabilityStatus {
    /// Runway must exceed the remaining plan by this factor to rate Platinum.
    pub const PLATINUM_FACTOR: Decimal = Decimal::from_parts(12, 0, 0, false, 1);
    /// Shortfall, in weeks, still tolerated as Tight.
    pub const TIGHT_TOLERANCE_WEEKS: Decimal = Decimal::TWO;

    /// First matching tier wins, evaluated best to worst.
    pub fn classify(
        runway_weeks: Decimal,
        weeks_remaining: Decimal,
    ) -> Self {
        let platinum_floor = weeks_remaining
            .checked_mul(Self::PLATINUM_FACTOR)
            .unwrap_or(if weeks_remaining.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            });
        let tight_floor = weeks_remaining
            .saturating_sub(Self::TIGHT_TOLERANCE_WEEKS)
            .max(Decimal::ZERO);

        if runway_weeks >= platinum_floor {
            Self::Platinum
        } else if runway_weeks >= weeks_remaining {
            Self::Viable
        } else if runway_weeks >= tight_floor {
            Self::Tight
        } else {
            Self::NonViable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Platinum => "platinum",
            Self::Viable => "viable",
            Self::Tight => "tight",
            Self::NonViable => "non_viable",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Platinum => "PLATINUM CLIENT (Safe Surplus)",
            Self::Viable => "VIABLE (On Track)",
            Self::Tight => "TIGHT (Monitor Closely)",
            Self::NonViable => "NON-VIABLE (Immediate Action Req)",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Platinum | Self::Viable => "🟢",
            Self::Tight => "🟡",
            Self::NonViable => "🔴",
        }
    }

    /// Chart-line colour token.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Platinum => "#00cc66",
            Self::Viable => "#66ff66",
            Self::Tight => "#ffff00",
            Self::NonViable => "#ff4444",
        }
    }

    /// Banner background style token.
    pub fn background(&self) -> &'static str {
        match self {
            Self::Platinum => "bg-emerald-900/30 border-emerald-500",
            Self::Viable => "bg-green-900/30 border-green-500",
            Self::Tight => "bg-yellow-900/30 border-yellow-500",
            Self::NonViable => "bg-red-900/30 border-red-500",
        }
    }
}

/// Advisory band, selected from the projected surplus or shortfall alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    Danger,
    Opportunity,
    Success,
}

impl AdviceKind {
    /// Shortfalls deeper than this are flagged as danger.
    pub const DANGER_BELOW: Decimal = Decimal::from_parts(500, 0, 0, true, 0);
    /// Surpluses above this are flagged as an opportunity.
    pub const OPPORTUNITY_ABOVE: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

    pub fn for_surplus(surplus_shortfall: Decimal) -> Self {
        if surplus_shortfall < Self::DANGER_BELOW {
            Self::Danger
        } else if surplus_shortfall > Self::OPPORTUNITY_ABOVE {
            Self::Opportunity
        } else {
            Self::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Opportunity => "opportunity",
            Self::Success => "success",
        }
    }
}

/// Structured advisory: the band plus the figures its text is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdviceKind,
    pub hours_per_week: Decimal,
    pub surplus_shortfall: Decimal,
    pub buffer_weeks: Decimal,
    pub break_even_hours: Decimal,
    pub depletion_date: NaiveDate,
    pub plan_end_date: NaiveDate,
}

/// One weekly sample of the projected balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnDownPoint {
    pub date: NaiveDate,
    /// Never negative.
    pub balance: Decimal,
}

/// Spent versus still-available money, the data behind a usage pie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSplit {
    pub spent: Decimal,
    pub available: Decimal,
    /// Fraction of the pie that is spent; may exceed 1 when the balance is negative.
    pub spent_share: Decimal,
}

impl BudgetSplit {
    /// Returns `None` when there is nothing to draw.
    pub fn new(
        spent: Decimal,
        available: Decimal,
    ) -> Option<Self> {
        let spent_part = spent.max(Decimal::ZERO);
        let total = spent_part.checked_add(available)?;
        if total <= Decimal::ZERO {
            return None;
        }
        Some(Self {
            spent,
            available,
            spent_share: spent_part.checked_div(total)?,
        })
    }
}

/// Everything the engine derives from one [`ClientData`](super::ClientData).
///
/// Values are raw; locale formatting lives in [`crate::format`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    // Time
    pub today: NaiveDate,
    /// Negative or zero when the plan end date has already passed.
    pub days_remaining: i64,
    pub weeks_remaining: Decimal,
    pub plan_start_date: NaiveDate,
    /// The effective end date; synthesized from the week count in weeks mode.
    pub plan_end_date: NaiveDate,
    pub depletion_date: NaiveDate,

    // Money
    pub spent: Decimal,
    pub weekly_cost: Decimal,
    pub runway_weeks: Decimal,
    pub required_to_finish: Decimal,
    pub surplus_shortfall: Decimal,
    pub buffer_weeks: Decimal,
    pub break_even_hours: Decimal,

    pub status: ViabilityStatus,
    pub advisory: Advisory,

    // Chart data
    pub budget_split: Option<BudgetSplit>,
    pub burn_down: Vec<BurnDownPoint>,
}

impl AnalysisResult {
    /// True when the end date is today or earlier; callers should ask for a
    /// future end date.
    pub fn plan_has_ended(&self) -> bool {
        self.days_remaining <= 0
    }

    pub fn outcome_label(&self) -> &'static str {
        if self.surplus_shortfall >= Decimal::ZERO {
            "Surplus"
        } else {
            "Shortfall"
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // ViabilityStatus::classify tests
    // =========================================================================

    #[test]
    fn classify_platinum_at_exact_factor() {
        let result = ViabilityStatus::classify(dec!(48), dec!(40));

        assert_eq!(result, ViabilityStatus::Platinum);
    }

    #[test]
    fn classify_viable_between_match_and_factor() {
        let result = ViabilityStatus::classify(dec!(47.99), dec!(40));

        assert_eq!(result, ViabilityStatus::Viable);
    }

    #[test]
    fn classify_viable_at_exact_match() {
        let result = ViabilityStatus::classify(dec!(40), dec!(40));

        assert_eq!(result, ViabilityStatus::Viable);
    }

    #[test]
    fn classify_tight_within_two_weeks() {
        assert_eq!(ViabilityStatus::classify(dec!(38), dec!(40)), ViabilityStatus::Tight);
        assert_eq!(ViabilityStatus::classify(dec!(39.5), dec!(40)), ViabilityStatus::Tight);
    }

    #[test]
    fn classify_non_viable_beyond_tolerance() {
        let result = ViabilityStatus::classify(dec!(37.99), dec!(40));

        assert_eq!(result, ViabilityStatus::NonViable);
    }

    #[test]
    fn classify_short_plan_floors_tolerance_at_zero() {
        // 1.5 weeks left: tight floor is max(0, -0.5) = 0
        assert_eq!(ViabilityStatus::classify(dec!(0), dec!(1.5)), ViabilityStatus::Tight);
        assert_eq!(
            ViabilityStatus::classify(dec!(-0.1), dec!(1.5)),
            ViabilityStatus::NonViable
        );
    }

    #[test]
    fn classify_ended_plan_is_platinum_for_any_non_negative_runway() {
        assert_eq!(ViabilityStatus::classify(dec!(0), dec!(0)), ViabilityStatus::Platinum);
        assert_eq!(
            ViabilityStatus::classify(dec!(-1), dec!(0)),
            ViabilityStatus::NonViable
        );
    }

    #[test]
    fn classify_is_monotonic_in_runway() {
        let weeks = dec!(20);
        let mut previous = ViabilityStatus::NonViable;
        let mut runway = dec!(0);
        while runway <= dec!(30) {
            let status = ViabilityStatus::classify(runway, weeks);
            assert!(status <= previous, "{runway} moved from {previous:?} to {status:?}");
            previous = status;
            runway += dec!(0.25);
        }
    }

    #[test]
    fn status_tokens_are_distinct() {
        let all = [
            ViabilityStatus::Platinum,
            ViabilityStatus::Viable,
            ViabilityStatus::Tight,
            ViabilityStatus::NonViable,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.label(), b.label());
                assert_ne!(a.color(), b.color());
                assert_ne!(a.background(), b.background());
            }
        }
    }

    // =========================================================================
    // AdviceKind::for_surplus tests
    // =========================================================================

    #[test]
    fn advice_danger_below_minus_five_hundred() {
        assert_eq!(AdviceKind::for_surplus(dec!(-500.01)), AdviceKind::Danger);
    }

    #[test]
    fn advice_boundaries_fall_to_success() {
        assert_eq!(AdviceKind::for_surplus(dec!(-500)), AdviceKind::Success);
        assert_eq!(AdviceKind::for_surplus(dec!(2000)), AdviceKind::Success);
        assert_eq!(AdviceKind::for_surplus(dec!(0)), AdviceKind::Success);
    }

    #[test]
    fn advice_opportunity_above_two_thousand() {
        assert_eq!(AdviceKind::for_surplus(dec!(2000.01)), AdviceKind::Opportunity);
    }

    // =========================================================================
    // BudgetSplit tests
    // =========================================================================

    #[test]
    fn budget_split_computes_spent_share() {
        let split = BudgetSplit::new(dec!(3500), dec!(14500)).unwrap();

        assert_eq!(split.spent_share.round_dp(4), dec!(0.1944));
    }

    #[test]
    fn budget_split_ignores_negative_spend() {
        let split = BudgetSplit::new(dec!(-100), dec!(1000)).unwrap();

        assert_eq!(split.spent_share, dec!(0));
    }

    #[test]
    fn budget_split_empty_when_nothing_to_draw() {
        assert_eq!(BudgetSplit::new(dec!(0), dec!(0)), None);
        assert_eq!(BudgetSplit::new(dec!(0), dec!(-50)), None);
    }
}
