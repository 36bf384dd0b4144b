use serde::Serialize;

use super::{Formatter, InstantAdvice};
use crate::models::AnalysisResult;

/// Display-ready strings for one [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisView {
    pub locale: &'static str,
    pub status: &'static str,
    pub status_icon: &'static str,
    pub status_color: &'static str,
    pub status_background: &'static str,
    pub headline: String,
    pub plan_start_date: String,
    pub plan_end_date: String,
    pub depletion_date: String,
    pub weeks_remaining: String,
    pub runway_weeks: String,
    pub weekly_cost: String,
    pub spent: String,
    pub required_to_finish: String,
    pub outcome_label: &'static str,
    pub outcome: String,
    pub buffer_weeks: String,
    pub break_even_hours: String,
    pub advice: InstantAdvice,
    /// Set when the plan end date is not in the future.
    pub validation_error: Option<&'static str>,
}

impl AnalysisView {
    pub const PLAN_ENDED_MESSAGE: &'static str = "Plan End Date must be in the future.";

    pub fn new(
        result: &AnalysisResult,
        fmt: &Formatter,
    ) -> Self {
        Self {
            locale: fmt.locale().tag(),
            status: result.status.label(),
            status_icon: result.status.icon(),
            status_color: result.status.color(),
            status_background: result.status.background(),
            headline: format!(
                "You have {} weeks of funding for {} weeks of time.",
                fmt.number(result.runway_weeks, 1),
                fmt.number(result.weeks_remaining, 1)
            ),
            plan_start_date: fmt.date_short(result.plan_start_date),
            plan_end_date: fmt.date_short(result.plan_end_date),
            depletion_date: fmt.date_short(result.depletion_date),
            weeks_remaining: fmt.number(result.weeks_remaining, 1),
            runway_weeks: fmt.number(result.runway_weeks, 1),
            weekly_cost: fmt.currency(result.weekly_cost),
            spent: fmt.currency(result.spent),
            required_to_finish: fmt.currency(result.required_to_finish),
            outcome_label: result.outcome_label(),
            outcome: fmt.signed_currency(result.surplus_shortfall),
            buffer_weeks: fmt.number(result.buffer_weeks, 1),
            break_even_hours: fmt.number(result.break_even_hours, 2),
            advice: InstantAdvice::render(&result.advisory, fmt),
            validation_error: result.plan_has_ended().then_some(Self::PLAN_ENDED_MESSAGE),
        }
    }
}
