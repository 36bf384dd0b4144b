use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::support_level::{RateTable, SupportLevel};

/// Which time-horizon field is authoritative for the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInputMode {
    /// The plan end date drives the horizon.
    #[default]
    Dates,
    /// A manually entered count of remaining weeks drives the horizon.
    Weeks,
}

impl TimeInputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dates => "dates",
            Self::Weeks => "weeks",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dates" | "date" => Some(Self::Dates),
            "weeks" | "week" => Some(Self::Weeks),
            _ => None,
        }
    }
}

/// The client record the engine projects from.
///
/// Exactly one of `plan_end_date` and `manual_weeks_remaining` is used,
/// selected by `time_input_mode`; the other stays stored untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientData {
    pub support_level: SupportLevel,
    pub hourly_rate: Decimal,
    pub time_input_mode: TimeInputMode,

    /// Informational only.
    pub plan_start_date: NaiveDate,
    pub plan_end_date: NaiveDate,
    pub manual_weeks_remaining: Decimal,

    /// Original plan budget (informational).
    pub total_budget: Decimal,
    /// Funds available now; the single source of truth for remaining money.
    pub current_balance: Decimal,
    pub hours_per_week: Decimal,
}

impl ClientData {
    /// Days between the default plan start and today.
    pub const DEFAULT_DAYS_ELAPSED: u64 = 84;
    /// Days between today and the default plan end.
    pub const DEFAULT_DAYS_REMAINING: u64 = 280;

    /// The record used when nothing has been stored yet: a level 2 plan that
    /// started 12 weeks ago and ends 40 weeks from `today`.
    pub fn defaults(
        today: NaiveDate,
        rates: &RateTable,
    ) -> Self {
        let support_level = SupportLevel::default();
        Self {
            support_level,
            hourly_rate: rates.rate_for(support_level),
            time_input_mode: TimeInputMode::default(),
            plan_start_date: today
                .checked_sub_days(Days::new(Self::DEFAULT_DAYS_ELAPSED))
                .unwrap_or(today),
            plan_end_date: today
                .checked_add_days(Days::new(Self::DEFAULT_DAYS_REMAINING))
                .unwrap_or(today),
            manual_weeks_remaining: Decimal::from(40),
            total_budget: Decimal::new(1800000, 2),
            current_balance: Decimal::new(1450000, 2),
            hours_per_week: Decimal::new(15, 1),
        }
    }
}
