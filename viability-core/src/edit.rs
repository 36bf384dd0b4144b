//! Field edits and the pure reducer that applies them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::models::{ClientData, RateTable, SupportLevel, TimeInputMode};

/// One change to one [`ClientData`] field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEdit {
    /// Also resets the hourly rate to the level's table rate.
    SupportLevel(SupportLevel),
    HourlyRate(Decimal),
    TimeInputMode(TimeInputMode),
    PlanStartDate(NaiveDate),
    PlanEndDate(NaiveDate),
    ManualWeeksRemaining(Decimal),
    TotalBudget(Decimal),
    CurrentBalance(Decimal),
    HoursPerWeek(Decimal),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("unknown field '{0}' (expected one of: {fields})", fields = ClientEdit::FIELDS.join(", "))]
    UnknownField(String),

    #[error("invalid date '{value}' for {field}: expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("invalid value '{value}' for {field}")]
    InvalidChoice { field: &'static str, value: String },
}

impl ClientEdit {
    pub const FIELDS: &'static [&'static str] = &[
        "support_level",
        "hourly_rate",
        "time_input_mode",
        "plan_start_date",
        "plan_end_date",
        "manual_weeks_remaining",
        "total_budget",
        "current_balance",
        "hours_per_week",
    ];

    /// Builds an edit from a field name and the raw text entered for it.
    ///
    /// Numeric fields never fail: empty or malformed text becomes zero.
    pub fn parse(
        field: &str,
        raw: &str,
    ) -> Result<Self, EditError> {
        let name = field.trim().to_ascii_lowercase().replace('-', "_");
        match name.as_str() {
            "support_level" => SupportLevel::parse(raw)
                .map(Self::SupportLevel)
                .ok_or_else(|| EditError::InvalidChoice {
                    field: "support_level",
                    value: raw.to_string(),
                }),
            "time_input_mode" => TimeInputMode::parse(raw)
                .map(Self::TimeInputMode)
                .ok_or_else(|| EditError::InvalidChoice {
                    field: "time_input_mode",
                    value: raw.to_string(),
                }),
            "plan_start_date" => parse_date("plan_start_date", raw).map(Self::PlanStartDate),
            "plan_end_date" => parse_date("plan_end_date", raw).map(Self::PlanEndDate),
            "hourly_rate" => Ok(Self::HourlyRate(coerce_number("hourly_rate", raw))),
            "manual_weeks_remaining" => Ok(Self::ManualWeeksRemaining(coerce_number(
                "manual_weeks_remaining",
                raw,
            ))),
            "total_budget" => Ok(Self::TotalBudget(coerce_number("total_budget", raw))),
            "current_balance" => Ok(Self::CurrentBalance(coerce_number("current_balance", raw))),
            "hours_per_week" => Ok(Self::HoursPerWeek(coerce_number("hours_per_week", raw))),
            _ => Err(EditError::UnknownField(field.to_string())),
        }
    }

    /// Parses `field=value`.
    pub fn parse_assignment(assignment: &str) -> Result<Self, EditError> {
        match assignment.split_once('=') {
            Some((field, value)) => Self::parse(field, value),
            None => Err(EditError::UnknownField(assignment.to_string())),
        }
    }
}

impl ClientData {
    /// Returns the record with `edit` applied; never mutates in place.
    pub fn apply(
        self,
        edit: ClientEdit,
        rates: &RateTable,
    ) -> Self {
        match edit {
            ClientEdit::SupportLevel(level) => Self {
                support_level: level,
                hourly_rate: rates.rate_for(level),
                ..self
            },
            ClientEdit::HourlyRate(hourly_rate) => Self {
                hourly_rate,
                ..self
            },
            ClientEdit::TimeInputMode(time_input_mode) => Self {
                time_input_mode,
                ..self
            },
            ClientEdit::PlanStartDate(plan_start_date) => Self {
                plan_start_date,
                ..self
            },
            ClientEdit::PlanEndDate(plan_end_date) => Self {
                plan_end_date,
                ..self
            },
            ClientEdit::ManualWeeksRemaining(manual_weeks_remaining) => Self {
                manual_weeks_remaining,
                ..self
            },
            ClientEdit::TotalBudget(total_budget) => Self {
                total_budget,
                ..self
            },
            ClientEdit::CurrentBalance(current_balance) => Self {
                current_balance,
                ..self
            },
            ClientEdit::HoursPerWeek(hours_per_week) => Self {
                hours_per_week,
                ..self
            },
        }
    }
}

fn parse_date(
    field: &'static str,
    raw: &str,
) -> Result<NaiveDate, EditError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| EditError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

/// Strips what people type around an amount: surrounding whitespace, a
/// leading sign before or after `$`, and thousands commas.
///
/// `"-$1,234.50"` becomes `"-1234.50"`; blank input stays empty.
pub fn normalize_decimal_input(raw: &str) -> String {
    let trimmed = raw.trim();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest.trim_start()),
        None => ("", trimmed),
    };
    let rest = rest.strip_prefix('$').map_or(rest, str::trim_start);
    let digits: String = rest.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return String::new();
    }
    format!("{sign}{digits}")
}

fn coerce_number(
    field: &'static str,
    raw: &str,
) -> Decimal {
    let normalized = normalize_decimal_input(raw);
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    normalized.parse().unwrap_or_else(|e| {
        warn!(field, input = %raw, "treating unparseable number as 0: {}", e);
        Decimal::ZERO
    })
}
