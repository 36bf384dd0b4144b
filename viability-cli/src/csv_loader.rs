//! CSV loader for batches of client records.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter. Whitespace
//! around values is trimmed. Optional columns may be omitted entirely or left
//! empty; missing values come from the default client record.
//!
//! | Column                   | Required | Type    | Notes                                   |
//! |--------------------------|----------|---------|-----------------------------------------|
//! | `client`                 | no       | string  | Label for the summary row               |
//! | `support_level`          | yes      | string  | `level2`, `level3`, `2` or `3`          |
//! | `hourly_rate`            | no       | decimal | Defaults to the level's table rate      |
//! | `time_input_mode`        | yes      | string  | `dates` or `weeks`                      |
//! | `plan_start_date`        | no       | date    | `YYYY-MM-DD`                            |
//! | `plan_end_date`          | no       | date    | `YYYY-MM-DD`; used in `dates` mode      |
//! | `manual_weeks_remaining` | no       | decimal | Used in `weeks` mode                    |
//! | `total_budget`           | no       | decimal |                                         |
//! | `current_balance`        | yes      | decimal | Portal balance                          |
//! | `hours_per_week`         | yes      | decimal |                                         |
//!
//! ### Minimal example
//!
//! ```csv
//! support_level,time_input_mode,manual_weeks_remaining,current_balance,hours_per_week
//! 2,weeks,40,10000.00,2
//! ```

use std::path::Path;

use serde::Deserialize;
use viability_core::{ClientData, RateTable, SupportLevel, TimeInputMode};

use crate::utils::{parse_decimal, parse_optional_date, parse_optional_decimal};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    client: String,
    support_level: String,
    #[serde(default)]
    hourly_rate: String,
    time_input_mode: String,
    #[serde(default)]
    plan_start_date: String,
    #[serde(default)]
    plan_end_date: String,
    #[serde(default)]
    manual_weeks_remaining: String,
    #[serde(default)]
    total_budget: String,
    current_balance: String,
    hours_per_week: String,
}

/// One loaded row: a display label and the record to project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvClient {
    pub label: String,
    pub data: ClientData,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
///
/// Row numbers are 1-based and exclude the header.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Bad structure, a missing required column, etc.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("unrecognised support level '{value}' on row {row}")]
    InvalidSupportLevel { value: String, row: usize },

    #[error("unrecognised time input mode '{value}' on row {row}")]
    InvalidTimeInputMode { value: String, row: usize },

    #[error("invalid number '{value}' in column {column} on row {row}")]
    InvalidNumber {
        column: &'static str,
        value: String,
        row: usize,
    },

    #[error("invalid date '{value}' in column {column} on row {row} (expected YYYY-MM-DD)")]
    InvalidDate {
        column: &'static str,
        value: String,
        row: usize,
    },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn number(
    column: &'static str,
    value: &str,
    row: usize,
) -> Result<Option<rust_decimal::Decimal>, CsvLoadError> {
    parse_optional_decimal(value).map_err(|_| CsvLoadError::InvalidNumber {
        column,
        value: value.to_string(),
        row,
    })
}

fn date(
    column: &'static str,
    value: &str,
    row: usize,
) -> Result<Option<chrono::NaiveDate>, CsvLoadError> {
    parse_optional_date(value).map_err(|_| CsvLoadError::InvalidDate {
        column,
        value: value.to_string(),
        row,
    })
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
    defaults: &ClientData,
    rates: &RateTable,
) -> Result<CsvClient, CsvLoadError> {
    let support_level = SupportLevel::parse(&row.support_level).ok_or_else(|| {
        CsvLoadError::InvalidSupportLevel {
            value: row.support_level.clone(),
            row: row_number,
        }
    })?;
    let time_input_mode = TimeInputMode::parse(&row.time_input_mode).ok_or_else(|| {
        CsvLoadError::InvalidTimeInputMode {
            value: row.time_input_mode.clone(),
            row: row_number,
        }
    })?;

    let current_balance =
        parse_decimal(&row.current_balance).map_err(|_| CsvLoadError::InvalidNumber {
            column: "current_balance",
            value: row.current_balance.clone(),
            row: row_number,
        })?;
    let hours_per_week =
        parse_decimal(&row.hours_per_week).map_err(|_| CsvLoadError::InvalidNumber {
            column: "hours_per_week",
            value: row.hours_per_week.clone(),
            row: row_number,
        })?;

    let data = ClientData {
        support_level,
        hourly_rate: number("hourly_rate", &row.hourly_rate, row_number)?
            .unwrap_or_else(|| rates.rate_for(support_level)),
        time_input_mode,
        plan_start_date: date("plan_start_date", &row.plan_start_date, row_number)?
            .unwrap_or(defaults.plan_start_date),
        plan_end_date: date("plan_end_date", &row.plan_end_date, row_number)?
            .unwrap_or(defaults.plan_end_date),
        manual_weeks_remaining: number(
            "manual_weeks_remaining",
            &row.manual_weeks_remaining,
            row_number,
        )?
        .unwrap_or(defaults.manual_weeks_remaining),
        total_budget: number("total_budget", &row.total_budget, row_number)?
            .unwrap_or(defaults.total_budget),
        current_balance,
        hours_per_week,
    };

    let label = if row.client.is_empty() {
        format!("row {row_number}")
    } else {
        row.client
    };

    Ok(CsvClient { label, data })
}

/// Parse CSV text and return the clients in file order.
///
/// `defaults` fills optional columns that are absent or empty; `rates`
/// supplies the hourly rate when `hourly_rate` is blank.
pub fn load_from_str(
    input: &str,
    defaults: &ClientData,
    rates: &RateTable,
) -> Result<Vec<CsvClient>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1, defaults, rates)
        })
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(
    path: &Path,
    defaults: &ClientData,
    rates: &RateTable,
) -> Result<Vec<CsvClient>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents, defaults, rates)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
