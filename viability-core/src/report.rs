//! Narrative report port.
//!
//! The only fallible collaborator in the system. Callers go through
//! [`generate_or_fallback`], which always yields displayable text.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::format::{Formatter, InstantAdvice};
use crate::models::{AnalysisResult, ClientData};

pub const MISSING_KEY_FALLBACK: &str =
    "<p class='text-red-400'>API Key not found. Unable to generate AI analysis.</p>";
pub const EMPTY_FALLBACK: &str = "<p>No analysis generated.</p>";
pub const ERROR_FALLBACK: &str = "<p>Error generating analysis.</p>";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("report timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("provider returned no text")]
    EmptyResponse,

    #[error("could not parse provider response: {0}")]
    Parse(String),
}

/// Case data handed to a [`NarrativeReporter`], already formatted for prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSnapshot {
    pub today: String,
    pub plan_end_date: String,
    pub weeks_remaining: String,
    pub current_balance: String,
    pub hours_per_week: String,
    pub weekly_cost: String,
    pub runway_weeks: String,
    pub buffer_weeks: String,
    /// `Surplus` or `Shortfall`.
    pub outcome_label: &'static str,
    /// Absolute amount; the label carries the sign.
    pub outcome_amount: String,
    pub status: &'static str,
    pub advice_header: String,
}

impl ReportSnapshot {
    pub fn capture(
        data: &ClientData,
        result: &AnalysisResult,
        fmt: &Formatter,
    ) -> Self {
        Self {
            today: fmt.date_long(result.today),
            plan_end_date: fmt.date_long(result.plan_end_date),
            weeks_remaining: fmt.number(result.weeks_remaining, 1),
            current_balance: fmt.currency(data.current_balance),
            hours_per_week: data.hours_per_week.normalize().to_string(),
            weekly_cost: fmt.currency(result.weekly_cost),
            runway_weeks: fmt.number(result.runway_weeks, 1),
            buffer_weeks: fmt.number(result.buffer_weeks, 1),
            outcome_label: result.outcome_label(),
            outcome_amount: fmt.currency(result.surplus_shortfall.abs()),
            status: result.status.label(),
            advice_header: InstantAdvice::render(&result.advisory, fmt).header,
        }
    }
}

#[async_trait]
pub trait NarrativeReporter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, snapshot: &ReportSnapshot) -> Result<String, ReportError>;
}

/// Runs `reporter` under `timeout` and maps every failure to a fixed
/// fallback string. `None` means no reporter could be configured.
pub async fn generate_or_fallback(
    reporter: Option<&dyn NarrativeReporter>,
    snapshot: &ReportSnapshot,
    timeout: Duration,
) -> String {
    let Some(reporter) = reporter else {
        error!("no narrative reporter configured");
        return MISSING_KEY_FALLBACK.to_string();
    };

    info!(reporter = reporter.name(), "requesting narrative report");
    let outcome = match tokio::time::timeout(timeout, reporter.generate(snapshot)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ReportError::Timeout {
            secs: timeout.as_secs(),
        }),
    };

    match outcome {
        Ok(text) if text.trim().is_empty() => EMPTY_FALLBACK.to_string(),
        Ok(text) => text,
        Err(ReportError::EmptyResponse) => EMPTY_FALLBACK.to_string(),
        Err(ReportError::MissingApiKey) => {
            error!(reporter = reporter.name(), "narrative report has no API key");
            MISSING_KEY_FALLBACK.to_string()
        }
        Err(e) => {
            error!(reporter = reporter.name(), "narrative report failed: {}", e);
            ERROR_FALLBACK.to_string()
        }
    }
}
