//! Terminal and JSON rendering of analysis results.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use viability_core::calculations::common::saturating_mul;
use viability_core::{AnalysisResult, AnalysisView, BurnDownPoint, Formatter, ViabilityStatus};

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));

/// Renders dashboards for one locale, with or without ANSI styling.
pub struct Renderer {
    fmt: Formatter,
    ansi: bool,
}

impl Renderer {
    pub fn new(
        fmt: Formatter,
        ansi: bool,
    ) -> Self {
        Self { fmt, ansi }
    }

    /// Replaces `**text**` with bold text, or plain text without ANSI.
    pub fn emphasize(
        &self,
        text: &str,
    ) -> String {
        let replacement = if self.ansi { "\x1b[1m$1\x1b[0m" } else { "$1" };
        BOLD.replace_all(text, replacement).into_owned()
    }

    fn status_line(
        &self,
        status: ViabilityStatus,
    ) -> String {
        let line = format!("{} {}", status.icon(), status.label());
        if !self.ansi {
            return line;
        }
        let code = match status {
            ViabilityStatus::Platinum => "1;36",
            ViabilityStatus::Viable => "1;32",
            ViabilityStatus::Tight => "1;33",
            ViabilityStatus::NonViable => "1;31",
        };
        format!("\x1b[{code}m{line}\x1b[0m")
    }

    /// Full text dashboard; `rows` caps the trajectory table.
    pub fn dashboard(
        &self,
        result: &AnalysisResult,
        rows: usize,
    ) -> String {
        let view = AnalysisView::new(result, &self.fmt);
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.status_line(result.status));
        let _ = writeln!(out, "{}", view.headline);
        if let Some(message) = view.validation_error {
            let _ = writeln!(out, "! {message}");
        }

        let _ = writeln!(out, "\nSnapshot");
        let metrics = [
            (
                "Plan ends",
                format!("{} ({} weeks)", view.plan_end_date, view.weeks_remaining),
            ),
            ("Weekly cost", view.weekly_cost.clone()),
            (
                "Runway",
                format!("{} weeks (funds last until {})", view.runway_weeks, view.depletion_date),
            ),
            ("Required to finish", view.required_to_finish.clone()),
            (view.outcome_label, view.outcome.clone()),
            ("Buffer", format!("{} weeks", view.buffer_weeks)),
            ("Break-even", format!("{} hours/week", view.break_even_hours)),
        ];
        for (label, value) in metrics {
            let _ = writeln!(out, "  {label:<20}{value}");
        }

        let _ = writeln!(out, "\nBudget");
        match &result.budget_split {
            Some(split) => {
                let _ = writeln!(
                    out,
                    "  Spent {} ({}%)  Available {}",
                    self.fmt.currency(split.spent),
                    self.fmt.number(saturating_mul(split.spent_share, Decimal::ONE_HUNDRED), 1),
                    self.fmt.compact_thousands(split.available),
                );
            }
            None => {
                let _ = writeln!(out, "  Nothing to chart");
            }
        }

        let _ = writeln!(out, "\n{}", view.advice.header);
        let _ = writeln!(out, "{}", self.emphasize(&view.advice.body));

        if rows > 0 && !result.burn_down.is_empty() {
            let _ = writeln!(out, "\nTrajectory");
            let _ = writeln!(out, "  {:>4}  {:<12}  {:>12}", "Week", "Date", "Balance");
            for (week, point) in result.burn_down.iter().take(rows).enumerate() {
                let _ = writeln!(out, "  {}", self.trajectory_row(week, point));
            }
        }

        out
    }

    fn trajectory_row(
        &self,
        week: usize,
        point: &BurnDownPoint,
    ) -> String {
        format!(
            "{:>4}  {:<12}  {:>12}",
            week,
            self.fmt.date_short(point.date),
            self.fmt.currency(point.balance)
        )
    }

    /// One line per client: status, runway, outcome and advice band.
    pub fn batch_table(
        &self,
        results: &[(String, AnalysisResult)],
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<20} {:<12} {:>10} {:>16} {}",
            "Client", "Status", "Runway", "Outcome", "Advice"
        );
        for row in batch_rows(results, &self.fmt) {
            let _ = writeln!(
                out,
                "{:<20} {:<12} {:>10} {:>16} {}",
                row.client, row.status, row.runway_weeks, row.outcome, row.advice
            );
        }
        out
    }
}

#[derive(Debug, Serialize)]
struct DashboardJson<'a> {
    view: AnalysisView,
    result: &'a AnalysisResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRow {
    pub client: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub runway_weeks: String,
    pub outcome: String,
    pub advice: &'static str,
}

pub fn batch_rows(
    results: &[(String, AnalysisResult)],
    fmt: &Formatter,
) -> Vec<BatchRow> {
    results
        .iter()
        .map(|(client, result)| BatchRow {
            client: client.clone(),
            status: result.status.as_str(),
            status_label: result.status.label(),
            runway_weeks: fmt.number(result.runway_weeks, 1),
            outcome: fmt.signed_currency(result.surplus_shortfall),
            advice: result.advisory.kind.as_str(),
        })
        .collect()
}

/// The view plus the raw result (including the burn-down series).
pub fn dashboard_json(
    result: &AnalysisResult,
    fmt: &Formatter,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DashboardJson {
        view: AnalysisView::new(result, fmt),
        result,
    })
}

pub fn batch_json(
    results: &[(String, AnalysisResult)],
    fmt: &Formatter,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&batch_rows(results, fmt))
}
