use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Formatter;
use crate::models::{AdviceKind, Advisory};

/// Rendered advisory: a one-line header plus a multi-paragraph body.
///
/// `**text**` marks emphasis. Renderers decide how to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantAdvice {
    pub kind: AdviceKind,
    pub header: String,
    pub body: String,
}

impl InstantAdvice {
    pub const DANGER_HEADER: &'static str = "⚠️ DANGER: You are burning too hot.";
    pub const OPPORTUNITY_HEADER: &'static str = "💎 OPPORTUNITY: You are under-servicing.";
    pub const SUCCESS_HEADER: &'static str = "✅ ON TRACK: Balanced use of funding.";

    pub fn render(
        advisory: &Advisory,
        fmt: &Formatter,
    ) -> Self {
        let (header, body) = match advisory.kind {
            AdviceKind::Danger => (Self::DANGER_HEADER, danger_body(advisory, fmt)),
            AdviceKind::Opportunity => (Self::OPPORTUNITY_HEADER, opportunity_body(advisory, fmt)),
            AdviceKind::Success => (Self::SUCCESS_HEADER, success_body(advisory, fmt)),
        };

        Self {
            kind: advisory.kind,
            header: header.to_string(),
            body,
        }
    }
}

fn break_even_text(
    advisory: &Advisory,
    fmt: &Formatter,
) -> String {
    if advisory.break_even_hours > Decimal::ZERO {
        format!("**{} hours/week**", fmt.number(advisory.break_even_hours, 2))
    } else {
        "**N/A**".to_string()
    }
}

fn danger_body(
    advisory: &Advisory,
    fmt: &Formatter,
) -> String {
    format!(
        "At **{hours} hours/week**, this participant will run out of money on **{depletion}** \
         — which is **{early} weeks earlier** than the plan end date.\n\n\
         **Corrective Action:**\n\
         1. You must reduce billing to {break_even} to just break even by **{end}**.\n\
         2. If the client genuinely needs this level of support, you should prepare evidence \
         and consider a review (e.g. s48 or Change of Circumstances).",
        hours = fmt.number(advisory.hours_per_week, 2),
        depletion = fmt.date_long(advisory.depletion_date),
        early = fmt.number(advisory.buffer_weeks.abs(), 1),
        break_even = break_even_text(advisory, fmt),
        end = fmt.date_long(advisory.plan_end_date),
    )
}

fn opportunity_body(
    advisory: &Advisory,
    fmt: &Formatter,
) -> String {
    format!(
        "You have a projected surplus of **{surplus}**. If you continue at this rate, \
         you will return money to the NDIA at **{end}**.\n\n\
         **Strategy:**\n\
         * You can safely increase support up to around {break_even} if clinically justified.\n\
         * Consider using this headroom for extra coordination, reports, provider meetings, \
         or capacity building that genuinely benefits the participant.",
        surplus = fmt.currency(advisory.surplus_shortfall),
        end = fmt.date_long(advisory.plan_end_date),
        break_even = break_even_text(advisory, fmt),
    )
}

fn success_body(
    advisory: &Advisory,
    fmt: &Formatter,
) -> String {
    format!(
        "At your current plan of **{hours} hours/week**, you are on track to finish this plan \
         with approximately **{surplus}** remaining.\n\n\
         Keep monitoring the portal balance and adjust hours slightly if there are major \
         changes in the participant's needs.",
        hours = fmt.number(advisory.hours_per_week, 2),
        surplus = fmt.currency(advisory.surplus_shortfall),
    )
}
