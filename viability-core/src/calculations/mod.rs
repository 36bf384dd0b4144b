//! Viability calculations for a funded support plan.
//!
//! The engine turns a [`ClientData`](crate::ClientData) record into an
//! [`AnalysisResult`](crate::AnalysisResult): time horizon, runway, gap
//! analysis, status tier, break-even hours, advisory and burn-down series.

pub mod common;
pub mod viability;

pub use viability::{
    MAX_CHART_WEEKS, RUNWAY_SENTINEL_WEEKS, ViabilityEngine, calculate_viability,
};
