mod analysis;
mod client_data;
mod support_level;

pub use analysis::{
    AdviceKind, Advisory, AnalysisResult, BudgetSplit, BurnDownPoint, ViabilityStatus,
};
pub use client_data::{ClientData, TimeInputMode};
pub use support_level::{RateTable, SupportLevel};
