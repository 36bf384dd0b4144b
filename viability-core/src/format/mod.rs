//! Presentation boundary: locale-aware rendering of engine output.
//!
//! The engine returns raw decimals and dates. Everything a renderer shows as
//! text (currency, dates, the advisory prose) is produced here.

mod advice;
mod locale;
mod view;

pub use advice::InstantAdvice;
pub use locale::{Formatter, Locale};
pub use view::AnalysisView;
