pub mod calculations;
pub mod clock;
pub mod edit;
pub mod format;
pub mod models;
pub mod report;
pub mod session;
pub mod store;

pub use calculations::{ViabilityEngine, calculate_viability};
pub use clock::{Clock, FixedClock, SystemClock};
pub use edit::{ClientEdit, EditError, normalize_decimal_input};
pub use format::{AnalysisView, Formatter, InstantAdvice, Locale};
pub use models::*;
pub use report::{NarrativeReporter, ReportError, ReportSnapshot, generate_or_fallback};
pub use session::{ReportTicket, Session};
pub use store::{ClientDataStore, DEFAULT_STORE_KEY, StoreError};
