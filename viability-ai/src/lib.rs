//! Gemini-backed [`NarrativeReporter`](viability_core::NarrativeReporter).

mod config;
mod gemini;
mod prompt;

pub use config::GeminiConfig;
pub use gemini::GeminiReporter;
pub use prompt::build_prompt;
