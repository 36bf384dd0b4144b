//! Source of "today" for the engine.
//!
//! The engine reads the date exactly once per calculation. Tests and batch
//! runs inject a [`FixedClock`] to get reproducible output.

use chrono::{Local, NaiveDate};

pub trait Clock: Send + Sync {
    /// The current calendar date; time of day is discarded.
    fn today(&self) -> NaiveDate;
}

/// Reads the local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
