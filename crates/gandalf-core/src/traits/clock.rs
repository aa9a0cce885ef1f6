// # Clock Trait
//
// Source of "today" for zone serial candidates.
//
// ## Implementations
//
// - `SystemClock`: local calendar date of the host
// - `FixedClock`: a pinned date, for tests and reproducible builds
//
// ## Usage
//
// ```rust
// use gandalf_core::traits::{Clock, FixedClock};
// use chrono::NaiveDate;
//
// let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
// assert_eq!(FixedClock::new(date).today(), date);
// ```

use chrono::{Local, NaiveDate};

/// Trait for calendar date sources
///
/// Implementations must be cheap to call and safe to share between
/// artifact tasks.
pub trait Clock: Send + Sync {
    /// The current calendar date
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the date it was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    /// Create a clock pinned to `date`
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}
