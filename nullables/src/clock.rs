//! Nullable clock: deterministic dates for testing.

use badge_types::Clock;
use chrono::{Days, NaiveDate};
use std::sync::Mutex;

/// A calendar that only moves when told to.
pub struct NullClock {
    current: Mutex<NaiveDate>,
}

impl NullClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            current: Mutex::new(today),
        }
    }

    /// Advance the calendar by a number of days.
    pub fn advance_days(&self, days: u64) {
        let mut current = self.current.lock().unwrap();
        *current = current
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX);
    }

    /// Set the date to a specific value.
    pub fn set(&self, today: NaiveDate) {
        *self.current.lock().unwrap() = today;
    }
}

impl Clock for NullClock {
    fn today(&self) -> NaiveDate {
        *self.current.lock().unwrap()
    }
}
