//! Calendar source for issue dates.

use chrono::NaiveDate;

/// Source of calendar dates for newly issued badges.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The UTC wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_2024() {
        assert!(SystemClock.today() > NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
