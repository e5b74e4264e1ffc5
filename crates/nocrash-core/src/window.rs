//! Lookback window arithmetic.
//!
//! The same window decides which bugs are old enough to consider and which
//! crashes count as recent.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Trailing window of `weeks` weeks ending on `end` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub end: NaiveDate,
    pub weeks: u32,
}

impl QueryWindow {
    /// Validate and build a window.
    pub fn new(end: NaiveDate, weeks: u32) -> Result<Self> {
        if weeks == 0 {
            return Err(Error::InvalidWindow(
                "lookback must be at least one week".into(),
            ));
        }
        let window = Self { end, weeks };
        window.start()?;
        window.search_end_exclusive()?;
        Ok(window)
    }

    /// Window ending on the current UTC date.
    pub fn ending_today(weeks: u32) -> Result<Self> {
        Self::new(Utc::now().date_naive(), weeks)
    }

    /// First day of the window: `end - weeks`.
    pub fn start(&self) -> Result<NaiveDate> {
        self.end
            .checked_sub_days(Days::new(self.lookback_days()))
            .ok_or_else(|| {
                Error::InvalidWindow(format!(
                    "{} weeks before {} is out of range",
                    self.weeks, self.end
                ))
            })
    }

    /// Day after `end`, used as the exclusive upper bound of crash searches.
    pub fn search_end_exclusive(&self) -> Result<NaiveDate> {
        self.end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::InvalidWindow(format!("{} has no following day", self.end)))
    }

    /// Length of the window in days.
    #[must_use]
    pub fn lookback_days(&self) -> u64 {
        u64::from(self.weeks) * 7
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_is_whole_weeks_back() {
        let window = QueryWindow::new(date(2024, 3, 15), 12).unwrap();
        assert_eq!(window.start().unwrap(), date(2023, 12, 22));
        assert_eq!(window.lookback_days(), 84);
    }

    #[test]
    fn search_end_is_exclusive_next_day() {
        let window = QueryWindow::new(date(2024, 2, 28), 1).unwrap();
        assert_eq!(window.search_end_exclusive().unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn zero_weeks_is_rejected() {
        let err = QueryWindow::new(date(2024, 1, 1), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow(_)));
    }

    #[test]
    fn out_of_range_start_is_rejected() {
        let err = QueryWindow::new(NaiveDate::MIN, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow(_)));
    }
}
