//! Calendar-day range handling and cache key derivation.
//!
//! A [`DateRange`] is the unit of work the engine accepts: an inclusive span
//! of calendar days, each of which becomes one fetch task. Every date also
//! maps to a canonical cache key (`fixtures_YYYYMMDD`) so the on-disk cache
//! namespace is independent of whatever format the date arrived in.

use chrono::{Days, NaiveDate};
use thiserror::Error;

/// Error for a range whose start date is after its end date.
///
/// An inverted range is treated as a configuration error rather than an
/// empty run: it aborts before any fetching begins.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid date range: start {start} is after end {end}")]
pub struct InvalidRange {
    /// Requested start date.
    pub start: NaiveDate,
    /// Requested end date.
    pub end: NaiveDate,
}

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range covering `[start, end]` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRange`] if `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRange> {
        if start > end {
            return Err(InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the first day of the range.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the range.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns the number of days in the range (always at least 1).
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// A range always spans at least one day.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates every day in the range in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.checked_add_days(Days::new(1)).filter(|next| *next <= end)
        })
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = Box<dyn Iterator<Item = NaiveDate>>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Derives the canonical cache key for a date.
///
/// The key is stable across runs and input formats: `fixtures_YYYYMMDD`.
#[must_use]
pub fn cache_key(date: NaiveDate) -> String {
    format!("fixtures_{}", date.format("%Y%m%d"))
}

/// Formats a date the way the fixtures feed expects it, e.g. `26 Sep 2024`.
#[must_use]
pub fn feed_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_single_day() {
        let range = DateRange::new(day(2024, 9, 26), day(2024, 9, 26)).unwrap();
        assert_eq!(range.len(), 1);
        let days: Vec<_> = range.iter().collect();
        assert_eq!(days, vec![day(2024, 9, 26)]);
    }

    #[test]
    fn test_range_five_days_ascending() {
        let range = DateRange::new(day(2024, 9, 26), day(2024, 9, 30)).unwrap();
        assert_eq!(range.len(), 5);
        let days: Vec<_> = range.iter().collect();
        assert_eq!(days.first(), Some(&day(2024, 9, 26)));
        assert_eq!(days.last(), Some(&day(2024, 9, 30)));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_range_crosses_month_boundary() {
        let range = DateRange::new(day(2024, 9, 29), day(2024, 10, 2)).unwrap();
        let days: Vec<_> = range.iter().collect();
        assert_eq!(
            days,
            vec![
                day(2024, 9, 29),
                day(2024, 9, 30),
                day(2024, 10, 1),
                day(2024, 10, 2),
            ]
        );
    }

    #[test]
    fn test_range_inverted_is_rejected() {
        let err = DateRange::new(day(2024, 10, 1), day(2024, 9, 1)).unwrap_err();
        assert_eq!(err.start, day(2024, 10, 1));
        assert_eq!(err.end, day(2024, 9, 1));
        assert!(err.to_string().contains("invalid date range"));
    }

    #[test]
    fn test_cache_key_is_canonical() {
        assert_eq!(cache_key(day(2024, 9, 26)), "fixtures_20240926");
        assert_eq!(cache_key(day(2024, 1, 5)), "fixtures_20240105");
    }

    #[test]
    fn test_feed_date_format() {
        assert_eq!(feed_date(day(2024, 9, 26)), "26 Sep 2024");
        assert_eq!(feed_date(day(2024, 12, 1)), "01 Dec 2024");
    }
}
