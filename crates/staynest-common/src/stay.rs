//! Stay dates and pricing.
//!
//! A stay runs from the check-in date to the check-out date. Two stays on the
//! same listing conflict when their ranges touch or overlap, bounds included:
//! an existing booking blocks a request if it contains the requested start,
//! contains the requested end, or lies entirely inside the requested range.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StayError;

/// A validated check-in / check-out pair (`end` strictly after `start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StayDates {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StayError> {
        if end <= start {
            return Err(StayError::validation("End date must be after start date"));
        }
        Ok(Self { start, end })
    }

    /// Like [`StayDates::new`], additionally rejecting stays starting before `today`.
    pub fn upcoming(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Self, StayError> {
        if start < today {
            return Err(StayError::validation("Start date cannot be in the past"));
        }
        Self::new(start, end)
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Inclusive overlap test, equivalent to the three-way condition
    /// (contains start) OR (contains end) OR (is contained).
    pub fn overlaps(&self, other: &StayDates) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Total price in minor currency units for a nightly rate.
    pub fn total_price(&self, price_per_night: i64) -> Result<i64, StayError> {
        self.nights()
            .checked_mul(price_per_night)
            .ok_or_else(|| StayError::validation("Stay is too long to price"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn stay(a: (u32, u32), b: (u32, u32)) -> StayDates {
        StayDates::new(d(2025, a.0, a.1), d(2025, b.0, b.1)).unwrap()
    }

    #[test]
    fn rejects_empty_or_inverted_ranges() {
        assert!(StayDates::new(d(2025, 6, 1), d(2025, 6, 1)).is_err());
        assert!(StayDates::new(d(2025, 6, 5), d(2025, 6, 1)).is_err());
    }

    #[test]
    fn rejects_past_start() {
        let today = d(2025, 6, 10);
        assert!(StayDates::upcoming(d(2025, 6, 9), d(2025, 6, 12), today).is_err());
        assert!(StayDates::upcoming(d(2025, 6, 10), d(2025, 6, 12), today).is_ok());
    }

    #[test]
    fn counts_nights_across_months() {
        assert_eq!(stay((6, 28), (7, 3)).nights(), 5);
    }

    #[test]
    fn overlap_cases() {
        let booked = stay((6, 10), (6, 15));

        // new start inside existing
        assert!(booked.overlaps(&stay((6, 12), (6, 20))));
        // new end inside existing
        assert!(booked.overlaps(&stay((6, 5), (6, 11))));
        // existing inside new
        assert!(booked.overlaps(&stay((6, 1), (6, 30))));
        // new inside existing
        assert!(booked.overlaps(&stay((6, 11), (6, 12))));
        // bounds are inclusive: check-out day equals check-in day
        assert!(booked.overlaps(&stay((6, 15), (6, 18))));
        assert!(booked.overlaps(&stay((6, 8), (6, 10))));

        assert!(!booked.overlaps(&stay((6, 16), (6, 18))));
        assert!(!booked.overlaps(&stay((6, 1), (6, 9))));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = stay((6, 10), (6, 15));
        let b = stay((6, 14), (6, 20));
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn prices_by_night() {
        assert_eq!(stay((6, 10), (6, 13)).total_price(12_500).unwrap(), 37_500);
        assert!(stay((6, 10), (6, 13)).total_price(i64::MAX).is_err());
    }
}
