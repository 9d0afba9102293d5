//! Time window and date range models.
//!
//! Commitments (shifts, dispatcher assignments) occupy absolute instants,
//! while the scheduling grid is laid out in calendar dates on the
//! organisation's local day boundary.
//!
//! # Time Model
//! A [`TimeWindow`] is a pair of UTC instants resolved from a local
//! wall-clock time plus the organisation's fixed offset. A [`DateRange`]
//! is an inclusive span of local calendar dates.
//!
//! # Overlap
//! Windows are half-open: 10:00-12:00 and 12:00-14:00 touch but do not
//! overlap.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Fails with [`SchedulingError::InvalidWindow`] unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, SchedulingError> {
        if end <= start {
            return Err(SchedulingError::InvalidWindow(format!(
                "window end {end} is not after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Resolves a local wall-clock window on `date` into UTC instants.
    pub fn from_local(
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        tz: FixedOffset,
    ) -> Result<Self, SchedulingError> {
        Self::new(
            local_to_utc(date.and_time(start), tz),
            local_to_utc(date.and_time(end), tz),
        )
    }

    /// Resolves whole local hours on `date`. `end_hour` may be 24 (next midnight).
    pub fn from_hours(
        date: NaiveDate,
        start_hour: u8,
        end_hour: u8,
        tz: FixedOffset,
    ) -> Result<Self, SchedulingError> {
        let midnight = date.and_time(NaiveTime::MIN);
        Self::new(
            local_to_utc(midnight + Duration::hours(i64::from(start_hour)), tz),
            local_to_utc(midnight + Duration::hours(i64::from(end_hour)), tz),
        )
    }

    /// Duration of this window.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether an instant falls within this window.
    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the intersection with `other`, if any.
    pub fn overlap_duration(&self, other: &Self) -> Option<Duration> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end > start {
            Some(end - start)
        } else {
            None
        }
    }
}

fn local_to_utc(local: NaiveDateTime, tz: FixedOffset) -> DateTime<Utc> {
    let naive_utc = local - Duration::seconds(i64::from(tz.local_minus_utc()));
    Utc.from_utc_datetime(&naive_utc)
}

/// An inclusive range of local calendar dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Longest range a view may request.
    pub const MAX_DAYS: i64 = 366;

    /// Creates a range; fails if `end` precedes `start` or the range spans
    /// more than [`DateRange::MAX_DAYS`] days.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SchedulingError> {
        if end < start {
            return Err(SchedulingError::InvalidWindow(format!(
                "date range end {end} precedes start {start}"
            )));
        }
        let days = (end - start).num_days() + 1;
        if days > Self::MAX_DAYS {
            return Err(SchedulingError::InvalidWindow(format!(
                "date range {start}..{end} spans {days} days (max {})",
                Self::MAX_DAYS
            )));
        }
        Ok(Self { start, end })
    }

    /// The seven days starting at `start`.
    pub fn week(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// A single-day range.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Whether `date` lies in the range.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered.
    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Iterates the days in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}
