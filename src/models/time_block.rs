//! Recurring time blocks.
//!
//! An organisation defines a fixed ordered list of blocks that tile a day
//! (e.g. four 4-hour blocks). Blocks are configuration, not per-instance
//! data; concrete shifts are bucketed into them for scheduling views.

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::TimeWindow;
use crate::error::SchedulingError;

/// A recurring [start_hour, end_hour) pair with a display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    /// Local start hour (0..=23).
    pub start_hour: u8,
    /// Local end hour (1..=24, exclusive).
    pub end_hour: u8,
    /// Display label, e.g. "6am-10am".
    pub label: String,
}

impl TimeBlock {
    /// Creates a block.
    pub fn new(start_hour: u8, end_hour: u8, label: impl Into<String>) -> Self {
        Self {
            start_hour,
            end_hour,
            label: label.into(),
        }
    }

    /// The block's concrete window on `date`.
    pub fn window_on(&self, date: NaiveDate, tz: FixedOffset) -> Result<TimeWindow, SchedulingError> {
        TimeWindow::from_hours(date, self.start_hour, self.end_hour, tz)
    }

    /// Default day tiling: 06-10, 10-14, 14-18, 18-22.
    pub fn default_blocks() -> Vec<TimeBlock> {
        vec![
            TimeBlock::new(6, 10, "6am-10am"),
            TimeBlock::new(10, 14, "10am-2pm"),
            TimeBlock::new(14, 18, "2pm-6pm"),
            TimeBlock::new(18, 22, "6pm-10pm"),
        ]
    }
}

/// Buckets a concrete window into the block it overlaps most.
///
/// Ties go to the earliest block. Returns `None` when the window overlaps
/// no block on `date`.
pub fn bucket(blocks: &[TimeBlock], window: &TimeWindow, date: NaiveDate, tz: FixedOffset) -> Option<usize> {
    let mut best: Option<(usize, chrono::Duration)> = None;
    for (i, block) in blocks.iter().enumerate() {
        let Ok(bw) = block.window_on(date, tz) else {
            continue;
        };
        if let Some(d) = bw.overlap_duration(window) {
            if best.map_or(true, |(_, b)| d > b) {
                best = Some((i, d));
            }
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn test_bucket_exact_block() {
        let blocks = TimeBlock::default_blocks();
        let w = TimeWindow::from_hours(day(), 10, 14, utc()).unwrap();
        assert_eq!(bucket(&blocks, &w, day(), utc()), Some(1));
    }

    #[test]
    fn test_bucket_largest_overlap() {
        let blocks = TimeBlock::default_blocks();
        // 09-13: 1h in block 0, 3h in block 1
        let w = TimeWindow::from_hours(day(), 9, 13, utc()).unwrap();
        assert_eq!(bucket(&blocks, &w, day(), utc()), Some(1));
    }

    #[test]
    fn test_bucket_tie_goes_earliest() {
        let blocks = TimeBlock::default_blocks();
        let w = TimeWindow::from_hours(day(), 8, 12, utc()).unwrap();
        assert_eq!(bucket(&blocks, &w, day(), utc()), Some(0));
    }

    #[test]
    fn test_bucket_outside_all_blocks() {
        let blocks = TimeBlock::default_blocks();
        let w = TimeWindow::from_hours(day(), 1, 5, utc()).unwrap();
        assert_eq!(bucket(&blocks, &w, day(), utc()), None);
    }
}
