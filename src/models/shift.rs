//! Shift model.
//!
//! A shift is a concrete (zone, date, window) instance with a capacity
//! triple and a publication status. Its window need not align to a
//! [`TimeBlock`](super::TimeBlock); views bucket it into the nearest block.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ShiftId, TimeWindow, ZoneId};

/// Volunteer capacity triple.
///
/// `min` is advisory (a coverage gap signal); `max` bounds verifier signups.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
    /// Minimum verifiers for full coverage.
    pub min: u32,
    /// Target verifier count.
    pub ideal: u32,
    /// Hard cap on active verifier signups.
    pub max: u32,
}

impl Capacity {
    /// Creates a capacity triple.
    pub fn new(min: u32, ideal: u32, max: u32) -> Self {
        Self { min, ideal, max }
    }

    /// Slots remaining given the current active verifier count.
    pub fn slots_remaining(&self, active: u32) -> u32 {
        self.max.saturating_sub(active)
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::new(1, 2, 4)
    }
}

/// Shift publication status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    Draft,
    #[default]
    Published,
    Cancelled,
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Cancelled => "CANCELLED",
        })
    }
}

/// Where and how the team meets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingInfo {
    pub location: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
}

/// A concrete staffed time window in one zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    /// Unique shift identifier.
    pub id: ShiftId,
    /// Zone this shift staffs.
    pub zone_id: ZoneId,
    /// Local calendar date.
    pub date: NaiveDate,
    /// Concrete time window.
    pub window: TimeWindow,
    /// Free-form shift type (e.g. "patrol").
    pub shift_type: String,
    /// Verifier capacity.
    pub capacity: Capacity,
    /// Publication status.
    pub status: ShiftStatus,
    /// Whether a zone dispatcher signup is required (zone dispatcher mode only).
    pub requires_dispatcher: bool,
    /// Whether a zone lead signup is required.
    pub requires_zone_lead: bool,
    /// Meeting metadata.
    pub meeting: Option<MeetingInfo>,
}

impl Shift {
    /// Creates a published shift with default capacity and no role requirements.
    pub fn new(id: ShiftId, zone_id: ZoneId, date: NaiveDate, window: TimeWindow) -> Self {
        Self {
            id,
            zone_id,
            date,
            window,
            shift_type: String::new(),
            capacity: Capacity::default(),
            status: ShiftStatus::Published,
            requires_dispatcher: false,
            requires_zone_lead: false,
            meeting: None,
        }
    }

    /// Sets the shift type.
    pub fn with_type(mut self, shift_type: impl Into<String>) -> Self {
        self.shift_type = shift_type.into();
        self
    }

    /// Sets the capacity triple.
    pub fn with_capacity(mut self, min: u32, ideal: u32, max: u32) -> Self {
        self.capacity = Capacity::new(min, ideal, max);
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: ShiftStatus) -> Self {
        self.status = status;
        self
    }

    /// Requires a zone dispatcher signup.
    pub fn requiring_dispatcher(mut self) -> Self {
        self.requires_dispatcher = true;
        self
    }

    /// Requires a zone lead signup.
    pub fn requiring_zone_lead(mut self) -> Self {
        self.requires_zone_lead = true;
        self
    }

    /// Sets meeting metadata.
    pub fn with_meeting(mut self, meeting: MeetingInfo) -> Self {
        self.meeting = Some(meeting);
        self
    }

    /// Whether volunteers may sign up.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Published
    }
}
