//! Date-level overrides.
//!
//! Overrides are additive: several may exist for the same date and zone,
//! and none is merged into another. Only closures affect the grid; the
//! other kinds are annotations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{OverrideId, ZoneId};

/// Override classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideType {
    /// Inactivates cells for the date (all zones, or one zone).
    Closure,
    /// Advisory note about staffing requirements; changes no capacity.
    AdjustRequirements,
    /// Annotation for a special event.
    SpecialEvent,
}

/// A date-scoped exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOverride {
    pub id: OverrideId,
    pub date: NaiveDate,
    /// `None` applies to every zone.
    pub zone_id: Option<ZoneId>,
    pub kind: OverrideType,
    pub reason: String,
}

impl DateOverride {
    /// Creates an override for all zones.
    pub fn new(id: OverrideId, date: NaiveDate, kind: OverrideType, reason: impl Into<String>) -> Self {
        Self {
            id,
            date,
            zone_id: None,
            kind,
            reason: reason.into(),
        }
    }

    /// Restricts the override to one zone.
    pub fn for_zone(mut self, zone_id: ZoneId) -> Self {
        self.zone_id = Some(zone_id);
        self
    }

    /// Whether this override applies to `zone_id` on its date.
    pub fn applies_to(&self, zone_id: ZoneId) -> bool {
        self.zone_id.map_or(true, |z| z == zone_id)
    }

    #[inline]
    pub fn is_closure(&self) -> bool {
        self.kind == OverrideType::Closure
    }
}
