//! Zone model.
//!
//! A zone is a geographic operational area. Zones optionally belong to a
//! county, which is the dispatcher scope in county mode.

use serde::{Deserialize, Serialize};

use super::ZoneId;

/// County label used for zones that declare no county.
pub const UNASSIGNED_COUNTY: &str = "Unassigned";

/// A geographic operational area.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Unique zone identifier.
    pub id: ZoneId,
    /// Display name.
    pub name: String,
    /// County/region grouping.
    pub county: Option<String>,
    /// Inactive zones are left out of the grid.
    pub active: bool,
}

impl Zone {
    /// Creates an active zone without a county.
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            county: None,
            active: true,
        }
    }

    /// Sets the county.
    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    /// Marks the zone inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// County label for grouping; zones without one share [`UNASSIGNED_COUNTY`].
    pub fn county_label(&self) -> &str {
        self.county.as_deref().unwrap_or(UNASSIGNED_COUNTY)
    }
}

/// Distinct county names among active zones, sorted.
///
/// Zones without a county do not contribute a dispatcher scope.
pub fn counties(zones: &[Zone]) -> Vec<String> {
    let mut out: Vec<String> = zones
        .iter()
        .filter(|z| z.active)
        .filter_map(|z| z.county.clone())
        .collect();
    out.sort();
    out.dedup();
    out
}
