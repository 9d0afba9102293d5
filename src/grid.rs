//! Time grid builder.
//!
//! Produces the canonical cells for a date range: a pure Cartesian product
//! of days, time blocks, and zones (or dispatcher scopes). Deterministic
//! for given inputs and cheap enough to rebuild on every request; it never
//! consults live signups or assignments.
//!
//! # Ordering
//! Cells are ordered by date, then block index, then zone name (or scope).

use chrono::{FixedOffset, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::error::SchedulingResult;
use crate::models::{DateRange, Scope, TimeBlock, TimeWindow, Zone, ZoneId};

/// A (zone, date, block) cell of the volunteer coverage grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCell {
    pub zone_id: ZoneId,
    pub zone_name: String,
    /// County label (see [`Zone::county_label`]).
    pub county: String,
    pub date: NaiveDate,
    /// Index into the organisation's time blocks.
    pub block: usize,
    pub window: TimeWindow,
}

impl ZoneCell {
    /// Lookup key for this cell.
    #[inline]
    pub fn key(&self) -> (ZoneId, NaiveDate, usize) {
        (self.zone_id, self.date, self.block)
    }
}

/// A (scope, date, block) cell of the dispatcher/regional grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeCell {
    pub scope: Scope,
    pub date: NaiveDate,
    pub block: usize,
    pub window: TimeWindow,
}

/// Builds the volunteer grid over active zones.
///
/// With `county` set, only zones whose county label matches are included.
pub fn build_zone_grid(
    range: &DateRange,
    blocks: &[TimeBlock],
    zones: &[Zone],
    county: Option<&str>,
    tz: FixedOffset,
) -> SchedulingResult<Vec<ZoneCell>> {
    let mut selected: Vec<&Zone> = zones
        .iter()
        .filter(|z| z.active)
        .filter(|z| county.map_or(true, |c| z.county_label() == c))
        .collect();
    selected.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    let mut cells = Vec::with_capacity(range.len_days() * blocks.len() * selected.len());
    for date in range.days() {
        for (block_idx, block) in blocks.iter().enumerate() {
            let window = block.window_on(date, tz)?;
            for zone in &selected {
                cells.push(ZoneCell {
                    zone_id: zone.id,
                    zone_name: zone.name.clone(),
                    county: zone.county_label().to_string(),
                    date,
                    block: block_idx,
                    window,
                });
            }
        }
    }

    debug!(
        "built zone grid: {} days x {} blocks x {} zones = {} cells",
        range.len_days(),
        blocks.len(),
        selected.len(),
        cells.len()
    );
    Ok(cells)
}

/// Builds the dispatcher/regional grid over the given scopes.
pub fn build_scope_grid(
    range: &DateRange,
    blocks: &[TimeBlock],
    scopes: &[Scope],
    tz: FixedOffset,
) -> SchedulingResult<Vec<ScopeCell>> {
    let mut cells = Vec::with_capacity(range.len_days() * blocks.len() * scopes.len());
    for date in range.days() {
        for (block_idx, block) in blocks.iter().enumerate() {
            let window = block.window_on(date, tz)?;
            for scope in scopes {
                cells.push(ScopeCell {
                    scope: scope.clone(),
                    date,
                    block: block_idx,
                    window,
                });
            }
        }
    }
    debug!("built scope grid: {} scopes, {} cells", scopes.len(), cells.len());
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn zones() -> Vec<Zone> {
        vec![
            Zone::new(Uuid::new_v4(), "Wake-1").with_county("Wake"),
            Zone::new(Uuid::new_v4(), "Durham-1").with_county("Durham"),
            Zone::new(Uuid::new_v4(), "Durham-2").with_county("Durham").inactive(),
        ]
    }

    fn week() -> DateRange {
        DateRange::week(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
    }

    #[test]
    fn test_zone_grid_is_cartesian_product() {
        let cells = build_zone_grid(&week(), &TimeBlock::default_blocks(), &zones(), None, utc()).unwrap();
        // 7 days x 4 blocks x 2 active zones
        assert_eq!(cells.len(), 56);
        assert_eq!(cells[0].zone_name, "Durham-1");
        assert_eq!(cells[1].zone_name, "Wake-1");
        assert_eq!(cells[0].block, 0);
        assert_eq!(cells[2].block, 1);
    }

    #[test]
    fn test_zone_grid_county_filter() {
        let cells = build_zone_grid(&week(), &TimeBlock::default_blocks(), &zones(), Some("Wake"), utc()).unwrap();
        assert_eq!(cells.len(), 28);
        assert!(cells.iter().all(|c| c.county == "Wake"));
    }

    #[test]
    fn test_zone_grid_deterministic() {
        let z = zones();
        let a = build_zone_grid(&week(), &TimeBlock::default_blocks(), &z, None, utc()).unwrap();
        let b = build_zone_grid(&week(), &TimeBlock::default_blocks(), &z, None, utc()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scope_grid() {
        let scopes = vec![Scope::County("Durham".into()), Scope::County("Wake".into())];
        let cells = build_scope_grid(&week(), &TimeBlock::default_blocks(), &scopes, utc()).unwrap();
        assert_eq!(cells.len(), 7 * 4 * 2);
        assert_eq!(cells[0].scope, Scope::County("Durham".into()));
    }

    #[test]
    fn test_cell_windows_follow_blocks() {
        let cells = build_zone_grid(&week(), &TimeBlock::default_blocks(), &zones(), Some("Durham"), utc()).unwrap();
        assert_eq!(cells[0].window.start.format("%H:%M").to_string(), "06:00");
        assert_eq!(cells[3].window.end.format("%H:%M").to_string(), "22:00");
    }
}
