//! Coverage views.
//!
//! Both views are rebuilt from the store on every call: grid, then
//! overrides, then live signups and assignments.
//!
//! # Bucketing
//! A published shift lands in the one time block it overlaps most (ties go
//! to the earliest block). An assignment covers every scope cell its window
//! overlaps.
//!
//! # County roll-up
//! A county cell aggregates its open, scheduled zone cells for the same
//! (date, block). It is closed only when every constituent zone is closed,
//! and unscheduled when none of the open zones has a shift.

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::CoverageEngine;
use crate::coverage::{
    aggregate, evaluate_scope_cell, evaluate_zone_cell, CellGaps, CoverageLevel, CoverageStats,
    ScopeCoverage, ZoneCellCoverage,
};
use crate::error::SchedulingResult;
use crate::grid::{build_scope_grid, build_zone_grid};
use crate::models::time_block::bucket;
use crate::models::{
    counties, Assignment, AssignmentKind, DateRange, DispatcherMode, Scope, Shift, Signup,
    TimeBlock, Zone, ZoneId,
};
use crate::overrides::{Annotation, OverrideIndex};
use crate::store::Store;

/// Region-wide state of one day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCoverage {
    pub date: NaiveDate,
    /// A region-wide closure is in effect.
    pub is_closed: bool,
    pub closure_reason: Option<String>,
    /// Region-wide special events and requirement notes.
    pub annotations: Vec<Annotation>,
    /// Counted zone cells on this day that are not full.
    pub gap_count: usize,
}

/// County roll-up of one (date, block).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateCell {
    pub date: NaiveDate,
    pub block: usize,
    pub is_closed: bool,
    pub level: CoverageLevel,
    pub gaps: CellGaps,
    pub zones: Vec<ZoneCellCoverage>,
}

impl AggregateCell {
    fn from_zones(date: NaiveDate, block: usize, zones: Vec<ZoneCellCoverage>) -> Self {
        let is_closed = zones.iter().all(|z| z.status.is_closed());
        let mut gaps = CellGaps::default();
        let mut levels = Vec::new();
        for zone in zones.iter().filter(|z| z.is_counted()) {
            gaps.merge(&zone.gaps);
            levels.push(zone.level);
        }
        gaps.unscheduled = !is_closed && levels.is_empty();
        Self {
            date,
            block,
            is_closed,
            level: aggregate(levels),
            gaps,
            zones,
        }
    }
}

/// One county's cells for the week.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyCoverage {
    pub county: String,
    /// Ordered by date, then block.
    pub cells: Vec<AggregateCell>,
}

/// Week view: volunteer coverage plus coordinator coverage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekCoverage {
    pub week_start: NaiveDate,
    pub days: Vec<DayCoverage>,
    pub counties: Vec<CountyCoverage>,
    pub time_slots: Vec<TimeBlock>,
    /// Dispatcher scope cells followed by regional-lead cells.
    pub coordinator_coverage: Vec<ScopeCoverage>,
    pub stats: CoverageStats,
}

impl WeekCoverage {
    /// The county roll-up named `county`.
    pub fn county(&self, county: &str) -> Option<&CountyCoverage> {
        self.counties.iter().find(|c| c.county == county)
    }
}

/// Coordinator-facing assignment grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub range: DateRange,
    pub schedule: Vec<ZoneCellCoverage>,
    /// Region-wide dispatcher cells (regional mode only).
    pub regional_dispatchers: Vec<ScopeCoverage>,
    /// Per-county dispatcher cells (county mode only).
    pub county_dispatchers: Vec<ScopeCoverage>,
    pub regional_leads: Vec<ScopeCoverage>,
    pub dispatcher_mode: DispatcherMode,
}

impl<S: Store> CoverageEngine<S> {
    /// Coverage for the seven days starting at `week_start`.
    pub fn week_coverage(&self, week_start: NaiveDate) -> SchedulingResult<WeekCoverage> {
        let range = DateRange::week(week_start);
        let zones = self.store.zones()?;
        let index = OverrideIndex::new(self.store.overrides_in(&range)?);
        let assignments = self.store.assignments_in(&range)?;

        let zone_cells = self.zone_coverage(&range, &zones, None, &index)?;
        let scopes = self.settings.dispatcher_mode.dispatcher_scopes(&counties(&zones));
        let mut coordinator_coverage =
            self.scope_coverage(&range, &scopes, AssignmentKind::Dispatcher, &assignments, &index)?;
        coordinator_coverage.extend(self.scope_coverage(
            &range,
            &[Scope::Region],
            AssignmentKind::RegionalLead,
            &assignments,
            &index,
        )?);

        let stats = CoverageStats::calculate(&zone_cells, &coordinator_coverage);
        let days = range
            .days()
            .map(|date| {
                let closure = index.region_closure(date);
                DayCoverage {
                    date,
                    is_closed: closure.is_some(),
                    closure_reason: closure.map(|c| c.reason.clone()),
                    annotations: index.region_annotations(date),
                    gap_count: zone_cells
                        .iter()
                        .filter(|c| c.cell.date == date && c.is_counted() && c.level != CoverageLevel::Full)
                        .count(),
                }
            })
            .collect();

        debug!(
            "week coverage from {week_start}: {} zone cells, {} gaps, {} scope gaps",
            stats.total_cells, stats.gap_count, stats.scope_gaps
        );
        Ok(WeekCoverage {
            week_start,
            days,
            counties: county_rollup(zone_cells),
            time_slots: self.settings.time_blocks.clone(),
            coordinator_coverage,
            stats,
        })
    }

    /// Assignment grid for `[start, end]`, optionally narrowed to one county.
    pub fn schedule(&self, start: NaiveDate, end: NaiveDate, county: Option<&str>) -> SchedulingResult<ScheduleView> {
        let range = DateRange::new(start, end)?;
        let zones = self.store.zones()?;
        let index = OverrideIndex::new(self.store.overrides_in(&range)?);
        let assignments = self.store.assignments_in(&range)?;
        let mode = self.settings.dispatcher_mode;

        let schedule = self.zone_coverage(&range, &zones, county, &index)?;
        let (regional, per_county): (Vec<Scope>, Vec<Scope>) = mode
            .dispatcher_scopes(&counties(&zones))
            .into_iter()
            .filter(|s| match (s, county) {
                (Scope::County(name), Some(wanted)) => name == wanted,
                _ => true,
            })
            .partition(|s| matches!(s, Scope::Region));

        Ok(ScheduleView {
            range,
            schedule,
            regional_dispatchers: self.scope_coverage(&range, &regional, AssignmentKind::Dispatcher, &assignments, &index)?,
            county_dispatchers: self.scope_coverage(&range, &per_county, AssignmentKind::Dispatcher, &assignments, &index)?,
            regional_leads: self.scope_coverage(&range, &[Scope::Region], AssignmentKind::RegionalLead, &assignments, &index)?,
            dispatcher_mode: mode,
        })
    }

    fn zone_coverage(
        &self,
        range: &DateRange,
        zones: &[Zone],
        county: Option<&str>,
        index: &OverrideIndex,
    ) -> SchedulingResult<Vec<ZoneCellCoverage>> {
        let tz = self.settings.timezone();
        let blocks = &self.settings.time_blocks;
        let cells = build_zone_grid(range, blocks, zones, county, tz)?;

        let mut bucketed: HashMap<(ZoneId, NaiveDate, usize), Vec<(Shift, Vec<Signup>)>> = HashMap::new();
        for shift in self.store.shifts_in(range)?.into_iter().filter(Shift::is_open) {
            let Some(block) = bucket(blocks, &shift.window, shift.date, tz) else {
                debug!("shift {} overlaps no time block", shift.id);
                continue;
            };
            let signups = self.store.signups_for_shift(shift.id)?;
            bucketed
                .entry((shift.zone_id, shift.date, block))
                .or_default()
                .push((shift, signups));
        }

        let mode = self.settings.dispatcher_mode;
        let coverage = cells
            .iter()
            .map(|cell| {
                let shifts: Vec<(&Shift, Vec<&Signup>)> = bucketed
                    .get(&cell.key())
                    .map(|v| {
                        v.iter()
                            .map(|(shift, signups)| (shift, signups.iter().collect::<Vec<_>>()))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                evaluate_zone_cell(cell, index.status(cell.date, cell.zone_id), &shifts, mode)
            })
            .collect();
        Ok(coverage)
    }

    fn scope_coverage(
        &self,
        range: &DateRange,
        scopes: &[Scope],
        kind: AssignmentKind,
        assignments: &[Assignment],
        index: &OverrideIndex,
    ) -> SchedulingResult<Vec<ScopeCoverage>> {
        let cells = build_scope_grid(range, &self.settings.time_blocks, scopes, self.settings.timezone())?;
        Ok(cells
            .iter()
            .map(|cell| evaluate_scope_cell(cell, kind, index.region_status(cell.date), assignments))
            .collect())
    }
}

/// Groups zone cells by county, then by (date, block).
fn county_rollup(cells: Vec<ZoneCellCoverage>) -> Vec<CountyCoverage> {
    let mut by_county: BTreeMap<String, BTreeMap<(NaiveDate, usize), Vec<ZoneCellCoverage>>> = BTreeMap::new();
    for cell in cells {
        by_county
            .entry(cell.cell.county.clone())
            .or_default()
            .entry((cell.cell.date, cell.cell.block))
            .or_default()
            .push(cell);
    }
    by_county
        .into_iter()
        .map(|(county, slots)| CountyCoverage {
            county,
            cells: slots
                .into_iter()
                .map(|((date, block), zones)| AggregateCell::from_zones(date, block, zones))
                .collect(),
        })
        .collect()
}
