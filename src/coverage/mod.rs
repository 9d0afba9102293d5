//! Coverage aggregation.
//!
//! Folds live signups and assignments into the grid and classifies each
//! cell as full, partial or none, with a structured gap description.
//!
//! # Classification
//!
//! | Level | Shift | Aggregate (cell, county) |
//! |-------|-------|--------------------------|
//! | `Full` | every requirement met | every constituent full |
//! | `None` | no active signup at all | every constituent none |
//! | `Partial` | otherwise | otherwise |
//!
//! A shift's requirements are a dispatcher (zone dispatcher mode only, when
//! the shift asks for one), a zone lead (when asked for), and at least
//! `capacity.min` pending-or-confirmed verifiers. The minimum is advisory:
//! falling short produces a gap, never a rejected write.
//!
//! Dispatcher and regional-lead scope coverage is a separate signal
//! ([`ScopeCoverage`]) and never changes a zone's level.

mod stats;

pub use stats::CoverageStats;

use serde::Serialize;

use crate::grid::{ScopeCell, ZoneCell};
use crate::models::{Assignment, AssignmentKind, DispatcherMode, RoleType, Shift, ShiftId, Signup};
use crate::overrides::CellStatus;

/// Tri-state coverage signal, ordered `None < Partial < Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    None,
    Partial,
    Full,
}

/// Combines constituent levels: full iff all full, none iff all none.
///
/// An empty input is `None`.
pub fn aggregate(levels: impl IntoIterator<Item = CoverageLevel>) -> CoverageLevel {
    let mut any = false;
    let mut all_full = true;
    let mut all_none = true;
    for level in levels {
        any = true;
        all_full &= level == CoverageLevel::Full;
        all_none &= level == CoverageLevel::None;
    }
    match (any, all_full, all_none) {
        (false, _, _) => CoverageLevel::None,
        (true, true, _) => CoverageLevel::Full,
        (true, _, true) => CoverageLevel::None,
        _ => CoverageLevel::Partial,
    }
}

/// Active (pending or confirmed) signup counts per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCounts {
    pub dispatchers: u32,
    pub zone_leads: u32,
    pub verifiers: u32,
}

impl RoleCounts {
    /// Counts the active signups in `signups`.
    pub fn from_signups<'a>(signups: impl IntoIterator<Item = &'a Signup>) -> Self {
        let mut counts = Self::default();
        for s in signups.into_iter().filter(|s| s.is_active()) {
            *counts.slot_mut(s.role) += 1;
        }
        counts
    }

    /// Count for one role.
    pub fn get(&self, role: RoleType) -> u32 {
        match role {
            RoleType::Dispatcher => self.dispatchers,
            RoleType::ZoneLead => self.zone_leads,
            RoleType::Verifier => self.verifiers,
        }
    }

    fn slot_mut(&mut self, role: RoleType) -> &mut u32 {
        match role {
            RoleType::Dispatcher => &mut self.dispatchers,
            RoleType::ZoneLead => &mut self.zone_leads,
            RoleType::Verifier => &mut self.verifiers,
        }
    }

    /// All active signups.
    pub fn total(&self) -> u32 {
        self.dispatchers + self.zone_leads + self.verifiers
    }
}

/// What a shift needs to be fully covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub dispatcher: bool,
    pub zone_lead: bool,
    pub min_verifiers: u32,
}

impl Requirement {
    /// Requirements of `shift` under the organisation's dispatcher mode.
    pub fn for_shift(shift: &Shift, mode: DispatcherMode) -> Self {
        Self {
            dispatcher: shift.requires_dispatcher && mode.dispatches_per_zone(),
            zone_lead: shift.requires_zone_lead,
            min_verifiers: shift.capacity.min,
        }
    }
}

/// Classifies one shift.
pub fn classify(req: &Requirement, counts: &RoleCounts) -> CoverageLevel {
    let dispatcher_met = !req.dispatcher || counts.dispatchers > 0;
    let lead_met = !req.zone_lead || counts.zone_leads > 0;
    let verifiers_met = counts.verifiers >= req.min_verifiers;

    if dispatcher_met && lead_met && verifiers_met {
        CoverageLevel::Full
    } else if counts.total() == 0 {
        CoverageLevel::None
    } else {
        CoverageLevel::Partial
    }
}

/// Structured description of what a cell is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellGaps {
    /// No published shift falls in the cell.
    pub unscheduled: bool,
    /// A zone dispatcher is required but absent (zone dispatcher mode only).
    pub missing_dispatcher: bool,
    /// Zones whose required lead is absent.
    pub zones_missing_lead: Vec<String>,
    /// Verifiers still needed to reach the minimum.
    pub verifier_shortfall: u32,
}

impl CellGaps {
    /// Gaps of one shift in `zone_name`.
    pub fn for_shift(req: &Requirement, counts: &RoleCounts, zone_name: &str) -> Self {
        Self {
            unscheduled: false,
            missing_dispatcher: req.dispatcher && counts.dispatchers == 0,
            zones_missing_lead: if req.zone_lead && counts.zone_leads == 0 {
                vec![zone_name.to_string()]
            } else {
                Vec::new()
            },
            verifier_shortfall: req.min_verifiers.saturating_sub(counts.verifiers),
        }
    }

    /// Folds another cell's gaps into this one.
    pub fn merge(&mut self, other: &CellGaps) {
        self.missing_dispatcher |= other.missing_dispatcher;
        for zone in &other.zones_missing_lead {
            if !self.zones_missing_lead.contains(zone) {
                self.zones_missing_lead.push(zone.clone());
            }
        }
        self.verifier_shortfall += other.verifier_shortfall;
    }

    /// Whether nothing is missing.
    pub fn is_empty(&self) -> bool {
        !self.unscheduled
            && !self.missing_dispatcher
            && self.zones_missing_lead.is_empty()
            && self.verifier_shortfall == 0
    }

    /// Human-readable gap lines, e.g. `"1 below minimum"`.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.unscheduled {
            lines.push("no shift scheduled".to_string());
        }
        if self.missing_dispatcher {
            lines.push("missing dispatcher".to_string());
        }
        if !self.zones_missing_lead.is_empty() {
            lines.push(format!("no zone lead: {}", self.zones_missing_lead.join(", ")));
        }
        if self.verifier_shortfall > 0 {
            lines.push(format!("{} below minimum", self.verifier_shortfall));
        }
        lines
    }
}

/// One shift's contribution to a cell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftCoverage {
    pub shift_id: ShiftId,
    pub counts: RoleCounts,
    pub slots_remaining: u32,
    pub level: CoverageLevel,
}

/// Coverage of one (zone, date, block) cell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCellCoverage {
    #[serde(flatten)]
    pub cell: ZoneCell,
    pub status: CellStatus,
    pub level: CoverageLevel,
    pub gaps: CellGaps,
    pub shifts: Vec<ShiftCoverage>,
}

impl ZoneCellCoverage {
    /// Whether the cell takes part in coverage counting.
    pub fn is_counted(&self) -> bool {
        !self.status.is_closed() && !self.gaps.unscheduled
    }
}

/// Evaluates a zone cell from the published shifts bucketed into it.
///
/// `shifts` pairs each shift with the signups it holds. Closed cells keep
/// their closure reason and report no gaps.
pub fn evaluate_zone_cell(
    cell: &ZoneCell,
    status: CellStatus,
    shifts: &[(&Shift, Vec<&Signup>)],
    mode: DispatcherMode,
) -> ZoneCellCoverage {
    if status.is_closed() {
        return ZoneCellCoverage {
            cell: cell.clone(),
            status,
            level: CoverageLevel::None,
            gaps: CellGaps::default(),
            shifts: Vec::new(),
        };
    }

    let mut gaps = CellGaps::default();
    let mut per_shift = Vec::with_capacity(shifts.len());
    for (shift, signups) in shifts {
        let counts = RoleCounts::from_signups(signups.iter().copied());
        let req = Requirement::for_shift(shift, mode);
        gaps.merge(&CellGaps::for_shift(&req, &counts, &cell.zone_name));
        per_shift.push(ShiftCoverage {
            shift_id: shift.id,
            counts,
            slots_remaining: shift.capacity.slots_remaining(counts.verifiers),
            level: classify(&req, &counts),
        });
    }
    gaps.unscheduled = per_shift.is_empty();

    ZoneCellCoverage {
        cell: cell.clone(),
        status,
        level: aggregate(per_shift.iter().map(|s| s.level)),
        gaps,
        shifts: per_shift,
    }
}

/// Coverage of a dispatcher or regional-lead scope cell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeCoverage {
    #[serde(flatten)]
    pub cell: ScopeCell,
    pub kind: AssignmentKind,
    pub status: CellStatus,
    pub primary: Option<Assignment>,
    pub backups: Vec<Assignment>,
}

impl ScopeCoverage {
    /// A primary holds the cell.
    pub fn is_covered(&self) -> bool {
        self.primary.is_some()
    }

    /// Open and without a primary.
    pub fn is_gap(&self) -> bool {
        !self.status.is_closed() && self.primary.is_none()
    }
}

/// Evaluates a scope cell from the assignments of `kind` overlapping it.
pub fn evaluate_scope_cell(
    cell: &ScopeCell,
    kind: AssignmentKind,
    status: CellStatus,
    assignments: &[Assignment],
) -> ScopeCoverage {
    let mut primary = None;
    let mut backups = Vec::new();
    for a in assignments
        .iter()
        .filter(|a| a.shares_slot(kind, &cell.scope, cell.date, &cell.window))
    {
        if a.is_backup {
            backups.push(a.clone());
        } else if primary.is_none() {
            primary = Some(a.clone());
        }
    }
    ScopeCoverage {
        cell: cell.clone(),
        kind,
        status,
        primary,
        backups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Scope, SignupStatus, TimeWindow};
    use chrono::{FixedOffset, NaiveDate};
    use uuid::Uuid;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn window(h0: u8, h1: u8) -> TimeWindow {
        TimeWindow::from_hours(day(), h0, h1, FixedOffset::east_opt(0).unwrap()).unwrap()
    }

    fn signup(shift: &Shift, role: RoleType, status: SignupStatus) -> Signup {
        Signup::new(Uuid::new_v4(), Uuid::new_v4(), shift.id, role, status)
    }

    fn durham_shift() -> Shift {
        Shift::new(Uuid::new_v4(), Uuid::new_v4(), day(), window(10, 14)).with_capacity(2, 4, 6)
    }

    fn cell(shift: &Shift) -> ZoneCell {
        ZoneCell {
            zone_id: shift.zone_id,
            zone_name: "Durham-1".into(),
            county: "Durham".into(),
            date: day(),
            block: 1,
            window: window(10, 14),
        }
    }

    fn open() -> CellStatus {
        CellStatus::Open { annotations: vec![] }
    }

    #[test]
    fn test_aggregate() {
        use CoverageLevel::{Full, Partial};
        assert_eq!(aggregate([Full, Full]), Full);
        assert_eq!(aggregate([CoverageLevel::None, CoverageLevel::None]), CoverageLevel::None);
        assert_eq!(aggregate([Full, CoverageLevel::None]), Partial);
        assert_eq!(aggregate([Partial]), Partial);
        assert_eq!(aggregate(Vec::new()), CoverageLevel::None);
        assert!(CoverageLevel::None < Partial && Partial < Full);
    }

    #[test]
    fn test_two_confirmed_verifiers_is_full() {
        let shift = durham_shift();
        let s1 = signup(&shift, RoleType::Verifier, SignupStatus::Confirmed);
        let s2 = signup(&shift, RoleType::Verifier, SignupStatus::Confirmed);
        let cov = evaluate_zone_cell(&cell(&shift), open(), &[(&shift, vec![&s1, &s2])], DispatcherMode::County);
        assert_eq!(cov.level, CoverageLevel::Full);
        assert!(cov.gaps.is_empty());
        assert_eq!(cov.shifts[0].slots_remaining, 4);
    }

    #[test]
    fn test_one_verifier_is_partial() {
        let shift = durham_shift();
        let s1 = signup(&shift, RoleType::Verifier, SignupStatus::Confirmed);
        let cov = evaluate_zone_cell(&cell(&shift), open(), &[(&shift, vec![&s1])], DispatcherMode::County);
        assert_eq!(cov.level, CoverageLevel::Partial);
        assert_eq!(cov.gaps.describe(), vec!["1 below minimum".to_string()]);
    }

    #[test]
    fn test_no_signups_is_none() {
        let shift = durham_shift();
        let cov = evaluate_zone_cell(&cell(&shift), open(), &[(&shift, vec![])], DispatcherMode::County);
        assert_eq!(cov.level, CoverageLevel::None);
        assert_eq!(cov.gaps.verifier_shortfall, 2);
    }

    #[test]
    fn test_declined_signups_do_not_count() {
        let shift = durham_shift();
        let s1 = signup(&shift, RoleType::Verifier, SignupStatus::Declined);
        let s2 = signup(&shift, RoleType::Verifier, SignupStatus::NoShow);
        let counts = RoleCounts::from_signups([&s1, &s2]);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_pending_counts_toward_minimum() {
        let shift = durham_shift();
        let s1 = signup(&shift, RoleType::Verifier, SignupStatus::Pending);
        let s2 = signup(&shift, RoleType::Verifier, SignupStatus::Confirmed);
        let cov = evaluate_zone_cell(&cell(&shift), open(), &[(&shift, vec![&s1, &s2])], DispatcherMode::County);
        assert_eq!(cov.level, CoverageLevel::Full);
    }

    #[test]
    fn test_zone_lead_gap_names_zone() {
        let shift = durham_shift().requiring_zone_lead();
        let s1 = signup(&shift, RoleType::Verifier, SignupStatus::Confirmed);
        let s2 = signup(&shift, RoleType::Verifier, SignupStatus::Confirmed);
        let cov = evaluate_zone_cell(&cell(&shift), open(), &[(&shift, vec![&s1, &s2])], DispatcherMode::County);
        assert_eq!(cov.level, CoverageLevel::Partial);
        assert_eq!(cov.gaps.zones_missing_lead, vec!["Durham-1".to_string()]);
    }

    #[test]
    fn test_dispatcher_requirement_only_in_zone_mode() {
        let shift = durham_shift().requiring_dispatcher();
        let s1 = signup(&shift, RoleType::Verifier, SignupStatus::Confirmed);
        let s2 = signup(&shift, RoleType::Verifier, SignupStatus::Confirmed);
        let signups = vec![&s1, &s2];

        let county = evaluate_zone_cell(&cell(&shift), open(), &[(&shift, signups.clone())], DispatcherMode::County);
        assert_eq!(county.level, CoverageLevel::Full);
        assert!(!county.gaps.missing_dispatcher);

        let zone = evaluate_zone_cell(&cell(&shift), open(), &[(&shift, signups)], DispatcherMode::Zone);
        assert_eq!(zone.level, CoverageLevel::Partial);
        assert!(zone.gaps.missing_dispatcher);
    }

    #[test]
    fn test_unscheduled_cell() {
        let shift = durham_shift();
        let cov = evaluate_zone_cell(&cell(&shift), open(), &[], DispatcherMode::County);
        assert_eq!(cov.level, CoverageLevel::None);
        assert!(cov.gaps.unscheduled);
        assert!(!cov.is_counted());
    }

    #[test]
    fn test_closed_cell_has_no_gaps() {
        let shift = durham_shift();
        let status = CellStatus::Closed { reason: "Holiday".into() };
        let cov = evaluate_zone_cell(&cell(&shift), status, &[(&shift, vec![])], DispatcherMode::County);
        assert!(cov.gaps.is_empty());
        assert!(!cov.is_counted());
    }

    #[test]
    fn test_scope_cell_primary_and_backups() {
        let scope_cell = ScopeCell {
            scope: Scope::County("Durham".into()),
            date: day(),
            block: 1,
            window: window(10, 14),
        };
        let make = |backup: bool, scope: Scope| Assignment {
            id: Uuid::new_v4(),
            kind: AssignmentKind::Dispatcher,
            user_id: Uuid::new_v4(),
            scope,
            date: day(),
            window: window(9, 13),
            is_backup: backup,
            notes: None,
        };
        let assignments = vec![
            make(true, Scope::County("Durham".into())),
            make(false, Scope::County("Durham".into())),
            make(false, Scope::County("Wake".into())),
        ];

        let cov = evaluate_scope_cell(&scope_cell, AssignmentKind::Dispatcher, open(), &assignments);
        assert!(cov.is_covered());
        assert_eq!(cov.backups.len(), 1);

        let leads = evaluate_scope_cell(&scope_cell, AssignmentKind::RegionalLead, open(), &assignments);
        assert!(leads.is_gap());
    }

    #[test]
    fn test_gap_merge_dedupes_zones() {
        let mut a = CellGaps {
            zones_missing_lead: vec!["A".into()],
            verifier_shortfall: 1,
            ..Default::default()
        };
        let b = CellGaps {
            zones_missing_lead: vec!["A".into(), "B".into()],
            verifier_shortfall: 2,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.zones_missing_lead, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(a.verifier_shortfall, 3);
        assert_eq!(a.describe()[0], "no zone lead: A, B");
    }
}
