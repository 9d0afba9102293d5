//! Coverage summary metrics.
//!
//! Computes grid-wide counts from evaluated zone and scope cells.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total cells | Zone cells in the grid |
//! | Closed cells | Zone cells inactivated by a closure |
//! | Unscheduled cells | Open zone cells with no published shift |
//! | Full / Partial / None | Open scheduled cells by level |
//! | Gap count | Open scheduled cells that are not full |
//! | Scope gaps | Open scope cells without a primary |
//! | Full rate | Full / counted cells |
//!
//! Closed cells contribute nothing to any gap metric.

use serde::Serialize;

use super::{CoverageLevel, ScopeCoverage, ZoneCellCoverage};

/// Grid-wide coverage counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageStats {
    pub total_cells: usize,
    pub closed_cells: usize,
    pub unscheduled_cells: usize,
    pub full: usize,
    pub partial: usize,
    pub none: usize,
    pub gap_count: usize,
    pub scope_gaps: usize,
    /// Fraction of counted cells that are full (1.0 when nothing is counted).
    pub full_rate: f64,
}

impl CoverageStats {
    /// Computes stats from evaluated cells.
    pub fn calculate(zone_cells: &[ZoneCellCoverage], scope_cells: &[ScopeCoverage]) -> Self {
        let mut stats = Self {
            total_cells: zone_cells.len(),
            ..Self::default()
        };

        for cell in zone_cells {
            if cell.status.is_closed() {
                stats.closed_cells += 1;
                continue;
            }
            if cell.gaps.unscheduled {
                stats.unscheduled_cells += 1;
                continue;
            }
            match cell.level {
                CoverageLevel::Full => stats.full += 1,
                CoverageLevel::Partial => stats.partial += 1,
                CoverageLevel::None => stats.none += 1,
            }
        }

        stats.gap_count = stats.partial + stats.none;
        stats.scope_gaps = scope_cells.iter().filter(|c| c.is_gap()).count();

        let counted = stats.full + stats.partial + stats.none;
        stats.full_rate = if counted == 0 {
            1.0
        } else {
            stats.full as f64 / counted as f64
        };
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CellGaps;
    use crate::grid::{ScopeCell, ZoneCell};
    use crate::models::{AssignmentKind, Scope, TimeWindow};
    use crate::overrides::CellStatus;
    use chrono::{FixedOffset, NaiveDate};
    use uuid::Uuid;

    fn window() -> TimeWindow {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        TimeWindow::from_hours(day, 6, 10, FixedOffset::east_opt(0).unwrap()).unwrap()
    }

    fn zone_cell(level: CoverageLevel, closed: bool, unscheduled: bool) -> ZoneCellCoverage {
        ZoneCellCoverage {
            cell: ZoneCell {
                zone_id: Uuid::new_v4(),
                zone_name: "Z".into(),
                county: "C".into(),
                date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                block: 0,
                window: window(),
            },
            status: if closed {
                CellStatus::Closed { reason: "closed".into() }
            } else {
                CellStatus::Open { annotations: vec![] }
            },
            level,
            gaps: CellGaps {
                unscheduled,
                ..Default::default()
            },
            shifts: vec![],
        }
    }

    fn scope_cell(closed: bool) -> ScopeCoverage {
        ScopeCoverage {
            cell: ScopeCell {
                scope: Scope::Region,
                date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                block: 0,
                window: window(),
            },
            kind: AssignmentKind::Dispatcher,
            status: if closed {
                CellStatus::Closed { reason: "closed".into() }
            } else {
                CellStatus::Open { annotations: vec![] }
            },
            primary: None,
            backups: vec![],
        }
    }

    #[test]
    fn test_stats_basic() {
        let cells = vec![
            zone_cell(CoverageLevel::Full, false, false),
            zone_cell(CoverageLevel::Partial, false, false),
            zone_cell(CoverageLevel::None, false, false),
            zone_cell(CoverageLevel::None, false, true),
            zone_cell(CoverageLevel::None, true, false),
        ];
        let stats = CoverageStats::calculate(&cells, &[scope_cell(false), scope_cell(true)]);
        assert_eq!(stats.total_cells, 5);
        assert_eq!(stats.full, 1);
        assert_eq!(stats.partial, 1);
        assert_eq!(stats.none, 1);
        assert_eq!(stats.unscheduled_cells, 1);
        assert_eq!(stats.closed_cells, 1);
        assert_eq!(stats.gap_count, 2);
        assert_eq!(stats.scope_gaps, 1);
        assert!((stats.full_rate - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_stats_empty() {
        let stats = CoverageStats::calculate(&[], &[]);
        assert_eq!(stats.gap_count, 0);
        assert!((stats.full_rate - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_closed_cells_contribute_no_gaps() {
        let cells = vec![
            zone_cell(CoverageLevel::None, true, false),
            zone_cell(CoverageLevel::None, true, true),
        ];
        let stats = CoverageStats::calculate(&cells, &[scope_cell(true)]);
        assert_eq!(stats.closed_cells, 2);
        assert_eq!(stats.gap_count, 0);
        assert_eq!(stats.scope_gaps, 0);
    }
}
