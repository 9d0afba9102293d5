//! Override engine.
//!
//! Applies date-level overrides before coverage is computed. A closure
//! with no zone inactivates every cell on its date; a zone-scoped closure
//! inactivates that zone only. Special events and requirement adjustments
//! never inactivate anything and are returned as annotations.
//!
//! # Precedence
//! Overrides are never merged. All overrides for a (date, zone) are
//! returned, and any closure wins over activity.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{DateOverride, OverrideType, ZoneId};

/// Annotation carried by an open cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub kind: OverrideType,
    pub reason: String,
    /// `None` for region-wide annotations.
    pub zone_id: Option<ZoneId>,
}

impl From<&DateOverride> for Annotation {
    fn from(o: &DateOverride) -> Self {
        Self {
            kind: o.kind,
            reason: o.reason.clone(),
            zone_id: o.zone_id,
        }
    }
}

/// Status of a cell after overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CellStatus {
    Open { annotations: Vec<Annotation> },
    Closed { reason: String },
}

impl CellStatus {
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }
}

/// Overrides indexed by date.
#[derive(Debug, Clone, Default)]
pub struct OverrideIndex {
    by_date: BTreeMap<NaiveDate, Vec<DateOverride>>,
}

impl OverrideIndex {
    /// Indexes a set of overrides.
    pub fn new(overrides: impl IntoIterator<Item = DateOverride>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<DateOverride>> = BTreeMap::new();
        for o in overrides {
            by_date.entry(o.date).or_default().push(o);
        }
        Self { by_date }
    }

    /// Every override on `date`.
    pub fn on(&self, date: NaiveDate) -> &[DateOverride] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Overrides on `date` that apply to `zone_id`, region-wide ones included.
    pub fn for_zone(&self, date: NaiveDate, zone_id: ZoneId) -> impl Iterator<Item = &DateOverride> {
        self.on(date).iter().filter(move |o| o.applies_to(zone_id))
    }

    /// The region-wide closure for `date`, if any.
    pub fn region_closure(&self, date: NaiveDate) -> Option<&DateOverride> {
        self.on(date).iter().find(|o| o.is_closure() && o.zone_id.is_none())
    }

    /// The closure affecting `zone_id` on `date`; a region-wide one is preferred.
    pub fn closure_for(&self, date: NaiveDate, zone_id: ZoneId) -> Option<&DateOverride> {
        self.region_closure(date)
            .or_else(|| self.for_zone(date, zone_id).find(|o| o.is_closure()))
    }

    /// Non-closure overrides for the zone on `date`.
    pub fn annotations(&self, date: NaiveDate, zone_id: ZoneId) -> Vec<Annotation> {
        self.for_zone(date, zone_id)
            .filter(|o| !o.is_closure())
            .map(Annotation::from)
            .collect()
    }

    /// Region-wide non-closure overrides on `date`.
    pub fn region_annotations(&self, date: NaiveDate) -> Vec<Annotation> {
        self.on(date)
            .iter()
            .filter(|o| !o.is_closure() && o.zone_id.is_none())
            .map(Annotation::from)
            .collect()
    }

    /// Cell status for (date, zone).
    pub fn status(&self, date: NaiveDate, zone_id: ZoneId) -> CellStatus {
        match self.closure_for(date, zone_id) {
            Some(closure) => CellStatus::Closed {
                reason: closure.reason.clone(),
            },
            None => CellStatus::Open {
                annotations: self.annotations(date, zone_id),
            },
        }
    }

    /// Cell status for a scope cell; only region-wide overrides apply.
    pub fn region_status(&self, date: NaiveDate) -> CellStatus {
        match self.region_closure(date) {
            Some(closure) => CellStatus::Closed {
                reason: closure.reason.clone(),
            },
            None => CellStatus::Open {
                annotations: self.region_annotations(date),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn dec(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, d).unwrap()
    }

    #[test]
    fn test_region_closure_closes_every_zone() {
        let index = OverrideIndex::new(vec![DateOverride::new(
            Uuid::new_v4(),
            dec(25),
            OverrideType::Closure,
            "Christmas",
        )]);
        let zone = Uuid::new_v4();
        assert_eq!(
            index.status(dec(25), zone),
            CellStatus::Closed {
                reason: "Christmas".into()
            }
        );
        assert!(index.region_status(dec(25)).is_closed());
        assert!(!index.status(dec(26), zone).is_closed());
    }

    #[test]
    fn test_zone_closure_is_scoped() {
        let closed = Uuid::new_v4();
        let open = Uuid::new_v4();
        let index = OverrideIndex::new(vec![DateOverride::new(
            Uuid::new_v4(),
            dec(24),
            OverrideType::Closure,
            "Flooding",
        )
        .for_zone(closed)]);

        assert!(index.status(dec(24), closed).is_closed());
        assert!(!index.status(dec(24), open).is_closed());
        assert!(index.region_closure(dec(24)).is_none());
        assert!(!index.region_status(dec(24)).is_closed());
    }

    #[test]
    fn test_annotations_do_not_close() {
        let zone = Uuid::new_v4();
        let index = OverrideIndex::new(vec![
            DateOverride::new(Uuid::new_v4(), dec(31), OverrideType::SpecialEvent, "Fireworks"),
            DateOverride::new(Uuid::new_v4(), dec(31), OverrideType::AdjustRequirements, "Double up").for_zone(zone),
        ]);

        match index.status(dec(31), zone) {
            CellStatus::Open { annotations } => assert_eq!(annotations.len(), 2),
            other => panic!("expected open cell, got {other:?}"),
        }
        assert_eq!(index.annotations(dec(31), Uuid::new_v4()).len(), 1);
    }

    #[test]
    fn test_closure_wins_and_all_overrides_kept() {
        let zone = Uuid::new_v4();
        let index = OverrideIndex::new(vec![
            DateOverride::new(Uuid::new_v4(), dec(25), OverrideType::SpecialEvent, "Parade"),
            DateOverride::new(Uuid::new_v4(), dec(25), OverrideType::Closure, "Storm").for_zone(zone),
            DateOverride::new(Uuid::new_v4(), dec(25), OverrideType::Closure, "Second storm").for_zone(zone),
        ]);
        assert_eq!(index.on(dec(25)).len(), 3);
        assert_eq!(index.for_zone(dec(25), zone).count(), 3);
        assert_eq!(
            index.status(dec(25), zone),
            CellStatus::Closed { reason: "Storm".into() }
        );
    }
}
