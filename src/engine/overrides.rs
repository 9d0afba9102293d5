//! Date override writes.

use chrono::NaiveDate;
use log::info;
use uuid::Uuid;

use super::CoverageEngine;
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{DateOverride, OverrideId, OverrideType, ZoneId};
use crate::store::Store;

impl<S: Store> CoverageEngine<S> {
    /// Records an override for `date`; `zone_id = None` applies region-wide.
    ///
    /// Existing signups and assignments on a closed date are left in place;
    /// the closure only hides them from coverage and blocks new writes.
    pub fn create_date_override(
        &mut self,
        date: NaiveDate,
        zone_id: Option<ZoneId>,
        kind: OverrideType,
        reason: impl Into<String>,
    ) -> SchedulingResult<DateOverride> {
        let reason = reason.into();
        self.store.transaction(|tx| {
            let mut date_override = DateOverride::new(Uuid::new_v4(), date, kind, reason);
            if let Some(zone_id) = zone_id {
                if tx.zone(zone_id)?.is_none() {
                    return Err(SchedulingError::not_found("zone", zone_id));
                }
                date_override = date_override.for_zone(zone_id);
            }
            tx.insert_override(date_override.clone())?;
            info!(
                "override {:?} on {date} ({}): {}",
                kind,
                zone_id.map_or_else(|| "all zones".to_string(), |z| z.to_string()),
                date_override.reason
            );
            Ok(date_override)
        })
    }

    /// Removes an override.
    pub fn delete_date_override(&mut self, id: OverrideId) -> SchedulingResult<()> {
        self.store.transaction(|tx| {
            if tx.date_override(id)?.is_none() {
                return Err(SchedulingError::not_found("date override", id));
            }
            tx.delete_override(id)?;
            info!("deleted override {id}");
            Ok(())
        })
    }
}
