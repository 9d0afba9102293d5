//! Coverage engine facade.
//!
//! [`CoverageEngine`] bundles the organisation's settings with a [`Store`]
//! and exposes the request/response operations: coverage views, signup
//! writes, assignment writes and date overrides.
//!
//! The engine keeps nothing between calls. Every write is one
//! read-validate-write unit inside [`Store::transaction`]; views rebuild the
//! grid from the store on every request.
//!
//! # Example
//!
//! ```
//! use zone_schedule::config::OrgSettings;
//! use zone_schedule::engine::CoverageEngine;
//! use zone_schedule::models::{Zone, Shift, TimeWindow, User, QualifiedRole, RoleType};
//! use zone_schedule::store::InMemoryStore;
//! use chrono::{FixedOffset, NaiveDate};
//! use uuid::Uuid;
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let utc = FixedOffset::east_opt(0).unwrap();
//!
//! let mut store = InMemoryStore::new();
//! let zone = Zone::new(Uuid::new_v4(), "Durham-1").with_county("Durham");
//! let shift = Shift::new(Uuid::new_v4(), zone.id, monday, TimeWindow::from_hours(monday, 10, 14, utc).unwrap());
//! let user = User::new(Uuid::new_v4(), "Ana").with_role(QualifiedRole::Verifier);
//! let (shift_id, user_id) = (shift.id, user.id);
//! store.insert_zone(zone);
//! store.insert_shift(shift);
//! store.insert_user(user);
//!
//! let mut engine = CoverageEngine::new(OrgSettings::default(), store);
//! let signup = engine.create_signup(user_id, shift_id, RoleType::Verifier).unwrap();
//! assert!(signup.is_active());
//!
//! let week = engine.week_coverage(monday).unwrap();
//! assert_eq!(week.days.len(), 7);
//! ```

mod overrides;
mod registry;
mod signups;
mod views;


pub use registry::{AssignmentPatch, BulkAssignOutcome, BulkFailure, NewAssignment};
pub use views::{AggregateCell, CountyCoverage, DayCoverage, ScheduleView, WeekCoverage};

use chrono::NaiveDate;

use crate::config::OrgSettings;
use crate::error::SchedulingResult;
use crate::models::{counties, DateRange, UserId};
use crate::overrides::OverrideIndex;
use crate::store::Store;

/// Who is asking for a signup change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRole {
    /// May apply any permitted transition to any signup.
    Coordinator,
    /// May only decline their own signups.
    Volunteer,
}

/// The caller of a signup transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    pub user_id: UserId,
    pub role: ActorRole,
}

impl Actor {
    /// A coordinator actor.
    pub fn coordinator(user_id: UserId) -> Self {
        Self {
            user_id,
            role: ActorRole::Coordinator,
        }
    }

    /// A volunteer actor.
    pub fn volunteer(user_id: UserId) -> Self {
        Self {
            user_id,
            role: ActorRole::Volunteer,
        }
    }

    #[inline]
    pub fn is_coordinator(&self) -> bool {
        self.role == ActorRole::Coordinator
    }
}

/// Volunteer coverage and assignment engine for one organisation.
#[derive(Debug, Clone)]
pub struct CoverageEngine<S: Store> {
    settings: OrgSettings,
    store: S,
}

impl<S: Store> CoverageEngine<S> {
    /// Creates an engine over `store`.
    pub fn new(settings: OrgSettings, store: S) -> Self {
        Self { settings, store }
    }

    /// Organisation settings in effect.
    pub fn settings(&self) -> &OrgSettings {
        &self.settings
    }

    /// Read access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write access to the backing store, for seeding reference data.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the engine and returns its store.
    pub fn into_store(self) -> S {
        self.store
    }
}

/// Distinct counties of the store's active zones.
fn store_counties<S: Store>(store: &S) -> SchedulingResult<Vec<String>> {
    Ok(counties(&store.zones()?))
}

/// Override index for a single date.
fn overrides_on<S: Store>(store: &S, date: NaiveDate) -> SchedulingResult<OverrideIndex> {
    Ok(OverrideIndex::new(store.overrides_in(&DateRange::single(date))?))
}
