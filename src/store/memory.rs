//! HashMap-backed store.
//!
//! Reference implementation of [`Store`] for tests and embedded use.
//! Transactions snapshot the whole state and restore it on error.

use std::collections::HashMap;

use super::{Store, StoreError, StoreResult};
use crate::error::SchedulingResult;
use crate::models::{
    Assignment, AssignmentId, DateOverride, DateRange, OverrideId, Shift, ShiftId, Signup,
    SignupId, User, UserId, Zone, ZoneId,
};
use crate::validation::{validate_shifts, validate_zones, ValidationError};

/// In-memory relational store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    users: HashMap<UserId, User>,
    zones: HashMap<ZoneId, Zone>,
    shifts: HashMap<ShiftId, Shift>,
    signups: HashMap<SignupId, Signup>,
    assignments: HashMap<AssignmentId, Assignment>,
    overrides: HashMap<OverrideId, DateOverride>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `zones` and `shifts`.
    ///
    /// The reference data is validated first; every problem found is
    /// returned and nothing is loaded.
    pub fn seeded(zones: Vec<Zone>, shifts: Vec<Shift>) -> Result<Self, Vec<ValidationError>> {
        let mut errors = validate_zones(&zones).err().unwrap_or_default();
        errors.extend(validate_shifts(&shifts, &zones).err().unwrap_or_default());
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut store = Self::new();
        for zone in zones {
            store.insert_zone(zone);
        }
        for shift in shifts {
            store.insert_shift(shift);
        }
        Ok(store)
    }

    /// Inserts or replaces a user.
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Inserts or replaces a zone.
    pub fn insert_zone(&mut self, zone: Zone) {
        self.zones.insert(zone.id, zone);
    }

    /// Inserts or replaces a shift.
    pub fn insert_shift(&mut self, shift: Shift) {
        self.shifts.insert(shift.id, shift);
    }

    /// Every signup ever written, including declined ones.
    pub fn all_signups(&self) -> Vec<Signup> {
        let mut out: Vec<Signup> = self.signups.values().cloned().collect();
        out.sort_by_key(|s| (s.created_at, s.id));
        out
    }

    /// Every live assignment.
    pub fn all_assignments(&self) -> Vec<Assignment> {
        let mut out: Vec<Assignment> = self.assignments.values().cloned().collect();
        sort_assignments(&mut out);
        out
    }
}

fn sort_assignments(v: &mut [Assignment]) {
    v.sort_by(|a, b| (a.date, a.window.start, &a.scope, a.id).cmp(&(b.date, b.window.start, &b.scope, b.id)));
}

fn missing(entity: &'static str, id: impl ToString) -> StoreError {
    StoreError::MissingRow {
        entity,
        id: id.to_string(),
    }
}

impl Store for InMemoryStore {
    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    fn zones(&self) -> StoreResult<Vec<Zone>> {
        let mut out: Vec<Zone> = self.zones.values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn zone(&self, id: ZoneId) -> StoreResult<Option<Zone>> {
        Ok(self.zones.get(&id).cloned())
    }

    fn shift(&self, id: ShiftId) -> StoreResult<Option<Shift>> {
        Ok(self.shifts.get(&id).cloned())
    }

    fn shifts_in(&self, range: &DateRange) -> StoreResult<Vec<Shift>> {
        let mut out: Vec<Shift> = self
            .shifts
            .values()
            .filter(|s| range.contains(s.date))
            .cloned()
            .collect();
        out.sort_by_key(|s| (s.date, s.window.start, s.id));
        Ok(out)
    }

    fn signup(&self, id: SignupId) -> StoreResult<Option<Signup>> {
        Ok(self.signups.get(&id).cloned())
    }

    fn signups_for_shift(&self, shift_id: ShiftId) -> StoreResult<Vec<Signup>> {
        let mut out: Vec<Signup> = self
            .signups
            .values()
            .filter(|s| s.shift_id == shift_id)
            .cloned()
            .collect();
        out.sort_by_key(|s| (s.created_at, s.id));
        Ok(out)
    }

    fn signups_for_user(&self, user_id: UserId) -> StoreResult<Vec<Signup>> {
        let mut out: Vec<Signup> = self
            .signups
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by_key(|s| (s.created_at, s.id));
        Ok(out)
    }

    fn insert_signup(&mut self, signup: Signup) -> StoreResult<()> {
        self.signups.insert(signup.id, signup);
        Ok(())
    }

    fn update_signup(&mut self, signup: &Signup) -> StoreResult<()> {
        let slot = self
            .signups
            .get_mut(&signup.id)
            .ok_or_else(|| missing("signup", signup.id))?;
        *slot = signup.clone();
        Ok(())
    }

    fn assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        Ok(self.assignments.get(&id).cloned())
    }

    fn assignments_for_user(&self, user_id: UserId) -> StoreResult<Vec<Assignment>> {
        let mut out: Vec<Assignment> = self
            .assignments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        sort_assignments(&mut out);
        Ok(out)
    }

    fn assignments_in(&self, range: &DateRange) -> StoreResult<Vec<Assignment>> {
        let mut out: Vec<Assignment> = self
            .assignments
            .values()
            .filter(|a| range.contains(a.date))
            .cloned()
            .collect();
        sort_assignments(&mut out);
        Ok(out)
    }

    fn insert_assignment(&mut self, assignment: Assignment) -> StoreResult<()> {
        self.assignments.insert(assignment.id, assignment);
        Ok(())
    }

    fn update_assignment(&mut self, assignment: &Assignment) -> StoreResult<()> {
        let slot = self
            .assignments
            .get_mut(&assignment.id)
            .ok_or_else(|| missing("assignment", assignment.id))?;
        *slot = assignment.clone();
        Ok(())
    }

    fn delete_assignment(&mut self, id: AssignmentId) -> StoreResult<()> {
        self.assignments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("assignment", id))
    }

    fn date_override(&self, id: OverrideId) -> StoreResult<Option<DateOverride>> {
        Ok(self.overrides.get(&id).cloned())
    }

    fn overrides_in(&self, range: &DateRange) -> StoreResult<Vec<DateOverride>> {
        let mut out: Vec<DateOverride> = self
            .overrides
            .values()
            .filter(|o| range.contains(o.date))
            .cloned()
            .collect();
        out.sort_by_key(|o| (o.date, o.id));
        Ok(out)
    }

    fn insert_override(&mut self, date_override: DateOverride) -> StoreResult<()> {
        self.overrides.insert(date_override.id, date_override);
        Ok(())
    }

    fn delete_override(&mut self, id: OverrideId) -> StoreResult<()> {
        self.overrides
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("override", id))
    }

    fn transaction<T, F>(&mut self, f: F) -> SchedulingResult<T>
    where
        F: FnOnce(&mut Self) -> SchedulingResult<T>,
    {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulingError;
    use crate::models::{OverrideType, RoleType, SignupStatus, TimeWindow};
    use crate::validation::ValidationErrorKind;
    use chrono::{FixedOffset, NaiveDate};
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, d).unwrap()
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let mut store = InMemoryStore::new();
        let signup = Signup::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), RoleType::Verifier, SignupStatus::Pending);

        let result: SchedulingResult<()> = store.transaction(|tx| {
            tx.insert_signup(signup.clone())?;
            Err(SchedulingError::NotPermitted("abort".into()))
        });

        assert!(result.is_err());
        assert!(store.all_signups().is_empty());
    }

    #[test]
    fn test_transaction_commits_on_success() {
        let mut store = InMemoryStore::new();
        let signup = Signup::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), RoleType::Verifier, SignupStatus::Pending);
        let id = signup.id;

        store.transaction(|tx| Ok(tx.insert_signup(signup)?)).unwrap();
        assert!(store.signup(id).unwrap().is_some());
    }

    #[test]
    fn test_overrides_in_range() {
        let mut store = InMemoryStore::new();
        store
            .insert_override(DateOverride::new(Uuid::new_v4(), date(25), OverrideType::Closure, "Holiday"))
            .unwrap();
        store
            .insert_override(DateOverride::new(Uuid::new_v4(), date(31), OverrideType::SpecialEvent, "NYE"))
            .unwrap();

        let range = DateRange::week(date(23));
        let found = store.overrides_in(&range).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reason, "Holiday");
    }

    #[test]
    fn test_seeded_loads_valid_reference_data() {
        let zone = Zone::new(Uuid::new_v4(), "Durham-1").with_county("Durham");
        let w = TimeWindow::from_hours(date(23), 10, 14, FixedOffset::east_opt(0).unwrap()).unwrap();
        let shift = Shift::new(Uuid::new_v4(), zone.id, date(23), w);
        let shift_id = shift.id;

        let store = InMemoryStore::seeded(vec![zone], vec![shift]).unwrap();
        assert_eq!(store.zones().unwrap().len(), 1);
        assert!(store.shift(shift_id).unwrap().is_some());
    }

    #[test]
    fn test_seeded_rejects_bad_reference_data() {
        let zone = Zone::new(Uuid::new_v4(), " ");
        let w = TimeWindow::from_hours(date(23), 10, 14, FixedOffset::east_opt(0).unwrap()).unwrap();
        let orphan = Shift::new(Uuid::new_v4(), Uuid::new_v4(), date(23), w);

        let errors = InMemoryStore::seeded(vec![zone.clone(), zone], vec![orphan]).unwrap_err();
        let kinds: Vec<ValidationErrorKind> = errors.into_iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::DuplicateId));
        assert!(kinds.contains(&ValidationErrorKind::EmptyName));
        assert!(kinds.contains(&ValidationErrorKind::InvalidZoneReference));
    }

    #[test]
    fn test_update_missing_row() {
        let mut store = InMemoryStore::new();
        let signup = Signup::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), RoleType::Verifier, SignupStatus::Pending);
        assert!(matches!(store.update_signup(&signup), Err(StoreError::MissingRow { .. })));
        assert!(store.delete_assignment(Uuid::new_v4()).is_err());
    }
}
