//! Persistence seam.
//!
//! The engine owns no durable state. It reads entities from, and writes
//! signups, assignments and overrides to, a relational store behind the
//! [`Store`] trait. Each engine write runs inside [`Store::transaction`],
//! so the read-validate-write sequence is isolated against concurrent
//! writers; the store's locking is the authority for that.

mod memory;

pub use memory::InMemoryStore;

use thiserror::Error;

use crate::error::SchedulingResult;
use crate::models::{
    Assignment, AssignmentId, DateOverride, DateRange, OverrideId, Shift, ShiftId, Signup,
    SignupId, User, UserId, Zone, ZoneId,
};

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not complete the request.
    #[error("store backend failure: {0}")]
    Backend(String),
    /// A write targeted a row that does not exist.
    #[error("{entity} {id} missing from store")]
    MissingRow { entity: &'static str, id: String },
}

/// Store operation result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Create/read/update/delete access to scheduling entities.
pub trait Store {
    fn user(&self, id: UserId) -> StoreResult<Option<User>>;
    fn zones(&self) -> StoreResult<Vec<Zone>>;
    fn zone(&self, id: ZoneId) -> StoreResult<Option<Zone>>;

    fn shift(&self, id: ShiftId) -> StoreResult<Option<Shift>>;
    /// Shifts whose date falls in `range`, in any status.
    fn shifts_in(&self, range: &DateRange) -> StoreResult<Vec<Shift>>;

    fn signup(&self, id: SignupId) -> StoreResult<Option<Signup>>;
    /// All signups for a shift, in any status.
    fn signups_for_shift(&self, shift_id: ShiftId) -> StoreResult<Vec<Signup>>;
    /// All signups a user holds, in any status.
    fn signups_for_user(&self, user_id: UserId) -> StoreResult<Vec<Signup>>;
    fn insert_signup(&mut self, signup: Signup) -> StoreResult<()>;
    fn update_signup(&mut self, signup: &Signup) -> StoreResult<()>;

    fn assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>>;
    fn assignments_for_user(&self, user_id: UserId) -> StoreResult<Vec<Assignment>>;
    /// Assignments of both kinds whose date falls in `range`.
    fn assignments_in(&self, range: &DateRange) -> StoreResult<Vec<Assignment>>;
    fn insert_assignment(&mut self, assignment: Assignment) -> StoreResult<()>;
    fn update_assignment(&mut self, assignment: &Assignment) -> StoreResult<()>;
    fn delete_assignment(&mut self, id: AssignmentId) -> StoreResult<()>;

    fn date_override(&self, id: OverrideId) -> StoreResult<Option<DateOverride>>;
    fn overrides_in(&self, range: &DateRange) -> StoreResult<Vec<DateOverride>>;
    fn insert_override(&mut self, date_override: DateOverride) -> StoreResult<()>;
    fn delete_override(&mut self, id: OverrideId) -> StoreResult<()>;

    /// Runs `f` as one atomic read-modify-write unit.
    ///
    /// Writes made by `f` must not be visible if it returns `Err`.
    /// Stores without rollback support rely on the engine performing all
    /// validation before the first write.
    fn transaction<T, F>(&mut self, f: F) -> SchedulingResult<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> SchedulingResult<T>,
    {
        f(self)
    }
}
