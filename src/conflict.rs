//! Conflict validator.
//!
//! Decides whether a candidate commitment overlaps one the user already
//! holds. Two windows conflict iff they are on the same date and
//! `candidate.start < existing.end && existing.start < candidate.end`;
//! touching windows do not conflict.
//!
//! A user's commitments are their active (pending or confirmed) shift
//! signups plus every dispatcher and regional-lead assignment they hold,
//! backups included: a person cannot be primary and backup, or backup in
//! two places, at overlapping times.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::SchedulingResult;
use crate::models::{AssignmentId, SignupId, TimeWindow, UserId};
use crate::store::Store;

/// Where a commitment comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitmentSource {
    Signup(SignupId),
    Assignment(AssignmentId),
}

impl fmt::Display for CommitmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signup(id) => write!(f, "signup {id}"),
            Self::Assignment(id) => write!(f, "assignment {id}"),
        }
    }
}

/// A dated time window a user is committed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    pub source: CommitmentSource,
    pub date: NaiveDate,
    pub window: TimeWindow,
}

impl Commitment {
    /// Creates a commitment.
    pub fn new(source: CommitmentSource, date: NaiveDate, window: TimeWindow) -> Self {
        Self { source, date, window }
    }

    /// Same date and overlapping half-open windows.
    #[inline]
    pub fn conflicts_with(&self, date: NaiveDate, window: &TimeWindow) -> bool {
        self.date == date && self.window.overlaps(window)
    }
}

/// Whether the candidate overlaps any existing commitment.
pub fn has_conflict(date: NaiveDate, candidate: &TimeWindow, existing: &[Commitment]) -> bool {
    find_conflict(date, candidate, existing).is_some()
}

/// The first existing commitment the candidate overlaps.
pub fn find_conflict<'a>(date: NaiveDate, candidate: &TimeWindow, existing: &'a [Commitment]) -> Option<&'a Commitment> {
    existing.iter().find(|c| c.conflicts_with(date, candidate))
}

/// Commitments to leave out of a user's set.
///
/// Used when re-validating a record against everything except itself, and
/// by the bulk county path, whose batch is one logical commitment.
#[derive(Debug, Clone, Default)]
pub struct Exemptions {
    sources: HashSet<CommitmentSource>,
}

impl Exemptions {
    /// No exemptions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Exempts one source.
    pub fn with_source(mut self, source: CommitmentSource) -> Self {
        self.sources.insert(source);
        self
    }

    /// Exempts several sources.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = CommitmentSource>) -> Self {
        self.sources.extend(sources);
        self
    }

    fn exempts(&self, source: CommitmentSource) -> bool {
        self.sources.contains(&source)
    }
}

/// Collects a user's live commitments from the store.
///
/// Signups contribute their shift's window only while active; missing
/// shifts are skipped.
pub fn user_commitments<S: Store>(store: &S, user_id: UserId, exempt: &Exemptions) -> SchedulingResult<Vec<Commitment>> {
    let mut out = Vec::new();

    for signup in store.signups_for_user(user_id)? {
        let source = CommitmentSource::Signup(signup.id);
        if !signup.is_active() || exempt.exempts(source) {
            continue;
        }
        if let Some(shift) = store.shift(signup.shift_id)? {
            out.push(Commitment::new(source, shift.date, shift.window));
        }
    }

    for assignment in store.assignments_for_user(user_id)? {
        let source = CommitmentSource::Assignment(assignment.id);
        if exempt.exempts(source) {
            continue;
        }
        out.push(Commitment::new(source, assignment.date, assignment.window));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoleType, Shift, Signup, SignupStatus};
    use crate::store::InMemoryStore;
    use chrono::FixedOffset;
    use uuid::Uuid;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn window(date: NaiveDate, h0: u8, h1: u8) -> TimeWindow {
        TimeWindow::from_hours(date, h0, h1, FixedOffset::east_opt(0).unwrap()).unwrap()
    }

    fn commitment(date: NaiveDate, h0: u8, h1: u8) -> Commitment {
        Commitment::new(CommitmentSource::Signup(Uuid::new_v4()), date, window(date, h0, h1))
    }

    #[test]
    fn test_overlap_conflicts() {
        let existing = vec![commitment(monday(), 9, 13)];
        assert!(has_conflict(monday(), &window(monday(), 11, 15), &existing));
        assert!(has_conflict(monday(), &window(monday(), 10, 11), &existing));
    }

    #[test]
    fn test_touching_windows_do_not_conflict() {
        let existing = vec![commitment(monday(), 10, 12)];
        assert!(!has_conflict(monday(), &window(monday(), 12, 14), &existing));
        assert!(!has_conflict(monday(), &window(monday(), 8, 10), &existing));
    }

    #[test]
    fn test_different_date_does_not_conflict() {
        let tuesday = monday().succ_opt().unwrap();
        let existing = vec![commitment(monday(), 9, 13)];
        assert!(!has_conflict(tuesday, &window(tuesday, 9, 13), &existing));
    }

    #[test]
    fn test_find_conflict_returns_source() {
        let a = commitment(monday(), 6, 10);
        let b = commitment(monday(), 14, 18);
        let existing = vec![a.clone(), b.clone()];
        let found = find_conflict(monday(), &window(monday(), 15, 16), &existing).unwrap();
        assert_eq!(found.source, b.source);
    }

    #[test]
    fn test_user_commitments_skip_inactive_and_exempt() {
        let mut store = InMemoryStore::new();
        let user = Uuid::new_v4();
        let shift = Shift::new(Uuid::new_v4(), Uuid::new_v4(), monday(), window(monday(), 9, 13));
        let shift_id = shift.id;
        store.insert_shift(shift);

        let active = Signup::new(Uuid::new_v4(), user, shift_id, RoleType::Verifier, SignupStatus::Confirmed);
        let declined = Signup::new(Uuid::new_v4(), user, shift_id, RoleType::ZoneLead, SignupStatus::Declined);
        let no_show = Signup::new(Uuid::new_v4(), user, shift_id, RoleType::Dispatcher, SignupStatus::NoShow);
        let active_id = active.id;
        store.insert_signup(active).unwrap();
        store.insert_signup(declined).unwrap();
        store.insert_signup(no_show).unwrap();

        let all = user_commitments(&store, user, &Exemptions::none()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source, CommitmentSource::Signup(active_id));

        let exempt = Exemptions::none().with_source(CommitmentSource::Signup(active_id));
        assert!(user_commitments(&store, user, &exempt).unwrap().is_empty());
    }
}
