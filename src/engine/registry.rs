//! Assignment registry.
//!
//! Create, update, delete and promote dispatcher and regional-lead
//! assignments. Each operation is one store transaction.
//!
//! # Checks (in order)
//!
//! | Check | Error |
//! |-------|-------|
//! | Scope valid for the dispatcher mode | `ScopeMismatch`, `NotFound` (county) |
//! | Window starts on `date` | `InvalidWindow` |
//! | No region-wide closure on `date` | `DateClosed` |
//! | User holds the qualification | `NotFound`, `Unqualified` |
//! | Primary slot free (primaries only) | `SlotOccupied` |
//! | No overlapping commitment, backups included | `TimeConflict` |
//!
//! Backups are exempt from slot uniqueness but not from the time check.
//! Deleting a primary never promotes a backup; promotion is
//! [`CoverageEngine::set_dispatcher_primary`].
//!
//! [`CoverageEngine::bulk_assign_across_counties`] is deliberately not
//! atomic across counties: each county is its own transaction, counties the
//! user already holds are skipped, and failures are collected without
//! rolling back the counties already applied.

use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use super::{overrides_on, store_counties, CoverageEngine};
use crate::config::OrgSettings;
use crate::conflict::{find_conflict, user_commitments, CommitmentSource, Exemptions};
use crate::error::{SchedulingError, SchedulingResult};
use crate::gate;
use crate::models::{
    slot_label, Assignment, AssignmentId, AssignmentKind, DateRange, DispatcherMode, Scope,
    TimeWindow, UserId,
};
use crate::store::Store;

/// Request to create an assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub user_id: UserId,
    /// `Region` or a county; regional leads always use `Region`.
    pub scope: Scope,
    /// Local calendar date the window starts on.
    pub date: NaiveDate,
    pub window: TimeWindow,
    pub is_backup: bool,
    pub notes: Option<String>,
}

impl NewAssignment {
    /// A primary assignment request.
    pub fn new(user_id: UserId, scope: Scope, date: NaiveDate, window: TimeWindow) -> Self {
        Self {
            user_id,
            scope,
            date,
            window,
            is_backup: false,
            notes: None,
        }
    }

    /// A primary region-wide request (regional dispatcher or regional lead).
    pub fn regional(user_id: UserId, date: NaiveDate, window: TimeWindow) -> Self {
        Self::new(user_id, Scope::Region, date, window)
    }

    /// Marks the request as a backup.
    pub fn as_backup(mut self) -> Self {
        self.is_backup = true;
        self
    }

    /// Attaches free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Fields to change on an existing assignment. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentPatch {
    pub user_id: Option<UserId>,
    pub is_backup: Option<bool>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

impl AssignmentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassigns to another user.
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Sets the backup flag.
    pub fn with_backup(mut self, is_backup: bool) -> Self {
        self.is_backup = Some(is_backup);
        self
    }

    /// Replaces or clears the notes.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }
}

/// A county the bulk path could not apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub county: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: SchedulingError,
}

fn serialize_error<S: serde::Serializer>(err: &SchedulingError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Result of [`CoverageEngine::bulk_assign_across_counties`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignOutcome {
    /// Assignments created, one per county.
    pub applied: Vec<Assignment>,
    /// Counties the user already held for this window.
    pub skipped: Vec<String>,
    /// Counties that failed validation; applied counties are kept.
    pub failed: Vec<BulkFailure>,
}

impl BulkAssignOutcome {
    /// No county failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<S: Store> CoverageEngine<S> {
    /// Creates a dispatcher assignment keyed by the organisation's dispatcher mode.
    pub fn create_dispatcher_assignment(&mut self, request: NewAssignment) -> SchedulingResult<Assignment> {
        let settings = &self.settings;
        self.store.transaction(|tx| {
            create_assignment(tx, settings, AssignmentKind::Dispatcher, request, &Exemptions::none())
        })
    }

    /// Updates a dispatcher assignment.
    pub fn update_dispatcher_assignment(&mut self, id: AssignmentId, patch: AssignmentPatch) -> SchedulingResult<Assignment> {
        self.store
            .transaction(|tx| update_assignment(tx, AssignmentKind::Dispatcher, id, patch))
    }

    /// Deletes a dispatcher assignment; backups are left as they are.
    pub fn delete_dispatcher_assignment(&mut self, id: AssignmentId) -> SchedulingResult<()> {
        self.store
            .transaction(|tx| delete_assignment(tx, AssignmentKind::Dispatcher, id))
    }

    /// Promotes a backup dispatcher assignment to primary.
    pub fn set_dispatcher_primary(&mut self, id: AssignmentId) -> SchedulingResult<Assignment> {
        self.store
            .transaction(|tx| set_primary(tx, AssignmentKind::Dispatcher, id))
    }

    /// Creates a region-wide regional-lead assignment.
    pub fn create_regional_lead_assignment(&mut self, request: NewAssignment) -> SchedulingResult<Assignment> {
        let settings = &self.settings;
        self.store.transaction(|tx| {
            create_assignment(tx, settings, AssignmentKind::RegionalLead, request, &Exemptions::none())
        })
    }

    /// Updates a regional-lead assignment.
    pub fn update_regional_lead_assignment(&mut self, id: AssignmentId, patch: AssignmentPatch) -> SchedulingResult<Assignment> {
        self.store
            .transaction(|tx| update_assignment(tx, AssignmentKind::RegionalLead, id, patch))
    }

    /// Deletes a regional-lead assignment.
    pub fn delete_regional_lead_assignment(&mut self, id: AssignmentId) -> SchedulingResult<()> {
        self.store
            .transaction(|tx| delete_assignment(tx, AssignmentKind::RegionalLead, id))
    }

    /// Promotes a backup regional-lead assignment to primary.
    pub fn set_regional_lead_primary(&mut self, id: AssignmentId) -> SchedulingResult<Assignment> {
        self.store
            .transaction(|tx| set_primary(tx, AssignmentKind::RegionalLead, id))
    }

    /// Assigns `user_id` as county dispatcher in every county at once.
    ///
    /// Only valid in county dispatcher mode. Each county is created in its
    /// own transaction. A county where the user already holds a dispatcher
    /// assignment overlapping `window` is skipped; other failures are
    /// collected in the outcome and do not undo earlier counties. The
    /// batch counts as one commitment, so its own assignments are exempt
    /// from the time-conflict check.
    pub fn bulk_assign_across_counties(
        &mut self,
        user_id: UserId,
        date: NaiveDate,
        window: TimeWindow,
        notes: Option<String>,
    ) -> SchedulingResult<BulkAssignOutcome> {
        let mode = self.settings.dispatcher_mode;
        if mode != DispatcherMode::County {
            return Err(SchedulingError::ScopeMismatch {
                kind: AssignmentKind::Dispatcher,
                scope: Scope::Region,
                mode,
            });
        }

        let all_counties = store_counties(&self.store)?;
        let mut held: Vec<(String, AssignmentId)> = Vec::new();
        for a in self.store.assignments_for_user(user_id)? {
            if let Scope::County(county) = &a.scope {
                if a.shares_slot(AssignmentKind::Dispatcher, &a.scope, date, &window) {
                    held.push((county.clone(), a.id));
                }
            }
        }
        // Held counties belong to the batch regardless of where they sort.
        let mut batch: Vec<CommitmentSource> = held
            .iter()
            .map(|(_, id)| CommitmentSource::Assignment(*id))
            .collect();

        let mut outcome = BulkAssignOutcome::default();
        for county in all_counties {
            if held.iter().any(|(c, _)| *c == county) {
                outcome.skipped.push(county);
                continue;
            }

            let mut request = NewAssignment::new(user_id, Scope::County(county.clone()), date, window);
            request.notes = notes.clone();
            let exempt = Exemptions::none().with_sources(batch.iter().copied());
            let settings = &self.settings;
            let result = self.store.transaction(|tx| {
                create_assignment(tx, settings, AssignmentKind::Dispatcher, request, &exempt)
            });
            match result {
                Ok(assignment) => {
                    batch.push(CommitmentSource::Assignment(assignment.id));
                    outcome.applied.push(assignment);
                }
                Err(error) => {
                    warn!("bulk assign: {county} failed for user {user_id}: {error}");
                    outcome.failed.push(BulkFailure { county, error });
                }
            }
        }

        info!(
            "bulk assign for user {user_id} on {date}: {} applied, {} skipped, {} failed",
            outcome.applied.len(),
            outcome.skipped.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }
}

fn entity_name(kind: AssignmentKind) -> &'static str {
    match kind {
        AssignmentKind::Dispatcher => "dispatcher assignment",
        AssignmentKind::RegionalLead => "regional lead assignment",
    }
}

fn load<S: Store>(store: &S, kind: AssignmentKind, id: AssignmentId) -> SchedulingResult<Assignment> {
    store
        .assignment(id)?
        .filter(|a| a.kind == kind)
        .ok_or_else(|| SchedulingError::not_found(entity_name(kind), id))
}

/// Rejects scopes that do not key this kind of assignment under `settings`.
fn check_scope<S: Store>(store: &S, settings: &OrgSettings, kind: AssignmentKind, scope: &Scope) -> SchedulingResult<()> {
    let mode = settings.dispatcher_mode;
    let mismatch = || SchedulingError::ScopeMismatch {
        kind,
        scope: scope.clone(),
        mode,
    };
    match kind {
        AssignmentKind::RegionalLead if *scope == Scope::Region => Ok(()),
        AssignmentKind::RegionalLead => Err(mismatch()),
        AssignmentKind::Dispatcher => {
            let counties = store_counties(store)?;
            if mode.dispatcher_scopes(&counties).contains(scope) {
                return Ok(());
            }
            match (mode, scope) {
                (DispatcherMode::County, Scope::County(name)) => Err(SchedulingError::not_found("county", name)),
                _ => Err(mismatch()),
            }
        }
    }
}

fn check_date(settings: &OrgSettings, date: NaiveDate, window: &TimeWindow) -> SchedulingResult<()> {
    let local = window.start.with_timezone(&settings.timezone()).date_naive();
    if local != date {
        return Err(SchedulingError::InvalidWindow(format!(
            "window starting {local} does not fall on {date}"
        )));
    }
    Ok(())
}

fn check_not_closed<S: Store>(store: &S, date: NaiveDate) -> SchedulingResult<()> {
    match overrides_on(store, date)?.region_closure(date) {
        Some(closure) => Err(SchedulingError::DateClosed {
            date,
            reason: closure.reason.clone(),
        }),
        None => Ok(()),
    }
}

fn check_qualified<S: Store>(store: &S, kind: AssignmentKind, user_id: UserId) -> SchedulingResult<()> {
    let user = store
        .user(user_id)?
        .ok_or_else(|| SchedulingError::not_found("user", user_id))?;
    gate::require(&user, kind.required_qualification())
}

/// Fails if another primary of `kind` overlaps the window in the same scope and date.
fn check_primary_slot<S: Store>(
    store: &S,
    kind: AssignmentKind,
    scope: &Scope,
    date: NaiveDate,
    window: &TimeWindow,
    except: Option<AssignmentId>,
) -> SchedulingResult<()> {
    let taken = store
        .assignments_in(&DateRange::single(date))?
        .into_iter()
        .any(|a| !a.is_backup && Some(a.id) != except && a.shares_slot(kind, scope, date, window));
    if taken {
        return Err(SchedulingError::SlotOccupied {
            slot: slot_label(kind, scope, date, window),
        });
    }
    Ok(())
}

fn check_conflict<S: Store>(
    store: &S,
    user_id: UserId,
    date: NaiveDate,
    window: &TimeWindow,
    exempt: &Exemptions,
) -> SchedulingResult<()> {
    let commitments = user_commitments(store, user_id, exempt)?;
    match find_conflict(date, window, &commitments) {
        Some(existing) => Err(SchedulingError::TimeConflict {
            user_id,
            conflicting: existing.source,
        }),
        None => Ok(()),
    }
}

fn create_assignment<S: Store>(
    tx: &mut S,
    settings: &OrgSettings,
    kind: AssignmentKind,
    request: NewAssignment,
    exempt: &Exemptions,
) -> SchedulingResult<Assignment> {
    check_scope(tx, settings, kind, &request.scope)?;
    check_date(settings, request.date, &request.window)?;
    check_not_closed(tx, request.date)?;
    check_qualified(tx, kind, request.user_id)?;
    if !request.is_backup {
        check_primary_slot(tx, kind, &request.scope, request.date, &request.window, None)?;
    }
    check_conflict(tx, request.user_id, request.date, &request.window, exempt)?;

    let assignment = Assignment {
        id: Uuid::new_v4(),
        kind,
        user_id: request.user_id,
        scope: request.scope,
        date: request.date,
        window: request.window,
        is_backup: request.is_backup,
        notes: request.notes,
    };
    tx.insert_assignment(assignment.clone())?;
    info!(
        "created {} {} for user {}{}",
        entity_name(kind),
        assignment.slot_label(),
        assignment.user_id,
        if assignment.is_backup { " (backup)" } else { "" }
    );
    Ok(assignment)
}

fn update_assignment<S: Store>(
    tx: &mut S,
    kind: AssignmentKind,
    id: AssignmentId,
    patch: AssignmentPatch,
) -> SchedulingResult<Assignment> {
    let current = load(tx, kind, id)?;
    let mut updated = current.clone();

    if let Some(user_id) = patch.user_id.filter(|u| *u != current.user_id) {
        check_qualified(tx, kind, user_id)?;
        let exempt = Exemptions::none().with_source(CommitmentSource::Assignment(id));
        check_conflict(tx, user_id, current.date, &current.window, &exempt)?;
        updated.user_id = user_id;
    }
    if let Some(is_backup) = patch.is_backup {
        if current.is_backup && !is_backup {
            check_primary_slot(tx, kind, &current.scope, current.date, &current.window, Some(id))?;
        }
        updated.is_backup = is_backup;
    }
    if let Some(notes) = patch.notes {
        updated.notes = notes;
    }

    tx.update_assignment(&updated)?;
    info!("updated {} {}", entity_name(kind), updated.slot_label());
    Ok(updated)
}

fn delete_assignment<S: Store>(tx: &mut S, kind: AssignmentKind, id: AssignmentId) -> SchedulingResult<()> {
    let current = load(tx, kind, id)?;
    tx.delete_assignment(id)?;
    info!("deleted {} {}", entity_name(kind), current.slot_label());
    Ok(())
}

fn set_primary<S: Store>(tx: &mut S, kind: AssignmentKind, id: AssignmentId) -> SchedulingResult<Assignment> {
    let mut assignment = load(tx, kind, id)?;
    if !assignment.is_backup {
        return Ok(assignment);
    }
    check_primary_slot(tx, kind, &assignment.scope, assignment.date, &assignment.window, Some(id))?;
    assignment.is_backup = false;
    tx.update_assignment(&assignment)?;
    info!("promoted {} {} to primary", entity_name(kind), assignment.slot_label());
    Ok(assignment)
}
