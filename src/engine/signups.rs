//! Signup writes.
//!
//! Creation checks run in this order: shift exists, shift published, date
//! open for the zone, user qualified, no active signup by the same user,
//! role slot free, no overlapping commitment. Dispatcher and zone-lead
//! slots hold one active signup each; verifier slots are bounded by
//! `capacity.max`. The minimum never blocks a write.
//!
//! Re-confirming a declined signup re-runs the slot and conflict checks.

use chrono::Utc;
use log::info;
use uuid::Uuid;

use super::{overrides_on, Actor, CoverageEngine};
use crate::conflict::{find_conflict, user_commitments, CommitmentSource, Exemptions};
use crate::error::{SchedulingError, SchedulingResult};
use crate::gate;
use crate::models::{RoleType, Shift, ShiftId, Signup, SignupId, SignupStatus, UserId};
use crate::store::Store;

impl<S: Store> CoverageEngine<S> {
    /// Signs `user_id` up for a shift role.
    ///
    /// The new signup starts `Confirmed` when the organisation auto-confirms
    /// RSVPs, `Pending` otherwise.
    pub fn create_signup(&mut self, user_id: UserId, shift_id: ShiftId, role: RoleType) -> SchedulingResult<Signup> {
        let status = SignupStatus::initial(self.settings.auto_confirm_rsvp);
        self.store.transaction(|tx| {
            let shift = load_shift(tx, shift_id)?;
            check_admissible(tx, &shift, user_id, role, None)?;

            let signup = Signup::new(Uuid::new_v4(), user_id, shift_id, role, status);
            tx.insert_signup(signup.clone())?;
            info!("user {user_id} signed up as {role} for shift {shift_id} ({status})");
            Ok(signup)
        })
    }

    /// Moves a signup to `to`.
    ///
    /// Coordinators may apply any transition the state machine allows.
    /// Volunteers may only decline their own signup.
    pub fn transition_signup(&mut self, id: SignupId, to: SignupStatus, actor: &Actor) -> SchedulingResult<Signup> {
        self.store.transaction(|tx| {
            let mut signup = tx
                .signup(id)?
                .ok_or_else(|| SchedulingError::not_found("signup", id))?;

            if !actor.is_coordinator() {
                if signup.user_id != actor.user_id {
                    return Err(SchedulingError::NotPermitted(format!(
                        "user {} may not change signup {id} held by {}",
                        actor.user_id, signup.user_id
                    )));
                }
                if to != SignupStatus::Declined {
                    return Err(SchedulingError::NotPermitted(format!(
                        "volunteers may only decline their own signups, not move them to {to}"
                    )));
                }
            }

            let from = signup.status;
            from.check_transition(to)?;
            if to.is_active() && !from.is_active() {
                let shift = load_shift(tx, signup.shift_id)?;
                check_admissible(tx, &shift, signup.user_id, signup.role, Some(id))?;
            }

            signup.status = to;
            signup.updated_at = Utc::now();
            tx.update_signup(&signup)?;
            info!("signup {id} moved from {from} to {to}");
            Ok(signup)
        })
    }

    /// Withdraws a signup. The row is kept as `Declined`.
    pub fn cancel_signup(&mut self, id: SignupId, actor: &Actor) -> SchedulingResult<Signup> {
        self.transition_signup(id, SignupStatus::Declined, actor)
    }
}

fn load_shift<S: Store>(store: &S, id: ShiftId) -> SchedulingResult<Shift> {
    store
        .shift(id)?
        .ok_or_else(|| SchedulingError::not_found("shift", id))
}

/// Whether `user_id` may hold an active `role` signup on `shift`.
///
/// `reviving` names a signup being re-activated; it is left out of the
/// duplicate, slot and conflict checks.
fn check_admissible<S: Store>(
    store: &S,
    shift: &Shift,
    user_id: UserId,
    role: RoleType,
    reviving: Option<SignupId>,
) -> SchedulingResult<()> {
    if !shift.is_open() {
        return Err(SchedulingError::ShiftNotOpen {
            shift_id: shift.id,
            status: shift.status,
        });
    }

    if let Some(closure) = overrides_on(store, shift.date)?.closure_for(shift.date, shift.zone_id) {
        return Err(SchedulingError::DateClosed {
            date: shift.date,
            reason: closure.reason.clone(),
        });
    }

    let user = store
        .user(user_id)?
        .ok_or_else(|| SchedulingError::not_found("user", user_id))?;
    gate::require(&user, role.required_qualification())?;

    let active: Vec<Signup> = store
        .signups_for_shift(shift.id)?
        .into_iter()
        .filter(|s| s.is_active() && Some(s.id) != reviving)
        .collect();

    if active.iter().any(|s| s.user_id == user_id) {
        return Err(SchedulingError::DuplicateSignup {
            user_id,
            shift_id: shift.id,
        });
    }

    let holders = active.iter().filter(|s| s.role == role).count() as u32;
    if role.is_exclusive() {
        if holders > 0 {
            return Err(SchedulingError::SlotOccupied {
                slot: format!("{role} on shift {}", shift.id),
            });
        }
    } else if shift.capacity.slots_remaining(holders) == 0 {
        return Err(SchedulingError::CapacityExceeded {
            shift_id: shift.id,
            max: shift.capacity.max,
        });
    }

    let exempt = match reviving {
        Some(id) => Exemptions::none().with_source(CommitmentSource::Signup(id)),
        None => Exemptions::none(),
    };
    let commitments = user_commitments(store, user_id, &exempt)?;
    if let Some(existing) = find_conflict(shift.date, &shift.window, &commitments) {
        return Err(SchedulingError::TimeConflict {
            user_id,
            conflicting: existing.source,
        });
    }
    Ok(())
}
