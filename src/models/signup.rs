//! Signup model and its state machine.
//!
//! A signup joins a user to a shift in one [`RoleType`]. Its status moves
//! through a fixed transition table:
//!
//! | From | To |
//! |------|----|
//! | `Pending` | `Confirmed`, `Declined` |
//! | `Confirmed` | `Declined`, `NoShow` |
//! | `Declined` | `Confirmed` |
//! | `NoShow` | (terminal) |
//!
//! Signups are never deleted; cancellation is a move to `Declined`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{RoleType, ShiftId, SignupId, UserId};
use crate::error::SchedulingError;

/// Signup status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignupStatus {
    Pending,
    Confirmed,
    Declined,
    NoShow,
}

impl SignupStatus {
    /// Pending and confirmed signups hold their slot and their time.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether the table allows `self -> to`.
    pub fn can_transition_to(self, to: SignupStatus) -> bool {
        use SignupStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed) | (Pending, Declined) | (Confirmed, Declined) | (Confirmed, NoShow) | (Declined, Confirmed)
        )
    }

    /// Checks `self -> to` against the table.
    pub fn check_transition(self, to: SignupStatus) -> Result<(), SchedulingError> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(SchedulingError::InvalidTransition { from: self, to })
        }
    }

    /// Initial status for a new signup.
    pub fn initial(auto_confirm: bool) -> Self {
        if auto_confirm {
            Self::Confirmed
        } else {
            Self::Pending
        }
    }
}

impl fmt::Display for SignupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Declined => "DECLINED",
            Self::NoShow => "NO_SHOW",
        })
    }
}

/// A user's claim on a role within a shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub id: SignupId,
    pub user_id: UserId,
    pub shift_id: ShiftId,
    pub role: RoleType,
    pub status: SignupStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Signup {
    /// Creates a signup stamped with the current time.
    pub fn new(id: SignupId, user_id: UserId, shift_id: ShiftId, role: RoleType, status: SignupStatus) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            shift_id,
            role,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this signup holds its slot.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignupStatus::*;

    #[test]
    fn test_transition_table() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Declined));
        assert!(!Pending.can_transition_to(NoShow));

        assert!(Confirmed.can_transition_to(Declined));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(!Confirmed.can_transition_to(Pending));

        assert!(Declined.can_transition_to(Confirmed));
        assert!(!Declined.can_transition_to(NoShow));
    }

    #[test]
    fn test_no_show_is_terminal() {
        for to in [Pending, Confirmed, Declined, NoShow] {
            assert!(NoShow.check_transition(to).is_err());
        }
    }

    #[test]
    fn test_same_state_rejected() {
        for s in [Pending, Confirmed, Declined, NoShow] {
            assert!(!s.can_transition_to(s));
        }
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(SignupStatus::initial(false), Pending);
        assert_eq!(SignupStatus::initial(true), Confirmed);
    }

    #[test]
    fn test_active_states() {
        assert!(Pending.is_active());
        assert!(Confirmed.is_active());
        assert!(!Declined.is_active());
        assert!(!NoShow.is_active());
    }
}
