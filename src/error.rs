//! Error types surfaced by the scheduling engine.
//!
//! Every write operation returns [`SchedulingError`] synchronously. None of
//! these are retried by the engine; the caller decides whether to surface
//! or retry.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::conflict::CommitmentSource;
use crate::models::{AssignmentKind, DispatcherMode, QualifiedRole, Scope, ShiftStatus, SignupStatus};
use crate::store::StoreError;

/// Engine operation result.
pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// A rejected engine operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulingError {
    /// The user does not hold the qualification the role requires.
    #[error("user {user_id} is not qualified as {role}")]
    Unqualified { user_id: Uuid, role: QualifiedRole },

    /// A primary assignment or role-exclusive signup already holds the slot.
    #[error("slot already occupied: {slot}")]
    SlotOccupied { slot: String },

    /// The shift's verifier slots are full.
    #[error("shift {shift_id} is full ({max} volunteers)")]
    CapacityExceeded { shift_id: Uuid, max: u32 },

    /// The user already holds an overlapping commitment.
    #[error("user {user_id} has an overlapping commitment ({conflicting})")]
    TimeConflict {
        user_id: Uuid,
        conflicting: CommitmentSource,
    },

    /// The user already holds an active signup for this shift.
    #[error("user {user_id} already signed up for shift {shift_id}")]
    DuplicateSignup { user_id: Uuid, shift_id: Uuid },

    /// Operating on a missing entity.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The signup state machine rejects the status change.
    #[error("cannot move signup from {from} to {to}")]
    InvalidTransition { from: SignupStatus, to: SignupStatus },

    /// The date is closed by an override.
    #[error("{date} is closed: {reason}")]
    DateClosed { date: NaiveDate, reason: String },

    /// The actor may not perform this change.
    #[error("not permitted: {0}")]
    NotPermitted(String),

    /// Malformed time window or date range.
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Signups are only accepted on published shifts.
    #[error("shift {shift_id} is {status}, not open for signups")]
    ShiftNotOpen { shift_id: Uuid, status: ShiftStatus },

    /// The assignment scope does not fit the organisation's dispatcher mode.
    #[error("{kind} scope {scope} is not valid in {mode} mode")]
    ScopeMismatch {
        kind: AssignmentKind,
        scope: Scope,
        mode: DispatcherMode,
    },

    /// The persistence collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fieldless error category, for mapping onto transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unqualified,
    SlotOccupied,
    CapacityExceeded,
    TimeConflict,
    DuplicateSignup,
    NotFound,
    InvalidTransition,
    DateClosed,
    NotPermitted,
    InvalidWindow,
    ShiftNotOpen,
    ScopeMismatch,
    Store,
}

impl SchedulingError {
    /// Shorthand for [`SchedulingError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unqualified { .. } => ErrorKind::Unqualified,
            Self::SlotOccupied { .. } => ErrorKind::SlotOccupied,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::TimeConflict { .. } => ErrorKind::TimeConflict,
            Self::DuplicateSignup { .. } => ErrorKind::DuplicateSignup,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::DateClosed { .. } => ErrorKind::DateClosed,
            Self::NotPermitted(_) => ErrorKind::NotPermitted,
            Self::InvalidWindow(_) => ErrorKind::InvalidWindow,
            Self::ShiftNotOpen { .. } => ErrorKind::ShiftNotOpen,
            Self::ScopeMismatch { .. } => ErrorKind::ScopeMismatch,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}
