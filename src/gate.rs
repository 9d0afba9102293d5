//! Qualification gate.
//!
//! Answers whether a user may take a role. Pure and total; used to gate
//! every signup and assignment write, never to pick people.

use crate::error::SchedulingError;
use crate::models::{QualifiedRole, User};

/// True iff the user's qualified-role set contains `role`.
#[inline]
pub fn is_eligible(user: &User, role: QualifiedRole) -> bool {
    user.has_role(role)
}

/// [`is_eligible`] as a write-path check.
pub fn require(user: &User, role: QualifiedRole) -> Result<(), SchedulingError> {
    if is_eligible(user, role) {
        Ok(())
    } else {
        Err(SchedulingError::Unqualified {
            user_id: user.id,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_eligibility() {
        let u = User::new(Uuid::new_v4(), "Sam").with_role(QualifiedRole::Dispatcher);
        assert!(is_eligible(&u, QualifiedRole::Dispatcher));
        assert!(!is_eligible(&u, QualifiedRole::RegionalLead));
    }

    #[test]
    fn test_require_reports_role() {
        let u = User::new(Uuid::new_v4(), "Sam");
        let err = require(&u, QualifiedRole::ZoneLead).unwrap_err();
        assert_eq!(
            err,
            SchedulingError::Unqualified {
                user_id: u.id,
                role: QualifiedRole::ZoneLead
            }
        );
    }
}
