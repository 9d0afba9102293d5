//! People and their qualifications.
//!
//! A user holds zero or more [`QualifiedRole`]s. Qualifications grant
//! eligibility only; they carry no scheduling state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::UserId;

/// A named capability a user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualifiedRole {
    /// May dispatch (zone signup or county/regional assignment).
    Dispatcher,
    /// May lead a zone's shift.
    ZoneLead,
    /// May verify in the field.
    Verifier,
    /// May hold a regional-lead assignment.
    RegionalLead,
}

impl fmt::Display for QualifiedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dispatcher => "DISPATCHER",
            Self::ZoneLead => "ZONE_LEAD",
            Self::Verifier => "VERIFIER",
            Self::RegionalLead => "REGIONAL_LEAD",
        })
    }
}

/// The role a signup claims within a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleType {
    Dispatcher,
    ZoneLead,
    Verifier,
}

impl RoleType {
    /// Qualification needed to sign up in this role.
    pub fn required_qualification(self) -> QualifiedRole {
        match self {
            Self::Dispatcher => QualifiedRole::Dispatcher,
            Self::ZoneLead => QualifiedRole::ZoneLead,
            Self::Verifier => QualifiedRole::Verifier,
        }
    }

    /// Whether at most one active holder per shift is allowed.
    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::Dispatcher | Self::ZoneLead)
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.required_qualification().fmt(f)
    }
}

/// A volunteer or coordinator known to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Qualifications held.
    pub qualified_roles: BTreeSet<QualifiedRole>,
}

impl User {
    /// Creates a user with no qualifications.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            qualified_roles: BTreeSet::new(),
        }
    }

    /// Grants a qualification.
    pub fn with_role(mut self, role: QualifiedRole) -> Self {
        self.qualified_roles.insert(role);
        self
    }

    /// Whether the user holds `role`.
    pub fn has_role(&self, role: QualifiedRole) -> bool {
        self.qualified_roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_user_builder() {
        let u = User::new(Uuid::new_v4(), "Ana")
            .with_role(QualifiedRole::Verifier)
            .with_role(QualifiedRole::ZoneLead)
            .with_role(QualifiedRole::Verifier);

        assert_eq!(u.qualified_roles.len(), 2);
        assert!(u.has_role(QualifiedRole::ZoneLead));
        assert!(!u.has_role(QualifiedRole::Dispatcher));
    }

    #[test]
    fn test_role_type_mapping() {
        assert_eq!(RoleType::ZoneLead.required_qualification(), QualifiedRole::ZoneLead);
        assert!(RoleType::Dispatcher.is_exclusive());
        assert!(!RoleType::Verifier.is_exclusive());
    }

    #[test]
    fn test_role_wire_names() {
        let json = serde_json::to_string(&QualifiedRole::RegionalLead).unwrap();
        assert_eq!(json, "\"REGIONAL_LEAD\"");
        let r: RoleType = serde_json::from_str("\"ZONE_LEAD\"").unwrap();
        assert_eq!(r, RoleType::ZoneLead);
        assert_eq!(RoleType::Verifier.to_string(), "VERIFIER");
    }
}
