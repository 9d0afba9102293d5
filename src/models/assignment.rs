//! Dispatcher and regional-lead assignments.
//!
//! An assignment is a person's claim on a scope over a time window,
//! distinct from a shift signup. Each (kind, scope, date, window) has at
//! most one primary; backups are unlimited but still occupy the person's
//! time.
//!
//! # Dispatcher Modes
//!
//! | Mode | Dispatcher scope |
//! |------|------------------|
//! | `Regional` | one region-wide scope |
//! | `County` | one scope per county |
//! | `Zone` | none (dispatchers sign up to zone shifts) |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AssignmentId, QualifiedRole, TimeWindow, UserId};

/// Organisation-level dispatcher scheduling mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatcherMode {
    Regional,
    #[default]
    County,
    Zone,
}

impl DispatcherMode {
    /// Scope keys dispatcher assignments are made against.
    ///
    /// This is the only place the mode decides the grid dimension.
    pub fn dispatcher_scopes(self, counties: &[String]) -> Vec<Scope> {
        match self {
            Self::Regional => vec![Scope::Region],
            Self::County => counties.iter().cloned().map(Scope::County).collect(),
            Self::Zone => Vec::new(),
        }
    }

    /// Whether zone cells require a dispatcher signup.
    pub fn dispatches_per_zone(self) -> bool {
        matches!(self, Self::Zone)
    }
}

impl fmt::Display for DispatcherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Regional => "REGIONAL",
            Self::County => "COUNTY",
            Self::Zone => "ZONE",
        })
    }
}

/// What an assignment covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    /// The whole region ("ALL").
    Region,
    /// A single county.
    County(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region => f.write_str("ALL"),
            Self::County(name) => f.write_str(name),
        }
    }
}

/// Assignment kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentKind {
    Dispatcher,
    RegionalLead,
}

impl AssignmentKind {
    /// Qualification the assignee must hold.
    pub fn required_qualification(self) -> QualifiedRole {
        match self {
            Self::Dispatcher => QualifiedRole::Dispatcher,
            Self::RegionalLead => QualifiedRole::RegionalLead,
        }
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.required_qualification().fmt(f)
    }
}

/// A person's claim on a scope and window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Unique assignment identifier.
    pub id: AssignmentId,
    /// Dispatcher or regional lead.
    pub kind: AssignmentKind,
    /// Assignee.
    pub user_id: UserId,
    /// Covered scope. Always `Region` for regional leads.
    pub scope: Scope,
    /// Local calendar date.
    pub date: NaiveDate,
    /// Concrete time window.
    pub window: TimeWindow,
    /// Backups never block other assignments from the slot.
    pub is_backup: bool,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl Assignment {
    /// Whether this assignment sits in the given slot.
    ///
    /// Same kind, scope and date with overlapping windows.
    pub fn shares_slot(&self, kind: AssignmentKind, scope: &Scope, date: NaiveDate, window: &TimeWindow) -> bool {
        self.kind == kind && &self.scope == scope && self.date == date && self.window.overlaps(window)
    }

    /// Human-readable slot key.
    pub fn slot_label(&self) -> String {
        slot_label(self.kind, &self.scope, self.date, &self.window)
    }
}

/// Human-readable (kind, scope, date, window) key.
pub fn slot_label(kind: AssignmentKind, scope: &Scope, date: NaiveDate, window: &TimeWindow) -> String {
    format!(
        "{kind} {scope} {date} {}-{}",
        window.start.format("%H:%M"),
        window.end.format("%H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_scopes_per_mode() {
        let counties = vec!["Durham".to_string(), "Wake".to_string()];
        assert_eq!(DispatcherMode::Regional.dispatcher_scopes(&counties), vec![Scope::Region]);
        assert_eq!(
            DispatcherMode::County.dispatcher_scopes(&counties),
            vec![Scope::County("Durham".into()), Scope::County("Wake".into())]
        );
        assert!(DispatcherMode::Zone.dispatcher_scopes(&counties).is_empty());
    }

    #[test]
    fn test_dispatches_per_zone() {
        assert!(DispatcherMode::Zone.dispatches_per_zone());
        assert!(!DispatcherMode::County.dispatches_per_zone());
        assert!(!DispatcherMode::Regional.dispatches_per_zone());
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::Region.to_string(), "ALL");
        assert_eq!(Scope::County("Wake".into()).to_string(), "Wake");
        assert_eq!(AssignmentKind::RegionalLead.to_string(), "REGIONAL_LEAD");
    }

    #[test]
    fn test_mode_wire_names() {
        let m: DispatcherMode = serde_json::from_str("\"REGIONAL\"").unwrap();
        assert_eq!(m, DispatcherMode::Regional);
        assert_eq!(DispatcherMode::default(), DispatcherMode::County);
    }
}
