//! Scheduling domain models.
//!
//! Core data types for the coverage engine: the places being staffed,
//! the people staffing them, and the claims people make on time.
//!
//! # Domain Mappings
//!
//! | Type | Meaning |
//! |------|---------|
//! | `Zone` | Geographic operational area |
//! | `TimeBlock` | Recurring daily window (configuration) |
//! | `Shift` | Concrete staffed window in one zone |
//! | `Signup` | Volunteer's claim on a role within a shift |
//! | `Assignment` | Dispatcher/regional lead claim on a scope |
//! | `DateOverride` | Closure or annotation for a date |

mod assignment;
mod date_override;
mod shift;
mod signup;
pub mod time_block;
mod user;
mod window;
mod zone;

use uuid::Uuid;

pub use assignment::{slot_label, Assignment, AssignmentKind, DispatcherMode, Scope};
pub use date_override::{DateOverride, OverrideType};
pub use shift::{Capacity, MeetingInfo, Shift, ShiftStatus};
pub use signup::{Signup, SignupStatus};
pub use time_block::TimeBlock;
pub use user::{QualifiedRole, RoleType, User};
pub use window::{DateRange, TimeWindow};
pub use zone::{counties, Zone, UNASSIGNED_COUNTY};

pub type UserId = Uuid;
pub type ZoneId = Uuid;
pub type ShiftId = Uuid;
pub type SignupId = Uuid;
pub type AssignmentId = Uuid;
pub type OverrideId = Uuid;
