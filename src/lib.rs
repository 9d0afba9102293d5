//! Volunteer coverage and assignment scheduling engine.
//!
//! Decides, for an organisation of zones grouped into counties, whether each
//! (zone, date, time block) cell is adequately staffed, and validates every
//! signup and dispatcher/regional-lead assignment write against role
//! qualification, slot uniqueness, capacity, time conflicts and date
//! closures.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Zone`, `TimeBlock`, `Shift`, `User`, `Signup`,
//!   `Assignment`, `DateOverride`, `TimeWindow`
//! - **`grid`**: Time grid builder (zone and scope cells)
//! - **`overrides`**: Closure and annotation resolution per cell
//! - **`gate`**: Qualification gate
//! - **`conflict`**: Same-user time overlap detection
//! - **`coverage`**: Per-cell and roll-up classification, gap descriptions, stats
//! - **`engine`**: Request/response facade (views, signups, assignments, overrides)
//! - **`store`**: Persistence seam and an in-memory reference store
//! - **`config`**: Organisation settings
//! - **`validation`**: Settings and reference-data integrity checks
//!
//! # Architecture
//!
//! The engine is stateless between calls. Durable state lives behind the
//! [`store::Store`] trait; each write is one read-validate-write
//! transaction, and views rebuild the grid on every request.

pub mod config;
pub mod conflict;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod gate;
pub mod grid;
pub mod models;
pub mod overrides;
pub mod store;
pub mod validation;

pub use config::OrgSettings;
pub use engine::{Actor, CoverageEngine};
pub use error::{ErrorKind, SchedulingError, SchedulingResult};
