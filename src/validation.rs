//! Input validation for scheduling configuration and reference data.
//!
//! Checks structural integrity before the engine uses it. Detects:
//! - Malformed or overlapping time blocks
//! - Out-of-range timezone offsets
//! - Duplicate IDs and empty names
//! - Shifts referencing unknown zones
//! - Inconsistent capacity triples

use crate::config::OrgSettings;
use crate::models::{Shift, Zone};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A block's hours are out of range or inverted.
    InvalidTimeBlock,
    /// Blocks are out of order or overlap.
    OverlappingTimeBlocks,
    /// A label or name is blank.
    EmptyName,
    /// UTC offset outside ±24h.
    InvalidOffset,
    /// A shift references a zone that doesn't exist.
    InvalidZoneReference,
    /// Capacity triple is not min <= ideal <= max.
    InvalidCapacity,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates organisation settings.
///
/// Checks:
/// 1. At least one time block
/// 2. Every block has 0 <= start < end <= 24
/// 3. Blocks are ordered and do not overlap
/// 4. Block labels are non-empty
/// 5. The UTC offset is a valid fixed offset
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_settings(settings: &OrgSettings) -> ValidationResult {
    let mut errors = Vec::new();

    if settings.time_blocks.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTimeBlock,
            "At least one time block is required",
        ));
    }

    for (i, block) in settings.time_blocks.iter().enumerate() {
        if block.start_hour >= block.end_hour || block.end_hour > 24 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeBlock,
                format!(
                    "Time block {i} has invalid hours {}-{}",
                    block.start_hour, block.end_hour
                ),
            ));
        }
        if block.label.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                format!("Time block {i} has an empty label"),
            ));
        }
    }

    // Ordered, non-overlapping tiling
    for (i, pair) in settings.time_blocks.windows(2).enumerate() {
        if pair[1].start_hour < pair[0].end_hour {
            errors.push(ValidationError::new(
                ValidationErrorKind::OverlappingTimeBlocks,
                format!(
                    "Time block {} ({}) starts before block {} ({}) ends",
                    i + 1,
                    pair[1].label,
                    i,
                    pair[0].label
                ),
            ));
        }
    }

    if settings.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidOffset,
            format!("UTC offset {} minutes is out of range", settings.utc_offset_minutes),
        ));
    }

    finish(errors)
}

/// Validates zone reference data: unique IDs and non-empty names.
pub fn validate_zones(zones: &[Zone]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for zone in zones {
        if !ids.insert(zone.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate zone ID: {}", zone.id),
            ));
        }
        if zone.name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                format!("Zone {} has an empty name", zone.id),
            ));
        }
    }

    finish(errors)
}

/// Validates shifts against the known zones.
///
/// Checks unique shift IDs, zone references and capacity ordering.
pub fn validate_shifts(shifts: &[Shift], zones: &[Zone]) -> ValidationResult {
    let mut errors = Vec::new();
    let zone_ids: HashSet<_> = zones.iter().map(|z| z.id).collect();
    let mut ids = HashSet::new();

    for shift in shifts {
        if !ids.insert(shift.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate shift ID: {}", shift.id),
            ));
        }
        if !zone_ids.contains(&shift.zone_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidZoneReference,
                format!("Shift '{}' references unknown zone '{}'", shift.id, shift.zone_id),
            ));
        }
        let c = shift.capacity;
        if !(c.min <= c.ideal && c.ideal <= c.max) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!(
                    "Shift '{}' capacity {}/{}/{} is not min <= ideal <= max",
                    shift.id, c.min, c.ideal, c.max
                ),
            ));
        }
    }

    finish(errors)
}
