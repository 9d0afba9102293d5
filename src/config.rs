//! Organisation configuration.
//!
//! Read, never computed, by the engine: timezone, RSVP policy, dispatcher
//! mode and the day's time blocks. Loaded from JSON and validated before use.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{fs, io};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DispatcherMode, TimeBlock};
use crate::validation::{validate_settings, ValidationError};

/// Failure to load organisation settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {}", summarize(.0))]
    Invalid(Vec<ValidationError>),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; ")
}

/// Per-organisation scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrgSettings {
    /// Organisation identifier.
    pub org_id: Uuid,
    /// Fixed offset of the organisation's local time from UTC (minutes).
    pub utc_offset_minutes: i32,
    /// New signups start CONFIRMED instead of PENDING.
    pub auto_confirm_rsvp: bool,
    /// Which scope dispatcher assignments key against.
    pub dispatcher_mode: DispatcherMode,
    /// Ordered blocks tiling the day.
    pub time_blocks: Vec<TimeBlock>,
}

impl Default for OrgSettings {
    fn default() -> Self {
        Self {
            org_id: Uuid::nil(),
            utc_offset_minutes: 0,
            auto_confirm_rsvp: false,
            dispatcher_mode: DispatcherMode::default(),
            time_blocks: TimeBlock::default_blocks(),
        }
    }
}

impl OrgSettings {
    /// Parses and validates settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: OrgSettings = serde_json::from_str(json)?;
        validate_settings(&settings).map_err(ConfigError::Invalid)?;
        Ok(settings)
    }

    /// Reads, parses and validates a JSON settings file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Sets the dispatcher mode.
    pub fn with_dispatcher_mode(mut self, mode: DispatcherMode) -> Self {
        self.dispatcher_mode = mode;
        self
    }

    /// Enables or disables auto-confirm.
    pub fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm_rsvp = auto_confirm;
        self
    }

    /// Sets the UTC offset in minutes.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Replaces the time blocks.
    pub fn with_time_blocks(mut self, blocks: Vec<TimeBlock>) -> Self {
        self.time_blocks = blocks;
        self
    }

    /// The organisation's fixed timezone; UTC if the offset is out of range.
    pub fn timezone(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = OrgSettings::default();
        assert_eq!(s.time_blocks.len(), 4);
        assert_eq!(s.dispatcher_mode, DispatcherMode::County);
        assert!(!s.auto_confirm_rsvp);
        assert_eq!(s.timezone().local_minus_utc(), 0);
    }

    #[test]
    fn test_from_json_partial() {
        let s = OrgSettings::from_json_str(
            r#"{"utcOffsetMinutes": -300, "autoConfirmRsvp": true, "dispatcherMode": "ZONE"}"#,
        )
        .unwrap();
        assert_eq!(s.timezone().local_minus_utc(), -300 * 60);
        assert!(s.auto_confirm_rsvp);
        assert_eq!(s.dispatcher_mode, DispatcherMode::Zone);
        assert_eq!(s.time_blocks, TimeBlock::default_blocks());
    }

    #[test]
    fn test_from_json_invalid_blocks() {
        let err = OrgSettings::from_json_str(
            r#"{"timeBlocks": [{"startHour": 10, "endHour": 6, "label": "bad"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_json_extreme_offset_rejected() {
        let err = OrgSettings::from_json_str(r#"{"utcOffsetMinutes": -2147483648}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = OrgSettings::from_json_str(r#"{"utcOffsetMinutes": 2147483647}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_timezone_falls_back_to_utc() {
        for minutes in [i32::MIN, i32::MAX, 24 * 60] {
            let s = OrgSettings::default().with_utc_offset_minutes(minutes);
            assert_eq!(s.timezone().local_minus_utc(), 0);
        }
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(OrgSettings::from_json_str("{not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_missing_path() {
        let err = OrgSettings::from_path("/nonexistent/zone-schedule.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
