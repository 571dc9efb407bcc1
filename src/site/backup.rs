//! Scheduled backup configuration
//!
//! Start times are written as RFC 3339 in the flat model. The service echoes
//! them back without an offset (`2024-01-01T10:00:00.123456`), which is read
//! as UTC.

use super::nested;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const SERVICE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub name: String,
    /// SAS URL of the destination container
    pub storage_account_url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub schedule: BackupSchedule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSchedule {
    pub frequency_interval: i64,
    /// `Day` or `Hour`
    pub frequency_unit: String,
    #[serde(default)]
    pub keep_at_least_one_backup: bool,
    #[serde(default)]
    pub retention_period_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_execution_time: Option<String>,
}

pub fn expand_backup(backup: &Backup) -> Result<nested::BackupRequest> {
    let schedule = &backup.schedule;

    let start_time = schedule
        .start_time
        .as_deref()
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .with_context(|| format!("Invalid backup start_time '{}'", value))
                .map(|t| t.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true))
        })
        .transpose()?;

    Ok(nested::BackupRequest {
        backup_name: Some(backup.name.clone()),
        enabled: Some(backup.enabled),
        storage_account_url: Some(backup.storage_account_url.clone()),
        backup_schedule: Some(nested::BackupSchedule {
            frequency_interval: Some(schedule.frequency_interval),
            frequency_unit: Some(schedule.frequency_unit.clone()),
            keep_at_least_one_backup: Some(schedule.keep_at_least_one_backup),
            retention_period_in_days: Some(schedule.retention_period_days),
            start_time,
            last_execution_time: None,
        }),
    })
}

pub fn flatten_backup(backup: Option<&nested::BackupRequest>) -> Option<Backup> {
    let backup = backup?;
    let schedule = backup.backup_schedule.as_ref()?;

    Some(Backup {
        name: backup.backup_name.clone().unwrap_or_default(),
        storage_account_url: backup.storage_account_url.clone().unwrap_or_default(),
        enabled: backup.enabled.unwrap_or(true),
        schedule: BackupSchedule {
            frequency_interval: schedule.frequency_interval.unwrap_or_default(),
            frequency_unit: schedule.frequency_unit.clone().unwrap_or_default(),
            keep_at_least_one_backup: schedule.keep_at_least_one_backup.unwrap_or(false),
            retention_period_days: schedule.retention_period_in_days.unwrap_or_default(),
            start_time: schedule.start_time.as_deref().and_then(normalize_service_time),
            last_execution_time: schedule
                .last_execution_time
                .as_deref()
                .and_then(normalize_service_time),
        },
    })
}

/// Convert a service timestamp to RFC 3339 (UTC, whole seconds)
fn normalize_service_time(value: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, SERVICE_TIME_FORMAT).map(|t| t.and_utc()));

    match parsed {
        Ok(time) => Some(time.to_rfc3339_opts(SecondsFormat::Secs, true)),
        Err(e) => {
            tracing::debug!("Unparseable backup timestamp '{}': {}", value, e);
            None
        },
    }
}
