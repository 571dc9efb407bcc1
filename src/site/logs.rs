//! Diagnostic logs configuration

use super::nested;
use serde::{Deserialize, Serialize};

const LEVEL_OFF: &str = "Off";

fn level_off() -> String {
    LEVEL_OFF.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_logs: Option<ApplicationLogs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_logs: Option<HttpLogs>,
    #[serde(default)]
    pub detailed_error_messages: bool,
    #[serde(default)]
    pub failed_request_tracing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationLogs {
    #[serde(default = "level_off")]
    pub file_system_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_blob_storage: Option<BlobStorageLog>,
}

impl Default for ApplicationLogs {
    fn default() -> Self {
        Self {
            file_system_level: level_off(),
            azure_blob_storage: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobStorageLog {
    pub level: String,
    pub sas_url: String,
    pub retention_in_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpLogs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system: Option<FileSystemLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_blob_storage: Option<HttpBlobStorageLog>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemLog {
    pub retention_in_mb: i64,
    pub retention_in_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpBlobStorageLog {
    pub sas_url: String,
    pub retention_in_days: i64,
}

fn enabled(value: bool) -> Option<nested::EnabledConfig> {
    Some(nested::EnabledConfig { enabled: Some(value) })
}

pub fn expand_logs(logs: &LogsConfig) -> nested::SiteLogsConfig {
    let application_logs = logs.application_logs.as_ref().map(|app| nested::ApplicationLogsConfig {
        file_system: Some(nested::FileSystemApplicationLogsConfig {
            level: Some(app.file_system_level.clone()),
        }),
        azure_blob_storage: app.azure_blob_storage.as_ref().map(|blob| {
            nested::AzureBlobStorageApplicationLogsConfig {
                level: Some(blob.level.clone()),
                sas_url: Some(blob.sas_url.clone()),
                retention_in_days: Some(blob.retention_in_days),
            }
        }),
    });

    let http_logs = logs.http_logs.as_ref().map(|http| nested::HttpLogsConfig {
        file_system: http.file_system.as_ref().map(|fs| nested::FileSystemHttpLogsConfig {
            retention_in_mb: Some(fs.retention_in_mb),
            retention_in_days: Some(fs.retention_in_days),
            enabled: Some(true),
        }),
        azure_blob_storage: http.azure_blob_storage.as_ref().map(|blob| {
            nested::AzureBlobStorageHttpLogsConfig {
                sas_url: Some(blob.sas_url.clone()),
                retention_in_days: Some(blob.retention_in_days),
                enabled: Some(true),
            }
        }),
    });

    nested::SiteLogsConfig {
        application_logs,
        http_logs,
        detailed_error_messages: enabled(logs.detailed_error_messages),
        failed_requests_tracing: enabled(logs.failed_request_tracing),
    }
}

/// Logs config that switches every log sink off
pub fn disabled_logs_config() -> nested::SiteLogsConfig {
    nested::SiteLogsConfig {
        application_logs: Some(nested::ApplicationLogsConfig {
            file_system: Some(nested::FileSystemApplicationLogsConfig {
                level: Some(level_off()),
            }),
            azure_blob_storage: Some(nested::AzureBlobStorageApplicationLogsConfig {
                level: Some(level_off()),
                ..Default::default()
            }),
        }),
        http_logs: Some(nested::HttpLogsConfig {
            file_system: Some(nested::FileSystemHttpLogsConfig {
                enabled: Some(false),
                ..Default::default()
            }),
            azure_blob_storage: Some(nested::AzureBlobStorageHttpLogsConfig {
                enabled: Some(false),
                ..Default::default()
            }),
        }),
        detailed_error_messages: enabled(false),
        failed_requests_tracing: enabled(false),
    }
}

/// Flatten the remote logs config. A config where every sink is at its
/// default flattens to `None`.
pub fn flatten_logs(logs: Option<&nested::SiteLogsConfig>) -> Option<LogsConfig> {
    let logs = logs?;

    let application_logs = logs.application_logs.as_ref().and_then(|app| {
        let file_system_level = app
            .file_system
            .as_ref()
            .and_then(|fs| fs.level.clone())
            .unwrap_or_else(level_off);
        let azure_blob_storage = app.azure_blob_storage.as_ref().and_then(|blob| {
            let sas_url = blob.sas_url.clone().filter(|url| !url.is_empty())?;
            Some(BlobStorageLog {
                level: blob.level.clone().unwrap_or_else(level_off),
                sas_url,
                retention_in_days: blob.retention_in_days.unwrap_or_default(),
            })
        });

        let is_default = file_system_level.eq_ignore_ascii_case(LEVEL_OFF) && azure_blob_storage.is_none();
        (!is_default).then_some(ApplicationLogs {
            file_system_level,
            azure_blob_storage,
        })
    });

    let http_logs = logs.http_logs.as_ref().and_then(|http| {
        let file_system = http
            .file_system
            .as_ref()
            .filter(|fs| fs.enabled.unwrap_or(false))
            .map(|fs| FileSystemLog {
                retention_in_mb: fs.retention_in_mb.unwrap_or_default(),
                retention_in_days: fs.retention_in_days.unwrap_or_default(),
            });
        let azure_blob_storage = http
            .azure_blob_storage
            .as_ref()
            .filter(|blob| blob.enabled.unwrap_or(false))
            .and_then(|blob| {
                let sas_url = blob.sas_url.clone().filter(|url| !url.is_empty())?;
                Some(HttpBlobStorageLog {
                    sas_url,
                    retention_in_days: blob.retention_in_days.unwrap_or_default(),
                })
            });

        (file_system.is_some() || azure_blob_storage.is_some()).then_some(HttpLogs {
            file_system,
            azure_blob_storage,
        })
    });

    let is_enabled = |config: &Option<nested::EnabledConfig>| {
        config.as_ref().and_then(|c| c.enabled).unwrap_or(false)
    };

    let flat = LogsConfig {
        application_logs,
        http_logs,
        detailed_error_messages: is_enabled(&logs.detailed_error_messages),
        failed_request_tracing: is_enabled(&logs.failed_requests_tracing),
    };

    (flat != LogsConfig::default()).then_some(flat)
}
