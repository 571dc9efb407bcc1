//! Remote service seam
//!
//! Everything the read path and the reconciler need from the management API.
//! [`crate::azure::client::ArmClient`] implements it over HTTP; tests use
//! recording doubles.

use super::nested;
use super::settings::AppSettingsMap;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

pub type ConnectionStringMap = BTreeMap<String, nested::ConnStringValueTypePair>;
pub type StorageMountMap = BTreeMap<String, nested::AzureStorageInfo>;

/// One site (or slot) on the remote service
#[async_trait]
pub trait RemoteServiceClient: Send + Sync {
    // Reads
    async fn get_site(&self) -> Result<nested::Site>;
    async fn get_site_config(&self) -> Result<nested::SiteConfig>;
    async fn list_app_settings(&self) -> Result<AppSettingsMap>;
    async fn get_sticky_settings(&self) -> Result<nested::SlotConfigNames>;
    async fn list_connection_strings(&self) -> Result<ConnectionStringMap>;
    async fn get_logs(&self) -> Result<nested::SiteLogsConfig>;
    /// `None` when no backup is configured
    async fn get_backup(&self) -> Result<Option<nested::BackupRequest>>;
    async fn list_storage_mounts(&self) -> Result<StorageMountMap>;
    async fn get_auth_settings(&self) -> Result<nested::SiteAuthSettings>;
    /// Only meaningful once the v1 settings report `configVersion: v2`
    async fn get_auth_settings_v2(&self) -> Result<nested::SiteAuthSettingsV2>;

    // Writes, each replacing the whole sub-resource
    async fn update_properties(&self, site: &nested::Site) -> Result<()>;
    async fn update_app_settings(&self, settings: &AppSettingsMap) -> Result<()>;
    async fn update_sticky_settings(&self, names: &nested::SlotConfigNames) -> Result<()>;
    async fn update_auth_settings(&self, auth: &nested::SiteAuthSettings) -> Result<()>;
    async fn update_auth_settings_v2(&self, auth: &nested::SiteAuthSettingsV2) -> Result<()>;
    async fn update_logs(&self, logs: &nested::SiteLogsConfig) -> Result<()>;
    async fn update_backup(&self, backup: &nested::BackupRequest) -> Result<()>;
    async fn delete_backup(&self) -> Result<()>;
    async fn update_storage_mounts(&self, mounts: &StorageMountMap) -> Result<()>;
    async fn update_connection_strings(&self, connection_strings: &ConnectionStringMap) -> Result<()>;
    async fn zip_deploy(&self, archive: &Path) -> Result<()>;
}
