//! Management API Client
//!
//! Addresses one site (or deployment slot) and implements
//! [`RemoteServiceClient`] on top of the sub-resource dispatch table.

use super::dispatch;
use super::http::{api_status, ApiHttpClient};
use crate::site::nested::{self, ArmResource};
use crate::site::remote::{ConnectionStringMap, RemoteServiceClient, StorageMountMap};
use crate::site::settings::AppSettingsMap;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

pub const API_VERSION: &str = "2023-12-01";

/// Which site to talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTarget {
    pub endpoint: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
    pub slot: Option<String>,
    /// Domain of the deployment (Kudu) host, e.g. `scm.azurewebsites.net`
    pub scm_domain: String,
    /// Full deployment base URL; replaces the one derived from `scm_domain`
    pub scm_endpoint: Option<String>,
}

#[derive(Clone)]
pub struct ArmClient {
    pub http: ApiHttpClient,
    pub target: SiteTarget,
    token: String,
}

impl ArmClient {
    pub fn new(target: SiteTarget, token: &str) -> Result<Self> {
        url::Url::parse(&target.endpoint).with_context(|| format!("Invalid endpoint: {}", target.endpoint))?;
        if token.is_empty() {
            return Err(anyhow::anyhow!("Access token is empty"));
        }

        Ok(Self {
            http: ApiHttpClient::new()?,
            target,
            token: token.to_string(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// URL of the production site
    pub fn production_site_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}",
            self.target.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.target.subscription_id),
            urlencoding::encode(&self.target.resource_group),
            urlencoding::encode(&self.target.name)
        )
    }

    /// URL of the targeted site or slot
    pub fn site_url(&self) -> String {
        match &self.target.slot {
            Some(slot) => format!("{}/slots/{}", self.production_site_url(), urlencoding::encode(slot)),
            None => self.production_site_url(),
        }
    }

    pub fn with_api_version(&self, url: &str) -> String {
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{}{}api-version={}", url, separator, API_VERSION)
    }

    /// Zip deploy endpoint on the deployment host
    pub fn zip_deploy_url(&self) -> String {
        if let Some(base) = &self.target.scm_endpoint {
            return format!("{}/api/zipdeploy", base.trim_end_matches('/'));
        }

        let host = match &self.target.slot {
            Some(slot) => format!("{}-{}", self.target.name, slot),
            None => self.target.name.clone(),
        };
        format!("https://{}.{}/api/zipdeploy", host.to_lowercase(), self.target.scm_domain)
    }

    // =========================================================================
    // Typed dispatch
    // =========================================================================

    async fn read<T: DeserializeOwned>(&self, operation: &str) -> Result<T> {
        let value = dispatch::invoke(self, operation, None).await?;
        serde_json::from_value(value).with_context(|| format!("Failed to parse {} response", operation))
    }

    /// Read a `{ "properties": ... }` envelope and unwrap it
    async fn read_properties<T: DeserializeOwned + Default>(&self, operation: &str) -> Result<T> {
        let value = dispatch::invoke(self, operation, None).await?;
        if value.is_null() {
            return Ok(T::default());
        }
        let envelope: ArmResource<T> = serde_json::from_value(value)
            .with_context(|| format!("Failed to parse {} response", operation))?;
        Ok(envelope.properties)
    }

    async fn write<T: Serialize>(&self, operation: &str, body: &T) -> Result<()> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        dispatch::invoke(self, operation, Some(&body)).await?;
        Ok(())
    }

    async fn write_properties<T: Serialize + Clone>(&self, operation: &str, properties: &T) -> Result<()> {
        self.write(operation, &ArmResource::new(properties.clone())).await
    }
}

#[async_trait]
impl RemoteServiceClient for ArmClient {
    async fn get_site(&self) -> Result<nested::Site> {
        self.read("get_site").await
    }

    async fn get_site_config(&self) -> Result<nested::SiteConfig> {
        self.read_properties("get_site_config").await
    }

    async fn list_app_settings(&self) -> Result<AppSettingsMap> {
        self.read_properties("list_app_settings").await
    }

    async fn get_sticky_settings(&self) -> Result<nested::SlotConfigNames> {
        self.read_properties("get_sticky_settings").await
    }

    async fn list_connection_strings(&self) -> Result<ConnectionStringMap> {
        self.read_properties("list_connection_strings").await
    }

    async fn get_logs(&self) -> Result<nested::SiteLogsConfig> {
        self.read_properties("get_logs").await
    }

    async fn get_backup(&self) -> Result<Option<nested::BackupRequest>> {
        match self.read_properties("get_backup").await {
            Ok(backup) => Ok(Some(backup)),
            Err(e) if api_status(&e) == Some(StatusCode::NOT_FOUND) => {
                tracing::debug!("No backup configured");
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    async fn list_storage_mounts(&self) -> Result<StorageMountMap> {
        self.read_properties("list_storage_mounts").await
    }

    async fn get_auth_settings(&self) -> Result<nested::SiteAuthSettings> {
        self.read_properties("get_auth_settings").await
    }

    async fn get_auth_settings_v2(&self) -> Result<nested::SiteAuthSettingsV2> {
        self.read_properties("get_auth_settings_v2").await
    }

    async fn update_properties(&self, site: &nested::Site) -> Result<()> {
        self.write("update_properties", site).await
    }

    async fn update_app_settings(&self, settings: &AppSettingsMap) -> Result<()> {
        self.write_properties("update_app_settings", settings).await
    }

    async fn update_sticky_settings(&self, names: &nested::SlotConfigNames) -> Result<()> {
        self.write_properties("update_sticky_settings", names).await
    }

    async fn update_auth_settings(&self, auth: &nested::SiteAuthSettings) -> Result<()> {
        self.write_properties("update_auth_settings", auth).await
    }

    async fn update_auth_settings_v2(&self, auth: &nested::SiteAuthSettingsV2) -> Result<()> {
        self.write_properties("update_auth_settings_v2", auth).await
    }

    async fn update_logs(&self, logs: &nested::SiteLogsConfig) -> Result<()> {
        self.write_properties("update_logs", logs).await
    }

    async fn update_backup(&self, backup: &nested::BackupRequest) -> Result<()> {
        self.write_properties("update_backup", backup).await
    }

    async fn delete_backup(&self) -> Result<()> {
        match dispatch::invoke(self, "delete_backup", None).await {
            Ok(_) => Ok(()),
            // Already gone
            Err(e) if api_status(&e) == Some(StatusCode::NOT_FOUND) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn update_storage_mounts(&self, mounts: &StorageMountMap) -> Result<()> {
        self.write_properties("update_storage_mounts", mounts).await
    }

    async fn update_connection_strings(&self, connection_strings: &ConnectionStringMap) -> Result<()> {
        self.write_properties("update_connection_strings", connection_strings).await
    }

    async fn zip_deploy(&self, archive: &Path) -> Result<()> {
        let bytes = tokio::fs::read(archive)
            .await
            .with_context(|| format!("Failed to read {}", archive.display()))?;

        let url = self.zip_deploy_url();
        let response: Value = self
            .http
            .post_bytes(&url, &self.token, bytes, "application/zip")
            .await
            .context("Zip deploy failed")?;
        tracing::debug!("Zip deploy response: {}", response);
        Ok(())
    }
}
