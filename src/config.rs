//! Configuration Management
//!
//! Handles persistent configuration storage for sitecfg and loading of flat
//! configuration documents.

use crate::azure::client::SiteTarget;
use crate::site::stack::OsFamily;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_SCM_DOMAIN: &str = "scm.azurewebsites.net";

/// Environment variable holding the bearer token for API calls
pub const ACCESS_TOKEN_ENV: &str = "SITECFG_ACCESS_TOKEN";
pub const SUBSCRIPTION_ENV: &str = "AZURE_SUBSCRIPTION_ID";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Management API base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Last used resource group
    #[serde(default)]
    pub resource_group: Option<String>,
    /// OS assumed when a document does not say
    #[serde(default)]
    pub default_os: Option<OsFamily>,
    #[serde(default)]
    pub scm_domain: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sitecfg").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    pub fn effective_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective subscription (CLI > config > environment)
    pub fn effective_subscription(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.subscription_id.clone())
            .or_else(|| std::env::var(SUBSCRIPTION_ENV).ok())
            .filter(|s| !s.is_empty())
    }

    /// Get effective resource group (CLI > config)
    pub fn effective_resource_group(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.resource_group.clone())
            .filter(|s| !s.is_empty())
    }

    pub fn effective_os(&self, cli: Option<OsFamily>) -> OsFamily {
        cli.or(self.default_os).unwrap_or_default()
    }

    pub fn effective_scm_domain(&self) -> String {
        self.scm_domain
            .clone()
            .unwrap_or_else(|| DEFAULT_SCM_DOMAIN.to_string())
    }

    /// Build the target for one site from CLI values and this config
    pub fn site_target(
        &self,
        name: &str,
        slot: Option<&str>,
        resource_group: Option<&str>,
        subscription: Option<&str>,
    ) -> Result<SiteTarget> {
        let subscription_id = self.effective_subscription(subscription).context(format!(
            "No subscription configured. Set {} or use --subscription",
            SUBSCRIPTION_ENV
        ))?;
        let resource_group = self
            .effective_resource_group(resource_group)
            .context("No resource group configured. Use --resource-group")?;

        Ok(SiteTarget {
            endpoint: self.effective_endpoint(),
            subscription_id,
            resource_group,
            name: name.to_string(),
            slot: slot.map(str::to_string),
            scm_domain: self.effective_scm_domain(),
            scm_endpoint: None,
        })
    }

    /// Set resource group and save
    pub fn set_resource_group(&mut self, resource_group: &str) -> Result<()> {
        self.resource_group = Some(resource_group.to_string());
        self.save()
    }

    /// Set subscription and save
    pub fn set_subscription(&mut self, subscription_id: &str) -> Result<()> {
        self.subscription_id = Some(subscription_id.to_string());
        self.save()
    }
}

/// Read the bearer token. Token acquisition is left to the caller's tooling.
pub fn access_token() -> Result<String> {
    std::env::var(ACCESS_TOKEN_ENV)
        .ok()
        .filter(|t| !t.is_empty())
        .context(format!("{} is not set", ACCESS_TOKEN_ENV))
}

/// Load a JSON or YAML document, chosen by file extension
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {}", path.display()))
    }
}
