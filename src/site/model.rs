//! Flat configuration model
//!
//! This is the shape users author. It is read from JSON or YAML, compared
//! field by field by the reconciler, and converted to the remote shape by
//! the expander.

use super::access::{CorsSetting, IpRestriction};
use super::auth::AuthSettings;
use super::auth_v2::AuthV2Settings;
use super::autoheal::AutoHealSetting;
use super::backup::Backup;
use super::logs::LogsConfig;
use super::mounts::{ConnectionString, StorageMount};
use super::settings::{AppSettingsMap, ReservedSettings, StorageConnection};
use super::stack::{self, ApplicationStack, OsFamily};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Site configuration block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub always_on: bool,
    pub api_definition_url: Option<String>,
    pub api_management_api_id: Option<String>,
    pub app_command_line: Option<String>,
    pub app_scale_limit: Option<i64>,
    pub application_insights_key: Option<String>,
    pub application_insights_connection_string: Option<String>,
    #[serde(deserialize_with = "stack::deserialize_normalized")]
    pub application_stack: Option<ApplicationStack>,
    pub auto_heal: Option<AutoHealSetting>,
    pub container_registry_use_managed_identity: bool,
    pub container_registry_managed_identity_client_id: Option<String>,
    pub cors: Option<CorsSetting>,
    pub default_documents: Vec<String>,
    /// Read-only
    pub detailed_error_logging_enabled: bool,
    pub elastic_instance_minimum: Option<i64>,
    pub ftps_state: Option<String>,
    pub health_check_path: Option<String>,
    pub health_check_eviction_time_in_min: Option<i64>,
    pub http2_enabled: bool,
    pub http_logging_retention_days: Option<i64>,
    pub ip_restrictions: Vec<IpRestriction>,
    pub ip_restriction_default_action: Option<String>,
    pub load_balancing_mode: Option<String>,
    pub managed_pipeline_mode: Option<String>,
    pub minimum_tls_version: Option<String>,
    pub pre_warmed_instance_count: Option<i64>,
    pub remote_debugging_enabled: bool,
    pub remote_debugging_version: Option<String>,
    pub runtime_scale_monitoring_enabled: bool,
    pub scm_ip_restrictions: Vec<IpRestriction>,
    pub scm_ip_restriction_default_action: Option<String>,
    pub scm_minimum_tls_version: Option<String>,
    /// Read-only
    pub scm_type: Option<String>,
    pub scm_use_main_ip_restriction: bool,
    pub use_32_bit_worker: bool,
    pub vnet_route_all_enabled: bool,
    pub websockets_enabled: bool,
    pub worker_count: Option<i64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            always_on: false,
            api_definition_url: None,
            api_management_api_id: None,
            app_command_line: None,
            app_scale_limit: None,
            application_insights_key: None,
            application_insights_connection_string: None,
            application_stack: None,
            auto_heal: None,
            container_registry_use_managed_identity: false,
            container_registry_managed_identity_client_id: None,
            cors: None,
            default_documents: Vec::new(),
            detailed_error_logging_enabled: false,
            elastic_instance_minimum: None,
            ftps_state: None,
            health_check_path: None,
            health_check_eviction_time_in_min: None,
            http2_enabled: false,
            http_logging_retention_days: None,
            ip_restrictions: Vec::new(),
            ip_restriction_default_action: None,
            load_balancing_mode: None,
            managed_pipeline_mode: None,
            minimum_tls_version: None,
            pre_warmed_instance_count: None,
            remote_debugging_enabled: false,
            remote_debugging_version: None,
            runtime_scale_monitoring_enabled: false,
            scm_ip_restrictions: Vec::new(),
            scm_ip_restriction_default_action: None,
            scm_minimum_tls_version: None,
            scm_type: None,
            scm_use_main_ip_restriction: false,
            // The platform default for new sites
            use_32_bit_worker: true,
            vnet_route_all_enabled: false,
            websockets_enabled: false,
            worker_count: None,
        }
    }
}

/// Names that stay with a deployment slot when it is swapped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickySettings {
    #[serde(default)]
    pub app_setting_names: Vec<String>,
    #[serde(default)]
    pub connection_string_names: Vec<String>,
}

/// A web or function app, as the user describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebApp {
    pub name: String,
    #[serde(default)]
    pub os: OsFamily,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub https_only: bool,
    #[serde(default)]
    pub client_certificate_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_mode: Option<String>,
    /// Set for function apps only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions_extension_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConnection>,
    #[serde(default)]
    pub builtin_logging_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_share: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_share_connection_string: Option<String>,
    #[serde(default)]
    pub app_settings: AppSettingsMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky_settings: Option<StickySettings>,
    #[serde(default)]
    pub connection_strings: Vec<ConnectionString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_settings: Option<AuthSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_settings_v2: Option<AuthV2Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<LogsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<Backup>,
    #[serde(default)]
    pub storage_mounts: Vec<StorageMount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_deploy_file: Option<String>,
    #[serde(default)]
    pub site_config: SiteConfig,
}

impl WebApp {
    pub fn new(name: &str, os: OsFamily) -> Self {
        Self {
            name: name.to_string(),
            os,
            enabled: true,
            https_only: false,
            client_certificate_enabled: false,
            client_certificate_mode: None,
            functions_extension_version: None,
            storage: None,
            builtin_logging_enabled: false,
            content_share: None,
            content_share_connection_string: None,
            app_settings: AppSettingsMap::new(),
            sticky_settings: None,
            connection_strings: Vec::new(),
            auth_settings: None,
            auth_settings_v2: None,
            logs: None,
            backup: None,
            storage_mounts: Vec::new(),
            zip_deploy_file: None,
            site_config: SiteConfig::default(),
        }
    }

    pub fn is_function_app(&self) -> bool {
        self.functions_extension_version.is_some()
    }

    /// Collect the structured fields that travel as reserved app settings
    pub fn reserved_settings(&self) -> ReservedSettings {
        let config = &self.site_config;
        let stack = config.application_stack.as_ref();
        let docker = stack.and_then(ApplicationStack::as_docker);

        let worker_runtime = if self.is_function_app() {
            stack.and_then(ApplicationStack::worker_runtime).map(str::to_string)
        } else {
            None
        };

        // Linux carries the node version in the stack identifier
        let node_default_version = match (self.os, stack) {
            (OsFamily::Windows, Some(ApplicationStack::Node { version })) => Some(version.clone()),
            _ => None,
        };

        ReservedSettings {
            functions_extension_version: self.functions_extension_version.clone(),
            worker_runtime,
            node_default_version,
            content_share_connection_string: self.content_share_connection_string.clone(),
            content_share: self.content_share.clone(),
            http_logging_retention_days: config.http_logging_retention_days,
            docker_registry_url: docker.and_then(|d| d.registry_url.clone()),
            docker_registry_username: docker.and_then(|d| d.registry_username.clone()),
            docker_registry_password: docker.and_then(|d| d.registry_password.clone()),
            app_insights_key: config.application_insights_key.clone(),
            app_insights_connection_string: config.application_insights_connection_string.clone(),
            storage: self.storage.clone(),
            builtin_logging: self.builtin_logging_enabled,
            health_check_max_ping_failures: config.health_check_eviction_time_in_min,
        }
    }
}
