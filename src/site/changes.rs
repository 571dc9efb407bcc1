//! Per-field change tracking
//!
//! A [`ChangeSet`] records which flat fields differ between two snapshots,
//! addressed by dotted path (`site_config.always_on`). The expander and the
//! reconciler read these flags instead of diffing whole structs.

use super::model::{SiteConfig, WebApp};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changed: BTreeSet<String>,
}

/// Mark each listed field whose value differs
macro_rules! diff_fields {
    ($changes:expr, $prefix:expr, $old:expr, $new:expr, [$($field:ident),* $(,)?]) => {
        $(
            if $old.$field != $new.$field {
                $changes.mark(&format!("{}{}", $prefix, stringify!($field)));
            }
        )*
    };
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields that differ between the last-known and desired snapshots
    pub fn between(old: &WebApp, new: &WebApp) -> Self {
        let mut changes = Self::new();

        diff_fields!(changes, "", old, new, [
            name,
            os,
            enabled,
            https_only,
            client_certificate_enabled,
            client_certificate_mode,
            functions_extension_version,
            storage,
            builtin_logging_enabled,
            content_share,
            content_share_connection_string,
            app_settings,
            sticky_settings,
            connection_strings,
            auth_settings,
            auth_settings_v2,
            logs,
            backup,
            storage_mounts,
            zip_deploy_file,
        ]);

        changes.diff_site_config(&old.site_config, &new.site_config);
        changes
    }

    fn diff_site_config(&mut self, old: &SiteConfig, new: &SiteConfig) {
        diff_fields!(self, "site_config.", old, new, [
            always_on,
            api_definition_url,
            api_management_api_id,
            app_command_line,
            app_scale_limit,
            application_insights_key,
            application_insights_connection_string,
            application_stack,
            auto_heal,
            container_registry_use_managed_identity,
            container_registry_managed_identity_client_id,
            cors,
            default_documents,
            detailed_error_logging_enabled,
            elastic_instance_minimum,
            ftps_state,
            health_check_path,
            health_check_eviction_time_in_min,
            http2_enabled,
            http_logging_retention_days,
            ip_restrictions,
            ip_restriction_default_action,
            load_balancing_mode,
            managed_pipeline_mode,
            minimum_tls_version,
            pre_warmed_instance_count,
            remote_debugging_enabled,
            remote_debugging_version,
            runtime_scale_monitoring_enabled,
            scm_ip_restrictions,
            scm_ip_restriction_default_action,
            scm_minimum_tls_version,
            scm_type,
            scm_use_main_ip_restriction,
            use_32_bit_worker,
            vnet_route_all_enabled,
            websockets_enabled,
            worker_count,
        ]);
    }

    pub fn mark(&mut self, path: &str) {
        self.changed.insert(path.to_string());
    }

    pub fn has_change(&self, path: &str) -> bool {
        self.changed.contains(path)
    }

    /// True if any path under `prefix` changed
    pub fn has_change_under(&self, prefix: &str) -> bool {
        self.changed.iter().any(|path| path.starts_with(prefix))
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(String::as_str)
    }
}
