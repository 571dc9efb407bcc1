//! Update Reconciler
//!
//! Decides which sub-resources an update touches and pushes them one at a
//! time in a fixed order.
//!
//! # Flush order
//!
//! 1. Properties (site body and site config)
//! 2. AppSettings
//! 3. StickySettings
//! 4. Auth
//! 5. AuthV2
//! 6. Logs
//! 7. Backup
//! 8. StorageMounts
//! 9. ConnectionStrings
//! 10. ZipDeploy
//!
//! The first failure stops the flush. Sub-resources already written stay
//! written.

use super::auth::expand_auth_settings;
use super::auth_v2::expand_auth_settings_v2;
use super::backup::expand_backup;
use super::changes::ChangeSet;
use super::expand::{expand_app_settings_for_update, expand_site, SiteConfigExpander};
use super::fetcher::RemoteSnapshot;
use super::logs::{disabled_logs_config, expand_logs};
use super::model::WebApp;
use super::mounts::{expand_connection_strings, expand_storage_mounts};
use super::nested;
use super::remote::{ConnectionStringMap, RemoteServiceClient, StorageMountMap};
use super::settings::AppSettingsMap;
use super::sticky::{merge_sticky_settings, orphaned_names};
use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Independently writable part of a site, in flush order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubResource {
    Properties,
    AppSettings,
    StickySettings,
    Auth,
    AuthV2,
    Logs,
    Backup,
    StorageMounts,
    ConnectionStrings,
    ZipDeploy,
}

impl fmt::Display for SubResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubResource::Properties => "properties",
            SubResource::AppSettings => "app settings",
            SubResource::StickySettings => "sticky settings",
            SubResource::Auth => "auth settings",
            SubResource::AuthV2 => "auth v2 settings",
            SubResource::Logs => "logs",
            SubResource::Backup => "backup",
            SubResource::StorageMounts => "storage mounts",
            SubResource::ConnectionStrings => "connection strings",
            SubResource::ZipDeploy => "zip deploy",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("{sub_resource} update failed: {source}")]
    Flush {
        sub_resource: SubResource,
        #[source]
        source: anyhow::Error,
    },
}

// =============================================================================
// Field ownership
// =============================================================================

use SubResource::*;

/// Sub-resources dirtied by each field path. A key ending in `.` matches every
/// path under it; the first matching entry wins.
pub static FIELD_OWNERS: &[(&str, &[SubResource])] = &[
    // Stack selection also drives FUNCTIONS_WORKER_RUNTIME and registry settings
    ("site_config.application_stack", &[Properties, AppSettings]),
    ("site_config.application_insights_key", &[AppSettings]),
    ("site_config.application_insights_connection_string", &[AppSettings]),
    ("site_config.health_check_eviction_time_in_min", &[AppSettings]),
    ("site_config.http_logging_retention_days", &[AppSettings]),
    ("site_config.", &[Properties]),
    ("name", &[Properties]),
    ("os", &[Properties]),
    ("enabled", &[Properties]),
    ("https_only", &[Properties]),
    ("client_certificate_enabled", &[Properties]),
    ("client_certificate_mode", &[Properties]),
    ("functions_extension_version", &[AppSettings]),
    ("storage", &[AppSettings]),
    ("builtin_logging_enabled", &[AppSettings]),
    ("content_share", &[AppSettings]),
    ("content_share_connection_string", &[AppSettings]),
    ("app_settings", &[AppSettings]),
    ("sticky_settings", &[StickySettings]),
    ("auth_settings", &[Auth]),
    ("auth_settings_v2", &[AuthV2]),
    ("logs", &[Logs]),
    ("backup", &[Backup]),
    ("storage_mounts", &[StorageMounts]),
    ("connection_strings", &[ConnectionStrings]),
    ("zip_deploy_file", &[ZipDeploy]),
];

/// Sub-resources a changed field path dirties
pub fn owners(path: &str) -> &'static [SubResource] {
    FIELD_OWNERS
        .iter()
        .find(|(key, _)| match key.strip_suffix('.') {
            Some(_) => path.starts_with(key),
            None => path == *key,
        })
        .map(|(_, owners)| *owners)
        .unwrap_or(&[])
}

// =============================================================================
// Planning
// =============================================================================

/// Request body for one sub-resource
#[derive(Debug, Clone, PartialEq)]
pub enum SubResourceUpdate {
    Properties(nested::Site),
    AppSettings(AppSettingsMap),
    StickySettings(nested::SlotConfigNames),
    Auth(nested::SiteAuthSettings),
    AuthV2(nested::SiteAuthSettingsV2),
    Logs(nested::SiteLogsConfig),
    /// `None` deletes the backup configuration
    Backup(Option<nested::BackupRequest>),
    StorageMounts(StorageMountMap),
    ConnectionStrings(ConnectionStringMap),
    ZipDeploy(PathBuf),
}

impl SubResourceUpdate {
    pub fn sub_resource(&self) -> SubResource {
        match self {
            SubResourceUpdate::Properties(_) => Properties,
            SubResourceUpdate::AppSettings(_) => AppSettings,
            SubResourceUpdate::StickySettings(_) => StickySettings,
            SubResourceUpdate::Auth(_) => Auth,
            SubResourceUpdate::AuthV2(_) => AuthV2,
            SubResourceUpdate::Logs(_) => Logs,
            SubResourceUpdate::Backup(_) => Backup,
            SubResourceUpdate::StorageMounts(_) => StorageMounts,
            SubResourceUpdate::ConnectionStrings(_) => ConnectionStrings,
            SubResourceUpdate::ZipDeploy(_) => ZipDeploy,
        }
    }
}

/// Pending writes, already in flush order
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    pub changes: ChangeSet,
    pub steps: Vec<SubResourceUpdate>,
    /// Sticky names that match no setting being written
    pub orphaned_sticky_names: Vec<String>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn sub_resources(&self) -> Vec<SubResource> {
        self.steps.iter().map(SubResourceUpdate::sub_resource).collect()
    }
}

pub struct Reconciler;

impl Reconciler {
    /// Plan the writes that move the remote from `old` to `new`.
    /// `live` is the state last read from the remote: site config fields the
    /// update leaves alone keep their value from it, and function apps keep
    /// their generated content share settings.
    pub fn plan(old: &WebApp, new: &WebApp, live: Option<&RemoteSnapshot>) -> Result<UpdatePlan> {
        let changes = ChangeSet::between(old, new);
        let dirty: BTreeSet<SubResource> = changes.iter().flat_map(owners).copied().collect();
        let previous = live.and_then(|l| l.site_config.as_ref());
        let live_settings = live.map(|l| &l.app_settings);

        // Sticky planning checks names against the settings being written
        let app_settings = if dirty.contains(&AppSettings) || dirty.contains(&StickySettings) {
            expand_app_settings_for_update(new, live_settings)?
        } else {
            AppSettingsMap::new()
        };

        let mut steps = Vec::with_capacity(dirty.len());
        let mut orphaned_sticky_names = Vec::new();
        for sub_resource in dirty {
            let step = match sub_resource {
                Properties => {
                    let site_config = SiteConfigExpander::for_update(previous, &changes)
                        .function_app(new.is_function_app())
                        .expand(&new.site_config, None, new.os);
                    SubResourceUpdate::Properties(expand_site(new, site_config))
                },
                AppSettings => SubResourceUpdate::AppSettings(app_settings.clone()),
                StickySettings => {
                    let names = merge_sticky_settings(old.sticky_settings.as_ref(), new.sticky_settings.as_ref());
                    orphaned_sticky_names = orphaned_names(&names, &app_settings, &new.connection_strings);
                    SubResourceUpdate::StickySettings(names)
                },
                Auth => SubResourceUpdate::Auth(expand_auth_settings(new.auth_settings.as_ref())),
                AuthV2 => SubResourceUpdate::AuthV2(expand_auth_settings_v2(new.auth_settings_v2.as_ref())),
                Logs => SubResourceUpdate::Logs(
                    new.logs.as_ref().map(expand_logs).unwrap_or_else(disabled_logs_config),
                ),
                Backup => SubResourceUpdate::Backup(new.backup.as_ref().map(expand_backup).transpose()?),
                StorageMounts => SubResourceUpdate::StorageMounts(expand_storage_mounts(&new.storage_mounts)),
                ConnectionStrings => {
                    SubResourceUpdate::ConnectionStrings(expand_connection_strings(&new.connection_strings))
                },
                ZipDeploy => match &new.zip_deploy_file {
                    Some(file) => SubResourceUpdate::ZipDeploy(PathBuf::from(file)),
                    None => {
                        tracing::debug!("Zip deploy file removed, nothing to deploy");
                        continue;
                    },
                },
            };
            steps.push(step);
        }

        tracing::debug!("Planned {} sub-resource updates", steps.len());
        Ok(UpdatePlan {
            changes,
            steps,
            orphaned_sticky_names,
        })
    }

    /// Send every step, one after another. Returns the sub-resources written.
    pub async fn flush(
        plan: &UpdatePlan,
        client: &dyn RemoteServiceClient,
    ) -> Result<Vec<SubResource>, ReconcileError> {
        let mut flushed = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            let sub_resource = step.sub_resource();
            tracing::info!("Updating {}", sub_resource);

            let result = match step {
                SubResourceUpdate::Properties(site) => client.update_properties(site).await,
                SubResourceUpdate::AppSettings(settings) => client.update_app_settings(settings).await,
                SubResourceUpdate::StickySettings(names) => client.update_sticky_settings(names).await,
                SubResourceUpdate::Auth(auth) => client.update_auth_settings(auth).await,
                SubResourceUpdate::AuthV2(auth) => client.update_auth_settings_v2(auth).await,
                SubResourceUpdate::Logs(logs) => client.update_logs(logs).await,
                SubResourceUpdate::Backup(Some(backup)) => client.update_backup(backup).await,
                SubResourceUpdate::Backup(None) => client.delete_backup().await,
                SubResourceUpdate::StorageMounts(mounts) => client.update_storage_mounts(mounts).await,
                SubResourceUpdate::ConnectionStrings(connection_strings) => {
                    client.update_connection_strings(connection_strings).await
                },
                SubResourceUpdate::ZipDeploy(archive) => client.zip_deploy(archive).await,
            };

            if let Err(source) = result {
                tracing::error!("Failed to update {}: {:#}", sub_resource, source);
                return Err(ReconcileError::Flush { sub_resource, source });
            }
            flushed.push(sub_resource);
        }

        Ok(flushed)
    }
}
