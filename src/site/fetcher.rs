//! Site Fetcher
//!
//! Reads a site and all of its sub-resources. Reads carry no ordering
//! constraint, so they run concurrently. The v2 auth document is the one
//! exception: it is only read once the v1 document points at it.

use super::auth_v2::uses_auth_v2;
use super::flatten::flatten_web_app;
use super::model::WebApp;
use super::nested;
use super::remote::{ConnectionStringMap, RemoteServiceClient, StorageMountMap};
use super::settings::AppSettingsMap;
use anyhow::{Context, Result};

/// Raw remote state of one site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSnapshot {
    pub site: nested::Site,
    pub site_config: Option<nested::SiteConfig>,
    pub app_settings: AppSettingsMap,
    pub sticky_settings: nested::SlotConfigNames,
    pub connection_strings: ConnectionStringMap,
    pub auth_settings: Option<nested::SiteAuthSettings>,
    pub auth_settings_v2: Option<nested::SiteAuthSettingsV2>,
    pub logs: Option<nested::SiteLogsConfig>,
    pub backup: Option<nested::BackupRequest>,
    pub storage_mounts: StorageMountMap,
}

/// Fetch every sub-resource of a site
pub async fn fetch_snapshot(client: &dyn RemoteServiceClient) -> Result<RemoteSnapshot> {
    tracing::debug!("Fetching site snapshot");

    let (site, site_config, app_settings, sticky_settings, connection_strings) = futures::try_join!(
        async { client.get_site().await.context("Failed to read site") },
        async { client.get_site_config().await.context("Failed to read site config") },
        async { client.list_app_settings().await.context("Failed to read app settings") },
        async { client.get_sticky_settings().await.context("Failed to read sticky settings") },
        async {
            client
                .list_connection_strings()
                .await
                .context("Failed to read connection strings")
        },
    )?;

    let (auth_settings, logs, backup, storage_mounts) = futures::try_join!(
        async { client.get_auth_settings().await.context("Failed to read auth settings") },
        async { client.get_logs().await.context("Failed to read logs config") },
        async { client.get_backup().await.context("Failed to read backup config") },
        async { client.list_storage_mounts().await.context("Failed to read storage mounts") },
    )?;

    let auth_settings_v2 = if uses_auth_v2(&auth_settings) {
        let v2 = client
            .get_auth_settings_v2()
            .await
            .context("Failed to read auth v2 settings")?;
        Some(v2)
    } else {
        None
    };

    tracing::debug!(
        "Fetched site with {} app settings, {} connection strings, {} storage mounts",
        app_settings.len(),
        connection_strings.len(),
        storage_mounts.len()
    );

    Ok(RemoteSnapshot {
        site,
        site_config: Some(site_config),
        app_settings,
        sticky_settings,
        connection_strings,
        auth_settings: Some(auth_settings),
        auth_settings_v2,
        logs: Some(logs),
        backup,
        storage_mounts,
    })
}

/// Read a site into the flat model. `previous` supplies write-only values
/// such as secrets and storage access keys.
pub async fn read_web_app(client: &dyn RemoteServiceClient, previous: Option<&WebApp>) -> Result<WebApp> {
    let snapshot = fetch_snapshot(client).await?;
    let app = flatten_web_app(&snapshot, previous);
    tracing::info!("Read site {} ({:?})", app.name, app.os);
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    /// Serves a fixed site; `broken_logs` makes the logs read fail
    #[derive(Default)]
    struct StaticClient {
        broken_logs: bool,
        auth_v2: bool,
    }

    #[async_trait]
    impl RemoteServiceClient for StaticClient {
        async fn get_site(&self) -> Result<nested::Site> {
            Ok(nested::Site {
                name: Some("web".into()),
                kind: Some("app".into()),
                properties: Some(nested::SiteProperties {
                    enabled: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }
        async fn get_site_config(&self) -> Result<nested::SiteConfig> {
            Ok(nested::SiteConfig::default())
        }
        async fn list_app_settings(&self) -> Result<AppSettingsMap> {
            Ok([("FOO".to_string(), "bar".to_string())].into_iter().collect())
        }
        async fn get_sticky_settings(&self) -> Result<nested::SlotConfigNames> {
            Ok(nested::SlotConfigNames::default())
        }
        async fn list_connection_strings(&self) -> Result<ConnectionStringMap> {
            Ok(ConnectionStringMap::new())
        }
        async fn get_logs(&self) -> Result<nested::SiteLogsConfig> {
            if self.broken_logs {
                anyhow::bail!("API request failed: 500 Internal Server Error");
            }
            Ok(nested::SiteLogsConfig::default())
        }
        async fn get_backup(&self) -> Result<Option<nested::BackupRequest>> {
            Ok(None)
        }
        async fn list_storage_mounts(&self) -> Result<StorageMountMap> {
            Ok(StorageMountMap::new())
        }
        async fn get_auth_settings(&self) -> Result<nested::SiteAuthSettings> {
            Ok(nested::SiteAuthSettings {
                config_version: Some(if self.auth_v2 { "v2" } else { "v1" }.into()),
                ..Default::default()
            })
        }
        async fn get_auth_settings_v2(&self) -> Result<nested::SiteAuthSettingsV2> {
            if !self.auth_v2 {
                anyhow::bail!("v2 settings read while the site is on v1");
            }
            Ok(nested::SiteAuthSettingsV2 {
                platform: Some(nested::AuthPlatform {
                    enabled: Some(true),
                    runtime_version: Some("~1".into()),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }

        async fn update_properties(&self, _: &nested::Site) -> Result<()> {
            unreachable!()
        }
        async fn update_app_settings(&self, _: &AppSettingsMap) -> Result<()> {
            unreachable!()
        }
        async fn update_sticky_settings(&self, _: &nested::SlotConfigNames) -> Result<()> {
            unreachable!()
        }
        async fn update_auth_settings(&self, _: &nested::SiteAuthSettings) -> Result<()> {
            unreachable!()
        }
        async fn update_auth_settings_v2(&self, _: &nested::SiteAuthSettingsV2) -> Result<()> {
            unreachable!()
        }
        async fn update_logs(&self, _: &nested::SiteLogsConfig) -> Result<()> {
            unreachable!()
        }
        async fn update_backup(&self, _: &nested::BackupRequest) -> Result<()> {
            unreachable!()
        }
        async fn delete_backup(&self) -> Result<()> {
            unreachable!()
        }
        async fn update_storage_mounts(&self, _: &StorageMountMap) -> Result<()> {
            unreachable!()
        }
        async fn update_connection_strings(&self, _: &ConnectionStringMap) -> Result<()> {
            unreachable!()
        }
        async fn zip_deploy(&self, _: &Path) -> Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn test_snapshot_collects_every_read() {
        let client = StaticClient::default();
        let snapshot = tokio_test::block_on(fetch_snapshot(&client)).unwrap();

        assert_eq!(snapshot.site.name.as_deref(), Some("web"));
        assert_eq!(snapshot.app_settings["FOO"], "bar");
        assert!(snapshot.site_config.is_some());
        assert_eq!(snapshot.backup, None);
        assert_eq!(snapshot.auth_settings_v2, None);
    }

    #[test]
    fn test_auth_v2_read_follows_config_version() {
        let client = StaticClient {
            auth_v2: true,
            ..Default::default()
        };
        let app = tokio_test::block_on(read_web_app(&client, None)).unwrap();

        let auth = app.auth_settings_v2.expect("auth v2 read");
        assert!(auth.auth_enabled);
        assert_eq!(auth.runtime_version, "~1");
        assert_eq!(app.auth_settings, None);
    }

    #[test]
    fn test_read_web_app_flattens() {
        let client = StaticClient::default();
        let app = tokio_test::block_on(read_web_app(&client, None)).unwrap();

        assert_eq!(app.name, "web");
        assert!(app.enabled);
        assert!(!app.is_function_app());
        assert_eq!(app.app_settings["FOO"], "bar");
    }

    #[test]
    fn test_failed_read_names_sub_resource() {
        let client = StaticClient {
            broken_logs: true,
            ..Default::default()
        };
        let err = tokio_test::block_on(fetch_snapshot(&client)).unwrap_err();
        assert_eq!(err.to_string(), "Failed to read logs config");
    }
}
