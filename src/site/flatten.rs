//! Config Flattener
//!
//! Converts remote responses back into the flat model. Structured values that
//! travel as app settings are read from the classified [`ReservedSettings`]
//! rather than from the nested site config.

use super::access::{flatten_cors, flatten_ip_restrictions};
use super::auth::flatten_auth_settings;
use super::auth_v2::flatten_auth_settings_v2;
use super::autoheal::flatten_auto_heal;
use super::backup::flatten_backup;
use super::fetcher::RemoteSnapshot;
use super::logs::flatten_logs;
use super::model::{SiteConfig, WebApp};
use super::mounts::{flatten_connection_strings, flatten_storage_mounts};
use super::nested;
use super::settings::{self, ReservedSettings, AZURE_WEB_JOBS_DASHBOARD};
use super::stack::{self, ApplicationStack, OsFamily};
use super::sticky::flatten_sticky_settings;

/// Flatten a nested site config. `None` flattens to the default config.
pub fn flatten_site_config(
    config: Option<&nested::SiteConfig>,
    reserved: &ReservedSettings,
    os: OsFamily,
) -> SiteConfig {
    let defaults = SiteConfig::default();
    let empty = nested::SiteConfig::default();
    let config = config.unwrap_or(&empty);

    SiteConfig {
        always_on: config.always_on.unwrap_or(defaults.always_on),
        api_definition_url: config.api_definition.as_ref().and_then(|api| api.url.clone()),
        api_management_api_id: config.api_management_config.as_ref().and_then(|api| api.id.clone()),
        app_command_line: non_empty(config.app_command_line.as_deref()),
        app_scale_limit: config.function_app_scale_limit,
        application_insights_key: reserved.app_insights_key.clone(),
        application_insights_connection_string: reserved.app_insights_connection_string.clone(),
        application_stack: flatten_stack(config, reserved, os),
        auto_heal: flatten_auto_heal(config.auto_heal_enabled, config.auto_heal_rules.as_ref()),
        container_registry_use_managed_identity: config.acr_use_managed_identity_creds.unwrap_or(false),
        container_registry_managed_identity_client_id: non_empty(
            config.acr_user_managed_identity_id.as_deref(),
        ),
        cors: flatten_cors(config.cors.as_ref()),
        default_documents: config.default_documents.clone().unwrap_or_default(),
        detailed_error_logging_enabled: config.detailed_error_logging_enabled.unwrap_or(false),
        elastic_instance_minimum: config.minimum_elastic_instance_count,
        ftps_state: non_empty(config.ftps_state.as_deref()),
        health_check_path: non_empty(config.health_check_path.as_deref()),
        health_check_eviction_time_in_min: reserved.health_check_max_ping_failures,
        http2_enabled: config.http20_enabled.unwrap_or(false),
        http_logging_retention_days: reserved.http_logging_retention_days,
        ip_restrictions: flatten_ip_restrictions(config.ip_security_restrictions.as_deref()),
        ip_restriction_default_action: config.ip_security_restrictions_default_action.clone(),
        load_balancing_mode: config.load_balancing.clone(),
        managed_pipeline_mode: config.managed_pipeline_mode.clone(),
        minimum_tls_version: config.min_tls_version.clone(),
        pre_warmed_instance_count: config.pre_warmed_instance_count,
        remote_debugging_enabled: config.remote_debugging_enabled.unwrap_or(false),
        remote_debugging_version: config
            .remote_debugging_version
            .as_deref()
            .and_then(|v| non_empty(Some(v)))
            .map(|v| v.to_uppercase()),
        runtime_scale_monitoring_enabled: config
            .functions_runtime_scale_monitoring_enabled
            .unwrap_or(false),
        scm_ip_restrictions: flatten_ip_restrictions(config.scm_ip_security_restrictions.as_deref()),
        scm_ip_restriction_default_action: config.scm_ip_security_restrictions_default_action.clone(),
        scm_minimum_tls_version: config.scm_min_tls_version.clone(),
        scm_type: config.scm_type.clone(),
        scm_use_main_ip_restriction: config.scm_ip_security_restrictions_use_main.unwrap_or(false),
        use_32_bit_worker: config.use32_bit_worker_process.unwrap_or(defaults.use_32_bit_worker),
        vnet_route_all_enabled: config.vnet_route_all_enabled.unwrap_or(false),
        websockets_enabled: config.web_sockets_enabled.unwrap_or(false),
        worker_count: config.number_of_workers,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Re-derive the single application stack from the identifier and the
/// reserved settings that complete it
fn flatten_stack(
    config: &nested::SiteConfig,
    reserved: &ReservedSettings,
    os: OsFamily,
) -> Option<ApplicationStack> {
    let identifier = match os {
        OsFamily::Linux => config.linux_fx_version.as_deref(),
        OsFamily::Windows => config.windows_fx_version.as_deref(),
    };

    if let Some(mut stack) = stack::decode(identifier.unwrap_or_default(), os) {
        if let ApplicationStack::Docker(docker) = &mut stack {
            // The identifier only holds the host; keep the full URL when it names the same registry
            if let Some(url) = &reserved.docker_registry_url {
                let decoded = docker.registry_url.as_deref().unwrap_or(stack::DEFAULT_WINDOWS_REGISTRY);
                if stack::registry_host(url).eq_ignore_ascii_case(decoded) {
                    docker.registry_url = Some(url.clone());
                }
            }
            docker.registry_username = reserved.docker_registry_username.clone();
            docker.registry_password = reserved.docker_registry_password.clone();
        }
        return Some(stack);
    }

    match reserved.worker_runtime.as_deref() {
        Some("custom") => Some(ApplicationStack::CustomHandler),
        Some("node") => reserved
            .node_default_version
            .clone()
            .map(|version| ApplicationStack::Node { version }),
        // Windows web apps select node through the setting alone
        None if os == OsFamily::Windows => reserved
            .node_default_version
            .clone()
            .map(|version| ApplicationStack::Node { version }),
        _ => None,
    }
}

/// Flatten a full remote snapshot. Write-only values the remote never
/// returns are carried over from `previous`.
pub fn flatten_web_app(snapshot: &RemoteSnapshot, previous: Option<&WebApp>) -> WebApp {
    let site = &snapshot.site;
    let os = site
        .kind
        .as_deref()
        .map(OsFamily::from_site_kind)
        .or(previous.map(|p| p.os))
        .unwrap_or_default();
    let name = site
        .name
        .clone()
        .or_else(|| previous.map(|p| p.name.clone()))
        .unwrap_or_default();

    let (reserved, app_settings) = settings::classify(&snapshot.app_settings);
    let properties = site.properties.clone().unwrap_or_default();
    let site_config = snapshot.site_config.as_ref().or(properties.site_config.as_ref());

    if reserved.builtin_logging {
        tracing::debug!("{} present, builtin logging enabled", AZURE_WEB_JOBS_DASHBOARD);
    }

    WebApp {
        name,
        os,
        enabled: properties.enabled.unwrap_or(true),
        https_only: properties.https_only.unwrap_or(false),
        client_certificate_enabled: properties.client_cert_enabled.unwrap_or(false),
        client_certificate_mode: properties.client_cert_mode.clone(),
        functions_extension_version: reserved.functions_extension_version.clone(),
        storage: reserved.storage.clone(),
        builtin_logging_enabled: reserved.builtin_logging,
        content_share: reserved.content_share.clone(),
        content_share_connection_string: reserved.content_share_connection_string.clone(),
        app_settings,
        sticky_settings: flatten_sticky_settings(&snapshot.sticky_settings),
        connection_strings: flatten_connection_strings(&snapshot.connection_strings),
        auth_settings: flatten_auth_settings(
            snapshot.auth_settings.as_ref(),
            previous.and_then(|p| p.auth_settings.as_ref()),
        ),
        auth_settings_v2: flatten_auth_settings_v2(snapshot.auth_settings_v2.as_ref()),
        logs: flatten_logs(snapshot.logs.as_ref()),
        backup: flatten_backup(snapshot.backup.as_ref()),
        storage_mounts: flatten_storage_mounts(
            &snapshot.storage_mounts,
            previous.map(|p| p.storage_mounts.as_slice()).unwrap_or_default(),
        ),
        zip_deploy_file: previous.and_then(|p| p.zip_deploy_file.clone()),
        site_config: flatten_site_config(site_config, &reserved, os),
    }
}
