//! Config Expander
//!
//! Turns the flat model into remote request bodies.
//!
//! On create every set field is written and unset fields are omitted. On
//! update the expander starts from the previous remote value and only
//! overwrites fields the [`ChangeSet`] marks, sending an explicit empty value
//! when a field was cleared. Boolean toggles are always sent.

use super::access::{expand_cors, expand_ip_restrictions};
use super::autoheal::expand_auto_heal;
use super::changes::ChangeSet;
use super::model::{SiteConfig, WebApp};
use super::nested;
use super::settings::{self, AppSettingsMap};
use super::stack::{self, OsFamily};
use anyhow::Result;

pub struct SiteConfigExpander<'a> {
    previous: Option<&'a nested::SiteConfig>,
    changes: Option<&'a ChangeSet>,
    function_app: bool,
}

impl<'a> SiteConfigExpander<'a> {
    pub fn for_create() -> Self {
        Self {
            previous: None,
            changes: None,
            function_app: false,
        }
    }

    pub fn for_update(previous: Option<&'a nested::SiteConfig>, changes: &'a ChangeSet) -> Self {
        Self {
            previous,
            changes: Some(changes),
            function_app: false,
        }
    }

    /// Expand for a function app, which names some stacks differently
    pub fn function_app(mut self, function_app: bool) -> Self {
        self.function_app = function_app;
        self
    }

    /// Write `value` into `target` if this field should be sent
    fn write<T: Default>(&self, field: &str, target: &mut Option<T>, value: Option<T>) {
        match self.changes {
            None => {
                if value.is_some() {
                    *target = value;
                }
            },
            Some(changes) if changes.has_change(&format!("site_config.{}", field)) => {
                *target = Some(value.unwrap_or_default());
            },
            Some(_) => {},
        }
    }

    /// Expand the site config. `app_settings` is embedded when given, which
    /// is only the case on create; updates push settings separately.
    pub fn expand(
        &self,
        flat: &SiteConfig,
        app_settings: Option<&AppSettingsMap>,
        os: OsFamily,
    ) -> nested::SiteConfig {
        let mut out = self.previous.cloned().unwrap_or_default();

        out.always_on = Some(flat.always_on);
        out.acr_use_managed_identity_creds = Some(flat.container_registry_use_managed_identity);
        out.http20_enabled = Some(flat.http2_enabled);
        out.remote_debugging_enabled = Some(flat.remote_debugging_enabled);
        out.functions_runtime_scale_monitoring_enabled = Some(flat.runtime_scale_monitoring_enabled);
        out.scm_ip_security_restrictions_use_main = Some(flat.scm_use_main_ip_restriction);
        out.use32_bit_worker_process = Some(flat.use_32_bit_worker);
        out.vnet_route_all_enabled = Some(flat.vnet_route_all_enabled);
        out.web_sockets_enabled = Some(flat.websockets_enabled);
        out.auto_heal_enabled = Some(flat.auto_heal.is_some());

        let fx_version = flat
            .application_stack
            .as_ref()
            .map(|stack| stack::encode_for_site(stack, os, self.function_app));
        match os {
            OsFamily::Linux => self.write("application_stack", &mut out.linux_fx_version, fx_version),
            OsFamily::Windows => self.write("application_stack", &mut out.windows_fx_version, fx_version),
        }

        self.write(
            "api_definition_url",
            &mut out.api_definition,
            flat.api_definition_url.clone().map(|url| nested::ApiDefinitionInfo { url: Some(url) }),
        );
        self.write(
            "api_management_api_id",
            &mut out.api_management_config,
            flat.api_management_api_id.clone().map(|id| nested::ApiManagementConfig { id: Some(id) }),
        );
        self.write("app_command_line", &mut out.app_command_line, flat.app_command_line.clone());
        self.write("app_scale_limit", &mut out.function_app_scale_limit, flat.app_scale_limit);
        self.write(
            "auto_heal",
            &mut out.auto_heal_rules,
            flat.auto_heal.as_ref().map(expand_auto_heal),
        );
        self.write(
            "container_registry_managed_identity_client_id",
            &mut out.acr_user_managed_identity_id,
            flat.container_registry_managed_identity_client_id.clone(),
        );
        self.write("cors", &mut out.cors, flat.cors.as_ref().map(expand_cors));
        self.write(
            "default_documents",
            &mut out.default_documents,
            non_empty(flat.default_documents.clone()),
        );
        self.write(
            "elastic_instance_minimum",
            &mut out.minimum_elastic_instance_count,
            flat.elastic_instance_minimum,
        );
        self.write("ftps_state", &mut out.ftps_state, flat.ftps_state.clone());
        self.write("health_check_path", &mut out.health_check_path, flat.health_check_path.clone());
        self.write(
            "ip_restrictions",
            &mut out.ip_security_restrictions,
            non_empty(expand_ip_restrictions(&flat.ip_restrictions)),
        );
        self.write(
            "ip_restriction_default_action",
            &mut out.ip_security_restrictions_default_action,
            flat.ip_restriction_default_action.clone(),
        );
        self.write("load_balancing_mode", &mut out.load_balancing, flat.load_balancing_mode.clone());
        self.write(
            "managed_pipeline_mode",
            &mut out.managed_pipeline_mode,
            flat.managed_pipeline_mode.clone(),
        );
        self.write("minimum_tls_version", &mut out.min_tls_version, flat.minimum_tls_version.clone());
        self.write(
            "pre_warmed_instance_count",
            &mut out.pre_warmed_instance_count,
            flat.pre_warmed_instance_count,
        );
        self.write(
            "remote_debugging_version",
            &mut out.remote_debugging_version,
            flat.remote_debugging_version.clone(),
        );
        self.write(
            "scm_ip_restrictions",
            &mut out.scm_ip_security_restrictions,
            non_empty(expand_ip_restrictions(&flat.scm_ip_restrictions)),
        );
        self.write(
            "scm_ip_restriction_default_action",
            &mut out.scm_ip_security_restrictions_default_action,
            flat.scm_ip_restriction_default_action.clone(),
        );
        self.write(
            "scm_minimum_tls_version",
            &mut out.scm_min_tls_version,
            flat.scm_minimum_tls_version.clone(),
        );
        self.write("worker_count", &mut out.number_of_workers, flat.worker_count);

        // Read-only on the remote side
        out.detailed_error_logging_enabled = None;
        out.scm_type = None;

        out.app_settings = app_settings.map(|settings| {
            settings
                .iter()
                .map(|(name, value)| nested::NameValuePair {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect()
        });

        out
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

/// App settings to write when updating `app`. On function apps the content
/// share settings missing from the flat model come from `live`, and any still
/// missing are bootstrapped as on create.
pub fn expand_app_settings_for_update(app: &WebApp, live: Option<&AppSettingsMap>) -> Result<AppSettingsMap> {
    let mut reserved = app.reserved_settings();
    if app.is_function_app() {
        if let Some(live) = live {
            let (live_reserved, _) = settings::classify(live);
            reserved.carry_content_settings(&live_reserved);
        }
        settings::bootstrap_content_share(&mut reserved, &app.app_settings, &app.name)?;
    }
    Ok(settings::synthesize(&reserved, &app.app_settings))
}

/// Build the full site body used to create `app`
pub fn expand_web_app_for_create(app: &WebApp) -> Result<nested::Site> {
    let mut reserved = app.reserved_settings();
    if app.is_function_app() {
        settings::bootstrap_content_share(&mut reserved, &app.app_settings, &app.name)?;
    }
    let app_settings = settings::synthesize(&reserved, &app.app_settings);

    let site_config = SiteConfigExpander::for_create()
        .function_app(app.is_function_app())
        .expand(&app.site_config, Some(&app_settings), app.os);

    Ok(expand_site(app, site_config))
}

/// Wrap a site config in the site body with the top-level properties
pub fn expand_site(app: &WebApp, site_config: nested::SiteConfig) -> nested::Site {
    let kind = match (app.is_function_app(), app.os) {
        (true, OsFamily::Linux) => "functionapp,linux",
        (true, OsFamily::Windows) => "functionapp",
        (false, OsFamily::Linux) => "app,linux",
        (false, OsFamily::Windows) => "app",
    };

    nested::Site {
        name: Some(app.name.clone()),
        kind: Some(kind.to_string()),
        properties: Some(nested::SiteProperties {
            enabled: Some(app.enabled),
            https_only: Some(app.https_only),
            client_cert_enabled: Some(app.client_certificate_enabled),
            client_cert_mode: app.client_certificate_mode.clone(),
            site_config: Some(site_config),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::settings::{
        StorageConnection, FUNCTIONS_WORKER_RUNTIME, WEBSITE_CONTENT_CONNECTION_STRING, WEBSITE_CONTENT_SHARE,
    };
    use crate::site::stack::ApplicationStack;

    #[test]
    fn test_create_omits_unset_fields_but_sends_booleans() {
        let flat = SiteConfig::default();
        let nested = SiteConfigExpander::for_create().expand(&flat, None, OsFamily::Linux);

        assert_eq!(nested.always_on, Some(false));
        assert_eq!(nested.use32_bit_worker_process, Some(true));
        assert_eq!(nested.health_check_path, None);
        assert_eq!(nested.linux_fx_version, None);
        assert_eq!(nested.ip_security_restrictions, None);
        assert_eq!(nested.app_settings, None);
    }

    #[test]
    fn test_stack_goes_to_os_specific_field() {
        let flat = SiteConfig {
            application_stack: Some(ApplicationStack::Python { version: "3.11".into() }),
            ..Default::default()
        };

        let linux = SiteConfigExpander::for_create().expand(&flat, None, OsFamily::Linux);
        assert_eq!(linux.linux_fx_version.as_deref(), Some("PYTHON|3.11"));
        assert_eq!(linux.windows_fx_version, None);

        let windows = SiteConfigExpander::for_create().expand(&flat, None, OsFamily::Windows);
        assert_eq!(windows.windows_fx_version.as_deref(), Some("PYTHON|3.11"));
        assert_eq!(windows.linux_fx_version, None);
    }

    #[test]
    fn test_update_keeps_unchanged_fields_from_previous() {
        let previous = nested::SiteConfig {
            health_check_path: Some("/healthz".into()),
            ftps_state: Some("Disabled".into()),
            linux_fx_version: Some("NODE|18-lts".into()),
            ..Default::default()
        };
        let flat = SiteConfig {
            ftps_state: Some("FtpsOnly".into()),
            ..Default::default()
        };
        let mut changes = ChangeSet::new();
        changes.mark("site_config.ftps_state");

        let nested =
            SiteConfigExpander::for_update(Some(&previous), &changes).expand(&flat, None, OsFamily::Linux);
        assert_eq!(nested.ftps_state.as_deref(), Some("FtpsOnly"));
        assert_eq!(nested.health_check_path.as_deref(), Some("/healthz"));
        assert_eq!(nested.linux_fx_version.as_deref(), Some("NODE|18-lts"));
    }

    #[test]
    fn test_update_sends_cleared_values() {
        let previous = nested::SiteConfig {
            health_check_path: Some("/healthz".into()),
            linux_fx_version: Some("NODE|18-lts".into()),
            ..Default::default()
        };
        let mut changes = ChangeSet::new();
        changes.mark("site_config.health_check_path");
        changes.mark("site_config.application_stack");

        let nested = SiteConfigExpander::for_update(Some(&previous), &changes).expand(
            &SiteConfig::default(),
            None,
            OsFamily::Linux,
        );
        assert_eq!(nested.health_check_path.as_deref(), Some(""));
        assert_eq!(nested.linux_fx_version.as_deref(), Some(""));
    }

    #[test]
    fn test_dotnet_name_depends_on_site() {
        let flat = SiteConfig {
            application_stack: Some(ApplicationStack::DotNet { version: "8.0".into() }),
            ..Default::default()
        };

        let web = SiteConfigExpander::for_create().expand(&flat, None, OsFamily::Linux);
        assert_eq!(web.linux_fx_version.as_deref(), Some("DOTNETCORE|8.0"));

        let function = SiteConfigExpander::for_create()
            .function_app(true)
            .expand(&flat, None, OsFamily::Linux);
        assert_eq!(function.linux_fx_version.as_deref(), Some("DOTNET|8.0"));
    }

    #[test]
    fn test_read_only_fields_are_not_sent() {
        let previous = nested::SiteConfig {
            scm_type: Some("LocalGit".into()),
            detailed_error_logging_enabled: Some(true),
            ..Default::default()
        };
        let changes = ChangeSet::new();
        let nested = SiteConfigExpander::for_update(Some(&previous), &changes).expand(
            &SiteConfig::default(),
            None,
            OsFamily::Linux,
        );
        assert_eq!(nested.scm_type, None);
        assert_eq!(nested.detailed_error_logging_enabled, None);
    }

    #[test]
    fn test_create_function_app() {
        let mut app = WebApp::new("MyFunc", OsFamily::Linux);
        app.functions_extension_version = Some("~4".into());
        app.storage = Some(StorageConnection::access_key("acct", "key"));
        app.site_config.application_stack = Some(ApplicationStack::Python { version: "3.11".into() });
        app.app_settings.insert("FOO".into(), "bar".into());

        let site = expand_web_app_for_create(&app).unwrap();
        assert_eq!(site.kind.as_deref(), Some("functionapp,linux"));

        let config = site.properties.unwrap().site_config.unwrap();
        let settings: AppSettingsMap = config
            .app_settings
            .unwrap()
            .into_iter()
            .map(|pair| (pair.name, pair.value))
            .collect();
        assert_eq!(settings[FUNCTIONS_WORKER_RUNTIME], "python");
        assert_eq!(settings["FOO"], "bar");
        assert!(settings[WEBSITE_CONTENT_SHARE].starts_with("myfunc-"));
        assert_eq!(config.linux_fx_version.as_deref(), Some("PYTHON|3.11"));
    }

    fn function_app() -> WebApp {
        let mut app = WebApp::new("MyFunc", OsFamily::Linux);
        app.functions_extension_version = Some("~4".into());
        app.storage = Some(StorageConnection::access_key("acct", "key"));
        app
    }

    #[test]
    fn test_update_keeps_live_content_share() {
        let app = function_app();
        let live: AppSettingsMap = [
            (WEBSITE_CONTENT_SHARE.to_string(), "myfunc-1a2b".to_string()),
            (WEBSITE_CONTENT_CONNECTION_STRING.to_string(), "live-connection".to_string()),
        ]
        .into_iter()
        .collect();

        let settings = expand_app_settings_for_update(&app, Some(&live)).unwrap();
        assert_eq!(settings[WEBSITE_CONTENT_SHARE], "myfunc-1a2b");
        assert_eq!(settings[WEBSITE_CONTENT_CONNECTION_STRING], "live-connection");
    }

    #[test]
    fn test_update_prefers_authored_content_share() {
        let mut app = function_app();
        app.content_share = Some("authored".into());
        let live: AppSettingsMap = [(WEBSITE_CONTENT_SHARE.to_string(), "myfunc-1a2b".to_string())]
            .into_iter()
            .collect();

        let settings = expand_app_settings_for_update(&app, Some(&live)).unwrap();
        assert_eq!(settings[WEBSITE_CONTENT_SHARE], "authored");
    }

    #[test]
    fn test_update_bootstraps_missing_content_share() {
        let settings = expand_app_settings_for_update(&function_app(), None).unwrap();
        assert!(settings[WEBSITE_CONTENT_SHARE].starts_with("myfunc-"));
        assert!(settings[WEBSITE_CONTENT_CONNECTION_STRING].contains("AccountName=acct"));
    }

    #[test]
    fn test_update_of_web_app_ignores_content_settings() {
        let app = WebApp::new("web", OsFamily::Linux);
        let live: AppSettingsMap = [(WEBSITE_CONTENT_SHARE.to_string(), "share".to_string())]
            .into_iter()
            .collect();

        let settings = expand_app_settings_for_update(&app, Some(&live)).unwrap();
        assert!(!settings.contains_key(WEBSITE_CONTENT_SHARE));
    }
}
