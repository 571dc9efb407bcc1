//! Authentication settings (v2)
//!
//! The v2 document replaces v1 once the site's v1 settings report
//! `configVersion: v2`. Only the Active Directory provider is modelled. The
//! client secret itself never travels here; v2 references it by app-setting
//! name.

use super::nested;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RUNTIME_VERSION: &str = "~1";
pub const DEFAULT_UNAUTHENTICATED_ACTION: &str = "RedirectToLoginPage";
pub const DEFAULT_API_PREFIX: &str = "/.auth";

fn default_runtime_version() -> String {
    DEFAULT_RUNTIME_VERSION.to_string()
}

fn default_unauthenticated_action() -> String {
    DEFAULT_UNAUTHENTICATED_ACTION.to_string()
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthV2Settings {
    #[serde(default)]
    pub auth_enabled: bool,
    #[serde(default = "default_runtime_version")]
    pub runtime_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file_path: Option<String>,
    #[serde(default)]
    pub require_authentication: bool,
    #[serde(default = "default_unauthenticated_action")]
    pub unauthenticated_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_paths: Vec<String>,
    #[serde(default = "default_true")]
    pub require_https: bool,
    #[serde(default = "default_api_prefix")]
    pub http_route_api_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_directory_v2: Option<ActiveDirectoryV2>,
    #[serde(default)]
    pub login: AuthV2Login,
}

impl Default for AuthV2Settings {
    fn default() -> Self {
        Self {
            auth_enabled: false,
            runtime_version: default_runtime_version(),
            config_file_path: None,
            require_authentication: false,
            unauthenticated_action: default_unauthenticated_action(),
            default_provider: None,
            excluded_paths: Vec::new(),
            require_https: true,
            http_route_api_prefix: default_api_prefix(),
            active_directory_v2: None,
            login: AuthV2Login::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDirectoryV2 {
    pub client_id: String,
    /// Issuer URL, e.g. `https://login.microsoftonline.com/<tenant>/v2.0`
    pub tenant_auth_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_setting_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_audiences: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthV2Login {
    #[serde(default)]
    pub token_store_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_external_redirect_urls: Vec<String>,
}

/// Expand v2 auth settings. A removed block turns the platform off.
pub fn expand_auth_settings_v2(auth: Option<&AuthV2Settings>) -> nested::SiteAuthSettingsV2 {
    let Some(auth) = auth else {
        return nested::SiteAuthSettingsV2 {
            platform: Some(nested::AuthPlatform {
                enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
    };

    let azure_active_directory = auth.active_directory_v2.as_ref().map(|aad| nested::AzureActiveDirectory {
        enabled: Some(true),
        registration: Some(nested::AzureActiveDirectoryRegistration {
            client_id: Some(aad.client_id.clone()),
            client_secret_setting_name: aad.client_secret_setting_name.clone(),
            open_id_issuer: Some(aad.tenant_auth_endpoint.clone()),
        }),
        validation: Some(nested::AzureActiveDirectoryValidation {
            allowed_audiences: Some(aad.allowed_audiences.clone()),
        }),
    });

    nested::SiteAuthSettingsV2 {
        platform: Some(nested::AuthPlatform {
            enabled: Some(auth.auth_enabled),
            runtime_version: Some(auth.runtime_version.clone()),
            config_file_path: auth.config_file_path.clone().filter(|p| !p.is_empty()),
        }),
        global_validation: Some(nested::GlobalValidation {
            require_authentication: Some(auth.require_authentication),
            unauthenticated_client_action: Some(auth.unauthenticated_action.clone()),
            redirect_to_provider: auth.default_provider.clone().filter(|p| !p.is_empty()),
            excluded_paths: Some(auth.excluded_paths.clone()),
        }),
        identity_providers: Some(nested::IdentityProviders { azure_active_directory }),
        login: Some(nested::AuthLogin {
            token_store: Some(nested::TokenStore {
                enabled: Some(auth.login.token_store_enabled),
            }),
            allowed_external_redirect_urls: Some(auth.login.allowed_external_redirect_urls.clone()),
        }),
        http_settings: Some(nested::AuthHttpSettings {
            require_https: Some(auth.require_https),
            routes: Some(nested::AuthHttpRoutes {
                api_prefix: Some(auth.http_route_api_prefix.clone()),
            }),
        }),
    }
}

/// Flatten v2 auth settings. A document without a platform block reads as
/// absent; a disabled platform with nothing else configured does too.
pub fn flatten_auth_settings_v2(remote: Option<&nested::SiteAuthSettingsV2>) -> Option<AuthV2Settings> {
    let remote = remote?;
    let platform = remote.platform.as_ref()?;
    let mut out = AuthV2Settings {
        auth_enabled: platform.enabled.unwrap_or(false),
        config_file_path: platform.config_file_path.clone().filter(|p| !p.is_empty()),
        ..Default::default()
    };
    if let Some(version) = platform.runtime_version.clone().filter(|v| !v.is_empty()) {
        out.runtime_version = version;
    }

    if let Some(global) = &remote.global_validation {
        out.require_authentication = global.require_authentication.unwrap_or(false);
        if let Some(action) = global.unauthenticated_client_action.clone() {
            out.unauthenticated_action = action;
        }
        out.default_provider = global.redirect_to_provider.clone().filter(|p| !p.is_empty());
        out.excluded_paths = global.excluded_paths.clone().unwrap_or_default();
    }

    if let Some(http) = &remote.http_settings {
        out.require_https = http.require_https.unwrap_or(true);
        if let Some(prefix) = http.routes.as_ref().and_then(|r| r.api_prefix.clone()) {
            out.http_route_api_prefix = prefix;
        }
    }

    if let Some(login) = &remote.login {
        out.login = AuthV2Login {
            token_store_enabled: login.token_store.as_ref().and_then(|t| t.enabled).unwrap_or(false),
            allowed_external_redirect_urls: login.allowed_external_redirect_urls.clone().unwrap_or_default(),
        };
    }

    out.active_directory_v2 = remote
        .identity_providers
        .as_ref()
        .and_then(|providers| providers.azure_active_directory.as_ref())
        .filter(|aad| aad.enabled.unwrap_or(true))
        .and_then(|aad| {
            let registration = aad.registration.as_ref()?;
            Some(ActiveDirectoryV2 {
                client_id: registration.client_id.clone().unwrap_or_default(),
                tenant_auth_endpoint: registration.open_id_issuer.clone().unwrap_or_default(),
                client_secret_setting_name: registration
                    .client_secret_setting_name
                    .clone()
                    .filter(|s| !s.is_empty()),
                allowed_audiences: aad
                    .validation
                    .as_ref()
                    .and_then(|v| v.allowed_audiences.clone())
                    .unwrap_or_default(),
            })
        });

    if !out.auth_enabled && out == AuthV2Settings::default() {
        return None;
    }
    Some(out)
}

/// Whether the v1 document says the site has moved to v2
pub fn uses_auth_v2(v1: &nested::SiteAuthSettings) -> bool {
    v1.config_version
        .as_deref()
        .is_some_and(|version| version.eq_ignore_ascii_case("v2"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthV2Settings {
        AuthV2Settings {
            auth_enabled: true,
            require_authentication: true,
            unauthenticated_action: "Return401".into(),
            default_provider: Some("azureactivedirectory".into()),
            excluded_paths: vec!["/health".into()],
            active_directory_v2: Some(ActiveDirectoryV2 {
                client_id: "client".into(),
                tenant_auth_endpoint: "https://login.microsoftonline.com/tenant/v2.0".into(),
                client_secret_setting_name: Some("MICROSOFT_PROVIDER_AUTHENTICATION_SECRET".into()),
                allowed_audiences: vec!["api://app".into()],
            }),
            login: AuthV2Login {
                token_store_enabled: true,
                allowed_external_redirect_urls: vec!["https://example.com".into()],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_expand_then_flatten_keeps_settings() {
        let expanded = expand_auth_settings_v2(Some(&auth()));
        assert_eq!(flatten_auth_settings_v2(Some(&expanded)), Some(auth()));
    }

    #[test]
    fn test_expand_wire_shape() {
        let expanded = expand_auth_settings_v2(Some(&auth()));
        let json = serde_json::to_value(&expanded).unwrap();

        assert_eq!(json["platform"]["enabled"], true);
        assert_eq!(json["platform"]["runtimeVersion"], "~1");
        assert_eq!(json["globalValidation"]["unauthenticatedClientAction"], "Return401");
        assert_eq!(json["globalValidation"]["redirectToProvider"], "azureactivedirectory");
        assert_eq!(
            json["identityProviders"]["azureActiveDirectory"]["registration"]["openIdIssuer"],
            "https://login.microsoftonline.com/tenant/v2.0"
        );
        assert_eq!(json["login"]["tokenStore"]["enabled"], true);
        assert_eq!(json["httpSettings"]["routes"]["apiPrefix"], "/.auth");
    }

    #[test]
    fn test_removed_block_turns_platform_off() {
        let expanded = expand_auth_settings_v2(None);
        assert_eq!(expanded.platform.and_then(|p| p.enabled), Some(false));
        assert_eq!(expanded.identity_providers, None);
    }

    #[test]
    fn test_untouched_remote_is_none() {
        let remote = expand_auth_settings_v2(None);
        assert_eq!(flatten_auth_settings_v2(Some(&remote)), None);
        assert_eq!(flatten_auth_settings_v2(None), None);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let parsed: AuthV2Settings = serde_json::from_str(r#"{"auth_enabled": true}"#).unwrap();
        assert_eq!(parsed.runtime_version, "~1");
        assert_eq!(parsed.unauthenticated_action, "RedirectToLoginPage");
        assert!(parsed.require_https);
        assert_eq!(parsed.http_route_api_prefix, "/.auth");
    }

    #[test]
    fn test_config_version_gate() {
        let mut v1 = nested::SiteAuthSettings::default();
        assert!(!uses_auth_v2(&v1));
        v1.config_version = Some("V2".into());
        assert!(uses_auth_v2(&v1));
        v1.config_version = Some("v1".into());
        assert!(!uses_auth_v2(&v1));
    }
}
