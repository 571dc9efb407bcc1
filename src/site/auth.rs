//! Authentication settings (v1)
//!
//! Only the Active Directory provider is modelled. Client secrets are
//! write-only on the remote side and are carried over from the previous flat
//! value on read.

use super::nested;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unauthenticated_client_action: Option<String>,
    #[serde(default)]
    pub token_store_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_external_redirect_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_directory: Option<ActiveDirectoryAuth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDirectoryAuth {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_setting_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_audiences: Vec<String>,
}

/// Expand auth settings. A removed block disables auth and clears secrets.
pub fn expand_auth_settings(auth: Option<&AuthSettings>) -> nested::SiteAuthSettings {
    let Some(auth) = auth else {
        return nested::SiteAuthSettings {
            enabled: Some(false),
            client_secret: Some(String::new()),
            client_secret_setting_name: Some(String::new()),
            ..Default::default()
        };
    };

    let mut out = nested::SiteAuthSettings {
        enabled: Some(auth.enabled),
        default_provider: auth.default_provider.clone(),
        issuer: auth.issuer.clone(),
        runtime_version: auth.runtime_version.clone(),
        unauthenticated_client_action: auth.unauthenticated_client_action.clone(),
        token_store_enabled: Some(auth.token_store_enabled),
        allowed_external_redirect_urls: Some(auth.allowed_external_redirect_urls.clone()),
        ..Default::default()
    };

    if let Some(aad) = &auth.active_directory {
        out.client_id = Some(aad.client_id.clone());
        out.client_secret = aad.client_secret.clone();
        out.client_secret_setting_name = aad.client_secret_setting_name.clone();
        out.allowed_audiences = Some(aad.allowed_audiences.clone());
    }

    out
}

pub fn flatten_auth_settings(
    remote: Option<&nested::SiteAuthSettings>,
    previous: Option<&AuthSettings>,
) -> Option<AuthSettings> {
    let remote = remote?;
    if !remote.enabled.unwrap_or(false) {
        return None;
    }

    let previous_secret = previous
        .and_then(|p| p.active_directory.as_ref())
        .and_then(|aad| aad.client_secret.clone());

    let active_directory = remote
        .client_id
        .as_ref()
        .filter(|id| !id.is_empty())
        .map(|client_id| ActiveDirectoryAuth {
            client_id: client_id.clone(),
            client_secret: remote
                .client_secret
                .clone()
                .filter(|s| !s.is_empty())
                .or(previous_secret),
            client_secret_setting_name: remote
                .client_secret_setting_name
                .clone()
                .filter(|s| !s.is_empty()),
            allowed_audiences: remote.allowed_audiences.clone().unwrap_or_default(),
        });

    Some(AuthSettings {
        enabled: true,
        default_provider: remote.default_provider.clone(),
        issuer: remote.issuer.clone(),
        runtime_version: remote.runtime_version.clone(),
        unauthenticated_client_action: remote.unauthenticated_client_action.clone(),
        token_store_enabled: remote.token_store_enabled.unwrap_or(false),
        allowed_external_redirect_urls: remote.allowed_external_redirect_urls.clone().unwrap_or_default(),
        active_directory,
    })
}
