//! Application-Settings Classifier
//!
//! Splits a raw app-settings map into reserved keys, which carry structured
//! site configuration, and pass-through keys the user owns. [`synthesize`]
//! is the inverse.
//!
//! Every reserved key is described once in [`RESERVED_KEYS`] as an
//! extractor/synthesizer pair. A value the extractor cannot represent is left
//! in the pass-through map untouched, so nothing is ever dropped.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form app settings, keyed by setting name
pub type AppSettingsMap = BTreeMap<String, String>;

pub const FUNCTIONS_EXTENSION_VERSION: &str = "FUNCTIONS_EXTENSION_VERSION";
pub const FUNCTIONS_WORKER_RUNTIME: &str = "FUNCTIONS_WORKER_RUNTIME";
pub const WEBSITE_NODE_DEFAULT_VERSION: &str = "WEBSITE_NODE_DEFAULT_VERSION";
pub const WEBSITE_CONTENT_CONNECTION_STRING: &str = "WEBSITE_CONTENTAZUREFILECONNECTIONSTRING";
pub const WEBSITE_CONTENT_SHARE: &str = "WEBSITE_CONTENTSHARE";
pub const WEBSITE_CONTENT_OVER_VNET: &str = "WEBSITE_CONTENTOVERVNET";
pub const WEBSITE_HTTP_LOGGING_RETENTION_DAYS: &str = "WEBSITE_HTTPLOGGING_RETENTION_DAYS";
pub const DOCKER_REGISTRY_SERVER_URL: &str = "DOCKER_REGISTRY_SERVER_URL";
pub const DOCKER_REGISTRY_SERVER_USERNAME: &str = "DOCKER_REGISTRY_SERVER_USERNAME";
pub const DOCKER_REGISTRY_SERVER_PASSWORD: &str = "DOCKER_REGISTRY_SERVER_PASSWORD";
pub const APPINSIGHTS_INSTRUMENTATION_KEY: &str = "APPINSIGHTS_INSTRUMENTATIONKEY";
pub const APPINSIGHTS_CONNECTION_STRING: &str = "APPLICATIONINSIGHTS_CONNECTION_STRING";
pub const AZURE_WEB_JOBS_STORAGE: &str = "AzureWebJobsStorage";
pub const AZURE_WEB_JOBS_STORAGE_ACCOUNT: &str = "AzureWebJobsStorage__accountName";
pub const AZURE_WEB_JOBS_DASHBOARD: &str = "AzureWebJobsDashboard";
pub const AZURE_WEB_JOBS_DASHBOARD_ACCOUNT: &str = "AzureWebJobsDashboard__accountName";
pub const WEBSITE_HEALTHCHECK_MAX_PING_FAILURES: &str = "WEBSITE_HEALTHCHECK_MAXPINGFAILURES";

const KEY_VAULT_PREFIX: &str = "@Microsoft.KeyVault(";
const KEY_VAULT_SUFFIX: &str = ")";
const SECRET_URI_LABEL: &str = "SecretUri=";

// =============================================================================
// Structured fields
// =============================================================================

/// How a Key Vault reference was written inside the marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretReferenceStyle {
    /// `@Microsoft.KeyVault(<id>)`
    #[default]
    Bare,
    /// `@Microsoft.KeyVault(SecretUri=<id>)`
    SecretUri,
}

/// A Key Vault secret reference extracted from a setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretReference {
    pub id: String,
    #[serde(default)]
    pub style: SecretReferenceStyle,
}

impl SecretReference {
    /// Parse `@Microsoft.KeyVault(...)`, returning `None` for plain values
    pub fn parse(value: &str) -> Option<Self> {
        let inner = value
            .strip_prefix(KEY_VAULT_PREFIX)?
            .strip_suffix(KEY_VAULT_SUFFIX)?;

        let (id, style) = match inner.strip_prefix(SECRET_URI_LABEL) {
            Some(id) => (id, SecretReferenceStyle::SecretUri),
            None => (inner, SecretReferenceStyle::Bare),
        };

        if id.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            style,
        })
    }

    /// Render the reference back into its marker form
    pub fn to_setting_value(&self) -> String {
        match self.style {
            SecretReferenceStyle::Bare => format!("{}{}{}", KEY_VAULT_PREFIX, self.id, KEY_VAULT_SUFFIX),
            SecretReferenceStyle::SecretUri => format!(
                "{}{}{}{}",
                KEY_VAULT_PREFIX, SECRET_URI_LABEL, self.id, KEY_VAULT_SUFFIX
            ),
        }
    }
}

/// Storage account the functions host uses for its own state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageConnection {
    AccessKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protocol: Option<String>,
        account_name: String,
        account_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint_suffix: Option<String>,
    },
    KeyVault(SecretReference),
    ManagedIdentity { account_name: String },
}

impl StorageConnection {
    /// Build an access-key connection with the default protocol and suffix
    pub fn access_key(account_name: &str, account_key: &str) -> Self {
        StorageConnection::AccessKey {
            protocol: Some("https".to_string()),
            account_name: account_name.to_string(),
            account_key: account_key.to_string(),
            endpoint_suffix: Some("core.windows.net".to_string()),
        }
    }

    /// Parse an `AzureWebJobsStorage` value
    pub fn parse(value: &str) -> Option<Self> {
        if let Some(reference) = SecretReference::parse(value) {
            return Some(StorageConnection::KeyVault(reference));
        }

        let mut protocol = None;
        let mut account_name = None;
        let mut account_key = None;
        let mut endpoint_suffix = None;

        for part in value.split(';').filter(|p| !p.is_empty()) {
            let (key, val) = part.split_once('=')?;
            match key {
                "DefaultEndpointsProtocol" => protocol = Some(val.to_string()),
                "AccountName" => account_name = Some(val.to_string()),
                "AccountKey" => account_key = Some(val.to_string()),
                "EndpointSuffix" => endpoint_suffix = Some(val.to_string()),
                _ => return None,
            }
        }

        let connection = StorageConnection::AccessKey {
            protocol,
            account_name: account_name?,
            account_key: account_key?,
            endpoint_suffix,
        };

        // Reordered or decorated strings cannot be rebuilt byte for byte
        if connection.connection_string().as_deref() != Some(value) {
            return None;
        }

        Some(connection)
    }

    /// Connection string form, or `None` for identity-based connections
    pub fn connection_string(&self) -> Option<String> {
        match self {
            StorageConnection::AccessKey {
                protocol,
                account_name,
                account_key,
                endpoint_suffix,
            } => {
                let mut parts = Vec::with_capacity(4);
                if let Some(protocol) = protocol {
                    parts.push(format!("DefaultEndpointsProtocol={}", protocol));
                }
                parts.push(format!("AccountName={}", account_name));
                parts.push(format!("AccountKey={}", account_key));
                if let Some(suffix) = endpoint_suffix {
                    parts.push(format!("EndpointSuffix={}", suffix));
                }
                Some(parts.join(";"))
            },
            StorageConnection::KeyVault(reference) => Some(reference.to_setting_value()),
            StorageConnection::ManagedIdentity { .. } => None,
        }
    }

    pub fn account_name(&self) -> Option<&str> {
        match self {
            StorageConnection::AccessKey { account_name, .. }
            | StorageConnection::ManagedIdentity { account_name } => Some(account_name),
            StorageConnection::KeyVault(_) => None,
        }
    }
}

/// Structured fields carried by reserved app settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedSettings {
    pub functions_extension_version: Option<String>,
    pub worker_runtime: Option<String>,
    pub node_default_version: Option<String>,
    pub content_share_connection_string: Option<String>,
    pub content_share: Option<String>,
    pub http_logging_retention_days: Option<i64>,
    pub docker_registry_url: Option<String>,
    pub docker_registry_username: Option<String>,
    pub docker_registry_password: Option<String>,
    pub app_insights_key: Option<String>,
    pub app_insights_connection_string: Option<String>,
    pub storage: Option<StorageConnection>,
    /// Derived from the presence of the dashboard setting, never its value
    pub builtin_logging: bool,
    pub health_check_max_ping_failures: Option<i64>,
}

impl ReservedSettings {
    /// Take the content share settings from `live` where none are set here.
    /// The platform generates them on create and they are never authored.
    pub fn carry_content_settings(&mut self, live: &ReservedSettings) {
        if self.content_share.is_none() {
            self.content_share = live.content_share.clone();
        }
        if self.content_share_connection_string.is_none() {
            self.content_share_connection_string = live.content_share_connection_string.clone();
        }
    }
}

// =============================================================================
// Reserved key table
// =============================================================================

/// One reserved setting: how to pull it into [`ReservedSettings`] and how to
/// write it back out. Extractors return `false` when the value has a shape the
/// structured field cannot hold.
pub struct ReservedKey {
    pub name: &'static str,
    /// `false` for keys whose presence is all that is read
    carries_value: bool,
    extract: fn(&mut ReservedSettings, &str) -> bool,
    synthesize: fn(&ReservedSettings) -> Option<String>,
}

impl std::fmt::Debug for ReservedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservedKey").field("name", &self.name).finish()
    }
}

macro_rules! verbatim_key {
    ($name:expr, $field:ident) => {
        ReservedKey {
            name: $name,
            carries_value: true,
            extract: |reserved, value| {
                if reserved.$field.is_some() {
                    return false;
                }
                reserved.$field = Some(value.to_string());
                true
            },
            synthesize: |reserved| reserved.$field.clone(),
        }
    };
}

macro_rules! integer_key {
    ($name:expr, $field:ident) => {
        ReservedKey {
            name: $name,
            carries_value: true,
            extract: |reserved, value| match parse_canonical_int(value) {
                Some(n) if reserved.$field.is_none() => {
                    reserved.$field = Some(n);
                    true
                },
                _ => false,
            },
            synthesize: |reserved| reserved.$field.map(|n| n.to_string()),
        }
    };
}

/// All reserved keys, matched case-insensitively
pub static RESERVED_KEYS: &[ReservedKey] = &[
    verbatim_key!(FUNCTIONS_EXTENSION_VERSION, functions_extension_version),
    verbatim_key!(FUNCTIONS_WORKER_RUNTIME, worker_runtime),
    verbatim_key!(WEBSITE_NODE_DEFAULT_VERSION, node_default_version),
    verbatim_key!(WEBSITE_CONTENT_CONNECTION_STRING, content_share_connection_string),
    verbatim_key!(WEBSITE_CONTENT_SHARE, content_share),
    integer_key!(WEBSITE_HTTP_LOGGING_RETENTION_DAYS, http_logging_retention_days),
    verbatim_key!(DOCKER_REGISTRY_SERVER_URL, docker_registry_url),
    verbatim_key!(DOCKER_REGISTRY_SERVER_USERNAME, docker_registry_username),
    verbatim_key!(DOCKER_REGISTRY_SERVER_PASSWORD, docker_registry_password),
    verbatim_key!(APPINSIGHTS_INSTRUMENTATION_KEY, app_insights_key),
    verbatim_key!(APPINSIGHTS_CONNECTION_STRING, app_insights_connection_string),
    ReservedKey {
        name: AZURE_WEB_JOBS_STORAGE,
        carries_value: true,
        extract: |reserved, value| {
            if reserved.storage.is_some() {
                return false;
            }
            match StorageConnection::parse(value) {
                Some(storage) => {
                    reserved.storage = Some(storage);
                    true
                },
                None => false,
            }
        },
        synthesize: |reserved| reserved.storage.as_ref()?.connection_string(),
    },
    ReservedKey {
        name: AZURE_WEB_JOBS_STORAGE_ACCOUNT,
        carries_value: true,
        extract: |reserved, value| {
            if reserved.storage.is_some() || value.is_empty() {
                return false;
            }
            reserved.storage = Some(StorageConnection::ManagedIdentity {
                account_name: value.to_string(),
            });
            true
        },
        synthesize: |reserved| match &reserved.storage {
            Some(StorageConnection::ManagedIdentity { account_name }) => Some(account_name.clone()),
            _ => None,
        },
    },
    ReservedKey {
        name: AZURE_WEB_JOBS_DASHBOARD,
        carries_value: false,
        extract: |reserved, _| {
            reserved.builtin_logging = true;
            true
        },
        synthesize: |reserved| {
            if !reserved.builtin_logging {
                return None;
            }
            match &reserved.storage {
                Some(StorageConnection::ManagedIdentity { .. }) => None,
                Some(storage) => storage.connection_string(),
                None => Some(String::new()),
            }
        },
    },
    ReservedKey {
        name: AZURE_WEB_JOBS_DASHBOARD_ACCOUNT,
        carries_value: false,
        extract: |reserved, _| {
            reserved.builtin_logging = true;
            true
        },
        synthesize: |reserved| match &reserved.storage {
            Some(StorageConnection::ManagedIdentity { account_name }) if reserved.builtin_logging => {
                Some(account_name.clone())
            },
            _ => None,
        },
    },
    integer_key!(WEBSITE_HEALTHCHECK_MAX_PING_FAILURES, health_check_max_ping_failures),
];

/// Find the reserved-key rule for a setting name
pub fn reserved_key(name: &str) -> Option<&'static ReservedKey> {
    RESERVED_KEYS
        .iter()
        .find(|rule| rule.name.eq_ignore_ascii_case(name))
}

pub fn is_reserved(name: &str) -> bool {
    reserved_key(name).is_some()
}

/// Integers that print back exactly as written
fn parse_canonical_int(value: &str) -> Option<i64> {
    let n: i64 = value.parse().ok()?;
    (n.to_string() == value).then_some(n)
}

// =============================================================================
// Classify / Synthesize
// =============================================================================

/// A value-carrying key present under more than one spelling
fn is_ambiguous(raw: &AppSettingsMap, rule: &ReservedKey) -> bool {
    rule.carries_value && raw.keys().filter(|key| rule.name.eq_ignore_ascii_case(key)).count() > 1
}

/// Split raw settings into structured fields and pass-through settings.
/// A value-carrying reserved key spelled more than one way is ambiguous: every
/// spelling is passed through and the structured field stays unset.
pub fn classify(raw: &AppSettingsMap) -> (ReservedSettings, AppSettingsMap) {
    let mut reserved = ReservedSettings::default();
    let mut pass_through = AppSettingsMap::new();

    for (key, value) in raw {
        match reserved_key(key) {
            Some(rule) if is_ambiguous(raw, rule) => {
                tracing::debug!(
                    "Reserved setting {} is present under more than one spelling, passing {} through",
                    rule.name,
                    key
                );
                pass_through.insert(key.clone(), value.clone());
            },
            Some(rule) => {
                if !(rule.extract)(&mut reserved, value) {
                    tracing::debug!(
                        "Reserved setting {} has a value shape it cannot hold, passing through",
                        key
                    );
                    pass_through.insert(key.clone(), value.clone());
                }
            },
            None => {
                pass_through.insert(key.clone(), value.clone());
            },
        }
    }

    (reserved, pass_through)
}

/// Rebuild a raw settings map. A pass-through key that names a reserved key
/// replaces the synthesized value so no key appears twice.
pub fn synthesize(reserved: &ReservedSettings, pass_through: &AppSettingsMap) -> AppSettingsMap {
    let mut settings = AppSettingsMap::new();

    for rule in RESERVED_KEYS {
        if let Some(value) = (rule.synthesize)(reserved) {
            settings.insert(rule.name.to_string(), value);
        }
    }

    merge_user_settings(settings, pass_through)
}

/// Merge user settings over generated ones, matching names case-insensitively.
/// Only generated keys are replaced; user keys are never dropped.
pub fn merge_user_settings(generated: AppSettingsMap, user: &AppSettingsMap) -> AppSettingsMap {
    let mut settings: AppSettingsMap = generated
        .into_iter()
        .filter(|(name, _)| match user.keys().find(|key| key.eq_ignore_ascii_case(name)) {
            Some(key) => {
                tracing::debug!("User setting {} replaces generated {}", key, name);
                false
            },
            None => true,
        })
        .collect();

    settings.extend(user.iter().map(|(key, value)| (key.clone(), value.clone())));
    settings
}

/// Fill in the content share settings a new function app needs when it keeps
/// its content on a storage account it reaches with a connection string.
pub fn bootstrap_content_share(
    reserved: &mut ReservedSettings,
    pass_through: &AppSettingsMap,
    app_name: &str,
) -> Result<()> {
    let Some(connection) = reserved
        .storage
        .as_ref()
        .filter(|s| matches!(s, StorageConnection::AccessKey { .. }))
        .and_then(StorageConnection::connection_string)
    else {
        return Ok(());
    };

    if reserved.content_share_connection_string.is_none() {
        reserved.content_share_connection_string = Some(connection);
    }

    if reserved.content_share.is_none() {
        let over_vnet = pass_through
            .keys()
            .any(|k| k.eq_ignore_ascii_case(WEBSITE_CONTENT_OVER_VNET));
        if over_vnet {
            return Err(anyhow::anyhow!(
                "{} must be set when {} is set",
                WEBSITE_CONTENT_SHARE,
                WEBSITE_CONTENT_OVER_VNET
            ));
        }

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        reserved.content_share = Some(format!("{}-{}", app_name.to_lowercase(), &suffix[..4]));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> AppSettingsMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_key_vault_marker_round_trip() {
        let value = "@Microsoft.KeyVault(https://vault.vault.azure.net/secrets/foo/abc123)";
        let raw = map(&[(AZURE_WEB_JOBS_STORAGE, value)]);

        let (reserved, pass_through) = classify(&raw);
        assert!(pass_through.is_empty());
        let Some(StorageConnection::KeyVault(reference)) = &reserved.storage else {
            panic!("expected a key vault reference, got {:?}", reserved.storage);
        };
        assert_eq!(reference.id, "https://vault.vault.azure.net/secrets/foo/abc123");

        let rebuilt = synthesize(&reserved, &pass_through);
        assert_eq!(rebuilt[AZURE_WEB_JOBS_STORAGE], value);
    }

    #[test]
    fn test_key_vault_secret_uri_form_is_preserved() {
        let value = "@Microsoft.KeyVault(SecretUri=https://v.vault.azure.net/secrets/s/)";
        let reference = SecretReference::parse(value).unwrap();
        assert_eq!(reference.style, SecretReferenceStyle::SecretUri);
        assert_eq!(reference.id, "https://v.vault.azure.net/secrets/s/");
        assert_eq!(reference.to_setting_value(), value);
    }

    #[test]
    fn test_storage_connection_string_parsed() {
        let value = "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=a2V5==;EndpointSuffix=core.windows.net";
        let (reserved, pass_through) = classify(&map(&[(AZURE_WEB_JOBS_STORAGE, value)]));

        assert!(pass_through.is_empty());
        assert_eq!(
            reserved.storage,
            Some(StorageConnection::access_key("acct", "a2V5=="))
        );
        assert_eq!(synthesize(&reserved, &pass_through)[AZURE_WEB_JOBS_STORAGE], value);
    }

    #[test]
    fn test_malformed_storage_passes_through() {
        for value in [
            "UseDevelopmentStorage=true",
            "AccountName=acct",
            "AccountKey=k;AccountName=acct",
            "DefaultEndpointsProtocol=https;AccountName=a;AccountKey=k;BlobEndpoint=x",
        ] {
            let raw = map(&[(AZURE_WEB_JOBS_STORAGE, value)]);
            let (reserved, pass_through) = classify(&raw);
            assert_eq!(reserved.storage, None, "{value}");
            assert_eq!(pass_through[AZURE_WEB_JOBS_STORAGE], value);
            assert_eq!(synthesize(&reserved, &pass_through), raw);
        }
    }

    #[test]
    fn test_managed_identity_storage() {
        let raw = map(&[
            (AZURE_WEB_JOBS_STORAGE_ACCOUNT, "acct"),
            (AZURE_WEB_JOBS_DASHBOARD_ACCOUNT, "acct"),
        ]);
        let (reserved, pass_through) = classify(&raw);
        assert!(pass_through.is_empty());
        assert!(reserved.builtin_logging);
        assert_eq!(
            reserved.storage,
            Some(StorageConnection::ManagedIdentity {
                account_name: "acct".into()
            })
        );
        assert_eq!(synthesize(&reserved, &pass_through), raw);
    }

    #[test]
    fn test_builtin_logging_from_presence() {
        let (reserved, _) = classify(&map(&[(AZURE_WEB_JOBS_DASHBOARD, "")]));
        assert!(reserved.builtin_logging);

        let (reserved, _) = classify(&map(&[("OTHER", "x")]));
        assert!(!reserved.builtin_logging);
    }

    #[test]
    fn test_dashboard_mirrors_storage() {
        let reserved = ReservedSettings {
            storage: Some(StorageConnection::access_key("acct", "key")),
            builtin_logging: true,
            ..Default::default()
        };
        let settings = synthesize(&reserved, &AppSettingsMap::new());
        assert_eq!(settings[AZURE_WEB_JOBS_DASHBOARD], settings[AZURE_WEB_JOBS_STORAGE]);
    }

    #[test]
    fn test_integer_settings() {
        let (reserved, pass_through) = classify(&map(&[
            (WEBSITE_HEALTHCHECK_MAX_PING_FAILURES, "5"),
            (WEBSITE_HTTP_LOGGING_RETENTION_DAYS, "seven"),
        ]));
        assert_eq!(reserved.health_check_max_ping_failures, Some(5));
        assert_eq!(reserved.http_logging_retention_days, None);
        assert_eq!(pass_through[WEBSITE_HTTP_LOGGING_RETENTION_DAYS], "seven");

        let (reserved, _) = classify(&map(&[(WEBSITE_HEALTHCHECK_MAX_PING_FAILURES, "05")]));
        assert_eq!(reserved.health_check_max_ping_failures, None);
    }

    #[test]
    fn test_reserved_keys_match_case_insensitively() {
        let (reserved, pass_through) = classify(&map(&[("functions_extension_version", "~4")]));
        assert_eq!(reserved.functions_extension_version.as_deref(), Some("~4"));
        assert!(pass_through.is_empty());
    }

    #[test]
    fn test_classify_synthesize_fixed_point() {
        let raw = map(&[
            (FUNCTIONS_EXTENSION_VERSION, "~4"),
            (FUNCTIONS_WORKER_RUNTIME, "python"),
            (AZURE_WEB_JOBS_STORAGE, "@Microsoft.KeyVault(VaultName=v;SecretName=s)"),
            (AZURE_WEB_JOBS_DASHBOARD, "whatever"),
            (WEBSITE_HEALTHCHECK_MAX_PING_FAILURES, "3"),
            (DOCKER_REGISTRY_SERVER_URL, "https://mcr.microsoft.com"),
            (APPINSIGHTS_INSTRUMENTATION_KEY, "ikey"),
            ("CUSTOM_SETTING", "value"),
        ]);

        let (first, pass_through) = classify(&raw);
        let (second, second_pass) = classify(&synthesize(&first, &pass_through));
        assert_eq!(first, second);
        assert_eq!(pass_through, second_pass);
    }

    #[test]
    fn test_reserved_key_spelled_twice_passes_through() {
        let raw = map(&[
            (WEBSITE_HTTP_LOGGING_RETENTION_DAYS, "7"),
            ("website_httplogging_retention_days", "x"),
        ]);

        let (first, pass_through) = classify(&raw);
        assert_eq!(first.http_logging_retention_days, None);
        assert_eq!(pass_through, raw);

        let (second, second_pass) = classify(&synthesize(&first, &pass_through));
        assert_eq!(first, second);
        assert_eq!(pass_through, second_pass);
    }

    #[test]
    fn test_extractors_keep_first_value() {
        let mut reserved = ReservedSettings::default();
        let rule = reserved_key(FUNCTIONS_EXTENSION_VERSION).unwrap();
        assert!((rule.extract)(&mut reserved, "~4"));
        assert!(!(rule.extract)(&mut reserved, "~3"));
        assert_eq!(reserved.functions_extension_version.as_deref(), Some("~4"));

        let rule = reserved_key(WEBSITE_HEALTHCHECK_MAX_PING_FAILURES).unwrap();
        assert!((rule.extract)(&mut reserved, "5"));
        assert!(!(rule.extract)(&mut reserved, "9"));
        assert_eq!(reserved.health_check_max_ping_failures, Some(5));
    }

    #[test]
    fn test_reserved_never_appears_twice() {
        let reserved = ReservedSettings {
            functions_extension_version: Some("~4".into()),
            ..Default::default()
        };
        let user = map(&[("functions_extension_version", "~3")]);
        let settings = synthesize(&reserved, &user);

        let matches: Vec<_> = settings
            .keys()
            .filter(|k| k.eq_ignore_ascii_case(FUNCTIONS_EXTENSION_VERSION))
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(settings["functions_extension_version"], "~3");
    }

    #[test]
    fn test_is_reserved() {
        assert!(is_reserved("AzureWebJobsStorage"));
        assert!(is_reserved("docker_registry_server_url"));
        assert!(!is_reserved("WEBSITE_RUN_FROM_PACKAGE"));
    }

    #[test]
    fn test_bootstrap_content_share() {
        let mut reserved = ReservedSettings {
            storage: Some(StorageConnection::access_key("acct", "key")),
            ..Default::default()
        };
        bootstrap_content_share(&mut reserved, &AppSettingsMap::new(), "MyFunc").unwrap();

        let share = reserved.content_share.unwrap();
        assert!(share.starts_with("myfunc-"));
        assert_eq!(share.len(), "myfunc-".len() + 4);
        assert_eq!(
            reserved.content_share_connection_string,
            reserved.storage.as_ref().unwrap().connection_string()
        );
    }

    #[test]
    fn test_bootstrap_content_share_requires_share_over_vnet() {
        let mut reserved = ReservedSettings {
            storage: Some(StorageConnection::access_key("acct", "key")),
            ..Default::default()
        };
        let user = map(&[(WEBSITE_CONTENT_OVER_VNET, "1")]);
        assert!(bootstrap_content_share(&mut reserved, &user, "app").is_err());
    }

    #[test]
    fn test_bootstrap_content_share_skips_identity_storage() {
        let mut reserved = ReservedSettings {
            storage: Some(StorageConnection::ManagedIdentity {
                account_name: "acct".into(),
            }),
            ..Default::default()
        };
        bootstrap_content_share(&mut reserved, &AppSettingsMap::new(), "app").unwrap();
        assert_eq!(reserved.content_share, None);
    }
}
