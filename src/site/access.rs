//! IP restrictions and CORS

use super::nested;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const HEADER_FORWARDED_HOST: &str = "x-forwarded-host";
const HEADER_FORWARDED_FOR: &str = "x-forwarded-for";
const HEADER_AZURE_FDID: &str = "x-azure-fdid";
const HEADER_FD_HEALTH_PROBE: &str = "x-fd-healthprobe";

const TAG_DEFAULT: &str = "Default";
const TAG_SERVICE: &str = "ServiceTag";

fn default_priority() -> i64 {
    65000
}

fn default_action() -> String {
    "Allow".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRestrictionHeaders {
    #[serde(default)]
    pub x_forwarded_host: Vec<String>,
    #[serde(default)]
    pub x_forwarded_for: Vec<String>,
    #[serde(default)]
    pub x_azure_fdid: Vec<String>,
    #[serde(default)]
    pub x_fd_health_probe: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRestriction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IpRestrictionHeaders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for IpRestriction {
    fn default() -> Self {
        Self {
            name: None,
            priority: default_priority(),
            action: default_action(),
            ip_address: None,
            service_tag: None,
            virtual_network_subnet_id: None,
            headers: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsSetting {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub support_credentials: bool,
}

// =============================================================================
// IP restrictions
// =============================================================================

pub fn expand_ip_restrictions(restrictions: &[IpRestriction]) -> Vec<nested::IpSecurityRestriction> {
    restrictions.iter().map(expand_ip_restriction).collect()
}

fn expand_ip_restriction(restriction: &IpRestriction) -> nested::IpSecurityRestriction {
    let mut out = nested::IpSecurityRestriction {
        name: restriction.name.clone(),
        priority: Some(restriction.priority),
        action: Some(restriction.action.clone()),
        description: restriction.description.clone(),
        headers: restriction.headers.as_ref().and_then(expand_headers),
        ..Default::default()
    };

    if let Some(address) = &restriction.ip_address {
        out.ip_address = Some(address.clone());
        out.tag = Some(TAG_DEFAULT.to_string());
    }
    if let Some(tag) = &restriction.service_tag {
        out.ip_address = Some(tag.clone());
        out.tag = Some(TAG_SERVICE.to_string());
    }
    if let Some(subnet) = &restriction.virtual_network_subnet_id {
        out.vnet_subnet_resource_id = Some(subnet.clone());
    }

    out
}

fn expand_headers(headers: &IpRestrictionHeaders) -> Option<BTreeMap<String, Vec<String>>> {
    let mut out = BTreeMap::new();
    for (name, values) in [
        (HEADER_FORWARDED_HOST, &headers.x_forwarded_host),
        (HEADER_FORWARDED_FOR, &headers.x_forwarded_for),
        (HEADER_AZURE_FDID, &headers.x_azure_fdid),
        (HEADER_FD_HEALTH_PROBE, &headers.x_fd_health_probe),
    ] {
        if !values.is_empty() {
            out.insert(name.to_string(), values.clone());
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Flatten restrictions, skipping the platform's implicit allow-all rule
pub fn flatten_ip_restrictions(restrictions: Option<&[nested::IpSecurityRestriction]>) -> Vec<IpRestriction> {
    let Some(restrictions) = restrictions else {
        return Vec::new();
    };

    restrictions
        .iter()
        .filter(|r| !r.ip_address.as_deref().is_some_and(|ip| ip.eq_ignore_ascii_case("any")))
        .map(flatten_ip_restriction)
        .collect()
}

fn flatten_ip_restriction(restriction: &nested::IpSecurityRestriction) -> IpRestriction {
    let is_service_tag = restriction
        .tag
        .as_deref()
        .is_some_and(|tag| tag.eq_ignore_ascii_case(TAG_SERVICE));

    let (ip_address, service_tag) = match &restriction.ip_address {
        Some(value) if is_service_tag => (None, Some(value.clone())),
        Some(value) => (Some(value.clone()), None),
        None => (None, None),
    };

    IpRestriction {
        name: restriction.name.clone(),
        priority: restriction.priority.unwrap_or_else(default_priority),
        action: restriction.action.clone().unwrap_or_else(default_action),
        ip_address,
        service_tag,
        virtual_network_subnet_id: restriction.vnet_subnet_resource_id.clone(),
        headers: restriction.headers.as_ref().map(flatten_headers),
        description: restriction.description.clone(),
    }
}

fn flatten_headers(headers: &BTreeMap<String, Vec<String>>) -> IpRestrictionHeaders {
    let mut out = IpRestrictionHeaders::default();
    for (name, values) in headers {
        let target = match name.to_ascii_lowercase().as_str() {
            HEADER_FORWARDED_HOST => &mut out.x_forwarded_host,
            HEADER_FORWARDED_FOR => &mut out.x_forwarded_for,
            HEADER_AZURE_FDID => &mut out.x_azure_fdid,
            HEADER_FD_HEALTH_PROBE => &mut out.x_fd_health_probe,
            other => {
                tracing::debug!("Ignoring unsupported restriction header {}", other);
                continue;
            },
        };
        target.extend(values.iter().cloned());
    }
    out
}

// =============================================================================
// CORS
// =============================================================================

pub fn expand_cors(cors: &CorsSetting) -> nested::CorsSettings {
    nested::CorsSettings {
        allowed_origins: Some(cors.allowed_origins.clone()),
        support_credentials: Some(cors.support_credentials),
    }
}

/// An empty remote CORS block is the platform default, not a user setting
pub fn flatten_cors(cors: Option<&nested::CorsSettings>) -> Option<CorsSetting> {
    let cors = cors?;
    let allowed_origins = cors.allowed_origins.clone().unwrap_or_default();
    let support_credentials = cors.support_credentials.unwrap_or(false);

    if allowed_origins.is_empty() && !support_credentials {
        return None;
    }

    Some(CorsSetting {
        allowed_origins,
        support_credentials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_tag_round_trip() {
        let restriction = IpRestriction {
            name: Some("frontdoor".into()),
            service_tag: Some("AzureFrontDoor.Backend".into()),
            headers: Some(IpRestrictionHeaders {
                x_azure_fdid: vec!["55ce4ed1-4b06-4bf1-b40e-4638452104da".into()],
                ..Default::default()
            }),
            ..Default::default()
        };

        let expanded = expand_ip_restrictions(std::slice::from_ref(&restriction));
        assert_eq!(expanded[0].tag.as_deref(), Some("ServiceTag"));
        assert_eq!(expanded[0].ip_address.as_deref(), Some("AzureFrontDoor.Backend"));
        assert!(expanded[0].headers.as_ref().unwrap().contains_key("x-azure-fdid"));

        let flattened = flatten_ip_restrictions(Some(expanded.as_slice()));
        assert_eq!(flattened, vec![restriction]);
    }

    #[test]
    fn test_ip_address_round_trip() {
        let restriction = IpRestriction {
            ip_address: Some("10.0.0.0/24".into()),
            action: "Deny".into(),
            priority: 100,
            ..Default::default()
        };
        let expanded = expand_ip_restrictions(std::slice::from_ref(&restriction));
        assert_eq!(expanded[0].tag.as_deref(), Some("Default"));
        assert_eq!(flatten_ip_restrictions(Some(expanded.as_slice())), vec![restriction]);
    }

    #[test]
    fn test_allow_all_rule_is_skipped() {
        let remote = vec![nested::IpSecurityRestriction {
            ip_address: Some("Any".into()),
            action: Some("Allow".into()),
            priority: Some(2147483647),
            name: Some("Allow all".into()),
            ..Default::default()
        }];
        assert!(flatten_ip_restrictions(Some(remote.as_slice())).is_empty());
        assert!(flatten_ip_restrictions(None).is_empty());
    }

    #[test]
    fn test_empty_cors_is_default() {
        assert_eq!(flatten_cors(Some(&nested::CorsSettings::default())), None);

        let cors = CorsSetting {
            allowed_origins: vec!["https://example.com".into()],
            support_credentials: true,
        };
        assert_eq!(flatten_cors(Some(&expand_cors(&cors))), Some(cors));
    }
}
