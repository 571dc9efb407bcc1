//! Storage mounts and connection strings
//!
//! Both are name-keyed maps on the remote side and ordered lists in the
//! flat model. The service never returns storage access keys, so flattening
//! carries them over from the previous flat value.

use super::nested;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    #[default]
    AzureFiles,
    AzureBlob,
}

impl StorageType {
    fn as_str(self) -> &'static str {
        match self {
            StorageType::AzureFiles => "AzureFiles",
            StorageType::AzureBlob => "AzureBlob",
        }
    }

    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("AzureBlob") {
            StorageType::AzureBlob
        } else {
            StorageType::AzureFiles
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMount {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: StorageType,
    pub account_name: String,
    pub share_name: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionString {
    pub name: String,
    /// `SQLAzure`, `SQLServer`, `MySql`, `PostgreSQL`, `Custom`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

// =============================================================================
// Storage mounts
// =============================================================================

pub fn expand_storage_mounts(mounts: &[StorageMount]) -> BTreeMap<String, nested::AzureStorageInfo> {
    mounts
        .iter()
        .map(|mount| {
            (
                mount.name.clone(),
                nested::AzureStorageInfo {
                    kind: mount.kind.as_str().to_string(),
                    account_name: mount.account_name.clone(),
                    share_name: mount.share_name.clone(),
                    access_key: Some(mount.access_key.clone()),
                    mount_path: mount.mount_path.clone(),
                },
            )
        })
        .collect()
}

pub fn flatten_storage_mounts(
    remote: &BTreeMap<String, nested::AzureStorageInfo>,
    previous: &[StorageMount],
) -> Vec<StorageMount> {
    remote
        .iter()
        .map(|(name, info)| {
            let access_key = info
                .access_key
                .clone()
                .filter(|key| !key.is_empty())
                .or_else(|| {
                    previous
                        .iter()
                        .find(|m| &m.name == name)
                        .map(|m| m.access_key.clone())
                })
                .unwrap_or_default();

            StorageMount {
                name: name.clone(),
                kind: StorageType::parse(&info.kind),
                account_name: info.account_name.clone(),
                share_name: info.share_name.clone(),
                access_key,
                mount_path: info.mount_path.clone(),
            }
        })
        .collect()
}

// =============================================================================
// Connection strings
// =============================================================================

pub fn expand_connection_strings(
    connection_strings: &[ConnectionString],
) -> BTreeMap<String, nested::ConnStringValueTypePair> {
    connection_strings
        .iter()
        .map(|cs| {
            (
                cs.name.clone(),
                nested::ConnStringValueTypePair {
                    value: cs.value.clone(),
                    kind: cs.kind.clone(),
                },
            )
        })
        .collect()
}

pub fn flatten_connection_strings(
    remote: &BTreeMap<String, nested::ConnStringValueTypePair>,
) -> Vec<ConnectionString> {
    remote
        .iter()
        .map(|(name, pair)| ConnectionString {
            name: name.clone(),
            kind: pair.kind.clone(),
            value: pair.value.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_mount_keeps_previous_access_key() {
        let mount = StorageMount {
            name: "data".into(),
            kind: StorageType::AzureBlob,
            account_name: "acct".into(),
            share_name: "container".into(),
            access_key: "secret".into(),
            mount_path: Some("/mnt/data".into()),
        };

        let mut remote = expand_storage_mounts(std::slice::from_ref(&mount));
        remote.get_mut("data").unwrap().access_key = None;

        assert_eq!(flatten_storage_mounts(&remote, std::slice::from_ref(&mount)), vec![mount.clone()]);
        assert_eq!(flatten_storage_mounts(&remote, &[])[0].access_key, "");
    }

    #[test]
    fn test_connection_strings_round_trip() {
        let strings = vec![
            ConnectionString {
                name: "First".into(),
                kind: "PostgreSQL".into(),
                value: "Server=db;Database=app".into(),
            },
            ConnectionString {
                name: "Second".into(),
                kind: "Custom".into(),
                value: "x".into(),
            },
        ];
        assert_eq!(flatten_connection_strings(&expand_connection_strings(&strings)), strings);
    }
}
