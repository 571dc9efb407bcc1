//! Sticky-Settings Merger
//!
//! The effective sticky set is always the desired declaration, deduplicated.
//! An absent declaration clears whatever the remote still holds.

use super::model::StickySettings;
use super::mounts::ConnectionString;
use super::nested;
use super::settings::AppSettingsMap;

/// Compute the effective name list for one sticky set
pub fn merge(existing: &[String], desired: Option<&[String]>) -> Vec<String> {
    let mut effective: Vec<String> = Vec::new();
    for name in desired.unwrap_or_default() {
        if !effective.contains(name) {
            effective.push(name.clone());
        }
    }

    for dropped in existing.iter().filter(|name| !effective.contains(name)) {
        tracing::debug!("Sticky name {} is no longer declared", dropped);
    }

    effective
}

/// Merge both sets into the remote `slotConfigNames` body
pub fn merge_sticky_settings(
    existing: Option<&StickySettings>,
    desired: Option<&StickySettings>,
) -> nested::SlotConfigNames {
    let existing_apps = existing.map(|s| s.app_setting_names.as_slice()).unwrap_or_default();
    let existing_conns = existing
        .map(|s| s.connection_string_names.as_slice())
        .unwrap_or_default();

    nested::SlotConfigNames {
        app_setting_names: merge(existing_apps, desired.map(|s| s.app_setting_names.as_slice())),
        connection_string_names: merge(
            existing_conns,
            desired.map(|s| s.connection_string_names.as_slice()),
        ),
    }
}

/// Sticky names that match no setting being written. They are still sent;
/// the service accepts names for settings that do not exist yet.
pub fn orphaned_names(
    sticky: &nested::SlotConfigNames,
    app_settings: &AppSettingsMap,
    connection_strings: &[ConnectionString],
) -> Vec<String> {
    let mut orphans: Vec<String> = sticky
        .app_setting_names
        .iter()
        .filter(|name| !app_settings.keys().any(|k| k.eq_ignore_ascii_case(name)))
        .cloned()
        .collect();

    orphans.extend(
        sticky
            .connection_string_names
            .iter()
            .filter(|name| !connection_strings.iter().any(|cs| cs.name.eq_ignore_ascii_case(name)))
            .cloned(),
    );

    for name in &orphans {
        tracing::warn!("Sticky name {} does not match any configured setting", name);
    }

    orphans
}

/// Flatten the remote sticky names. Two empty lists mean no declaration.
pub fn flatten_sticky_settings(remote: &nested::SlotConfigNames) -> Option<StickySettings> {
    if remote.app_setting_names.is_empty() && remote.connection_string_names.is_empty() {
        return None;
    }

    Some(StickySettings {
        app_setting_names: remote.app_setting_names.clone(),
        connection_string_names: remote.connection_string_names.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_removed_declaration_clears_names() {
        let existing = StickySettings {
            app_setting_names: names(&["foo", "secret"]),
            connection_string_names: names(&["First"]),
        };

        let effective = merge_sticky_settings(Some(&existing), None);
        assert!(effective.app_setting_names.is_empty());
        assert!(effective.connection_string_names.is_empty());
    }

    #[test]
    fn test_desired_is_deduplicated_in_order() {
        let desired = names(&["b", "a", "b", "c", "a"]);
        assert_eq!(merge(&[], Some(desired.as_slice())), names(&["b", "a", "c"]));
    }

    #[test]
    fn test_desired_replaces_existing() {
        let existing = names(&["old", "keep"]);
        let desired = names(&["keep", "new"]);
        assert_eq!(merge(&existing, Some(desired.as_slice())), names(&["keep", "new"]));
    }

    #[test]
    fn test_empty_declaration_matches_absence() {
        let existing = names(&["x"]);
        assert_eq!(merge(&existing, Some(&[] as &[String])), merge(&existing, None));
    }

    #[test]
    fn test_orphaned_names() {
        let sticky = nested::SlotConfigNames {
            app_setting_names: names(&["FOO", "MISSING"]),
            connection_string_names: names(&["First"]),
        };
        let settings: AppSettingsMap = [("foo".to_string(), "1".to_string())].into_iter().collect();

        let orphans = orphaned_names(&sticky, &settings, &[]);
        assert_eq!(orphans, names(&["MISSING", "First"]));
    }

    #[test]
    fn test_flatten_empty_is_none() {
        assert_eq!(flatten_sticky_settings(&nested::SlotConfigNames::default()), None);
    }
}
