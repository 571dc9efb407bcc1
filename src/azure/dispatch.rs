//! Sub-resource Dispatch
//!
//! Maps remote operations to management API calls. Every site sub-resource
//! lives under `{site}/config/{name}`; reads of secret-bearing resources are
//! POSTs to `.../list`.

use super::client::ArmClient;
use anyhow::{Context, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Where one operation goes, relative to the site URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub verb: Verb,
    pub path: &'static str,
    /// Slot config names belong to the production site, never a slot
    pub production_only: bool,
}

const fn route(verb: Verb, path: &'static str) -> Route {
    Route {
        verb,
        path,
        production_only: false,
    }
}

/// Look up the route for an operation name
pub fn route_for(operation: &str) -> Option<Route> {
    let route = match operation {
        // Reads
        "get_site" => route(Verb::Get, ""),
        "get_site_config" => route(Verb::Get, "config/web"),
        "list_app_settings" => route(Verb::Post, "config/appsettings/list"),
        "get_sticky_settings" => Route {
            production_only: true,
            ..route(Verb::Get, "config/slotConfigNames")
        },
        "list_connection_strings" => route(Verb::Post, "config/connectionstrings/list"),
        "get_logs" => route(Verb::Get, "config/logs"),
        "get_backup" => route(Verb::Post, "config/backup/list"),
        "list_storage_mounts" => route(Verb::Post, "config/azurestorageaccounts/list"),
        "get_auth_settings" => route(Verb::Post, "config/authsettings/list"),
        "get_auth_settings_v2" => route(Verb::Get, "config/authsettingsV2"),

        // Writes
        "update_properties" => route(Verb::Patch, ""),
        "update_app_settings" => route(Verb::Put, "config/appsettings"),
        "update_sticky_settings" => Route {
            production_only: true,
            ..route(Verb::Put, "config/slotConfigNames")
        },
        "update_auth_settings" => route(Verb::Put, "config/authsettings"),
        "update_auth_settings_v2" => route(Verb::Put, "config/authsettingsV2"),
        "update_logs" => route(Verb::Put, "config/logs"),
        "update_backup" => route(Verb::Put, "config/backup"),
        "delete_backup" => route(Verb::Delete, "config/backup"),
        "update_storage_mounts" => route(Verb::Put, "config/azurestorageaccounts"),
        "update_connection_strings" => route(Verb::Put, "config/connectionstrings"),
        _ => return None,
    };
    Some(route)
}

/// Invoke a remote operation by name
pub async fn invoke(client: &ArmClient, operation: &str, body: Option<&Value>) -> Result<Value> {
    let Some(route) = route_for(operation) else {
        return Err(anyhow::anyhow!("Unknown operation: {}", operation));
    };
    tracing::debug!("invoke: operation={}, verb={:?}", operation, route.verb);

    let base = if route.production_only {
        client.production_site_url()
    } else {
        client.site_url()
    };
    let url = if route.path.is_empty() {
        client.with_api_version(&base)
    } else {
        client.with_api_version(&format!("{}/{}", base, route.path))
    };

    let token = client.token();
    match route.verb {
        Verb::Get => client.http.get(&url, token).await,
        Verb::Post => client.http.post(&url, token, body).await,
        Verb::Put => {
            let body = body.context(format!("{} requires a request body", operation))?;
            client.http.put(&url, token, body).await
        },
        Verb::Patch => {
            let body = body.context(format!("{} requires a request body", operation))?;
            client.http.patch(&url, token, body).await
        },
        Verb::Delete => client.http.delete(&url, token).await,
    }
}
