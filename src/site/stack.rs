//! Stack Identifier Codec
//!
//! The remote service stores the language runtime of a site as a single
//! `KIND|PAYLOAD` string in `linuxFxVersion` / `windowsFxVersion`. This module
//! converts between that string and [`ApplicationStack`].
//!
//! Decoding never fails: unknown kinds come back as [`ApplicationStack::Raw`]
//! and re-encode to the exact input, malformed or empty identifiers decode to
//! `None` (no stack configured).

use super::registry::{self, StackFamily};
use serde::{Deserialize, Deserializer, Serialize};

/// Registry written into Windows container identifiers when the image lives
/// on the default public registry.
pub const DEFAULT_WINDOWS_REGISTRY: &str = "index.docker.io";

/// Operating system family of the site's worker
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    #[default]
    Linux,
    Windows,
}

impl OsFamily {
    /// Derive the OS family from an ARM site `kind` such as `functionapp,linux`
    pub fn from_site_kind(kind: &str) -> Self {
        if kind.split(',').any(|part| part.trim().eq_ignore_ascii_case("linux")) {
            OsFamily::Linux
        } else {
            OsFamily::Windows
        }
    }
}

/// Container image selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerStack {
    /// Registry host, optionally with a URL scheme. `None` means the default public registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,
    pub image_name: String,
    pub image_tag: String,
    /// Carried in app settings, never in the identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_password: Option<String>,
}

/// Language runtime of a site. Exactly one is configured at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStack {
    #[serde(rename = "dotnet")]
    DotNet { version: String },
    #[serde(rename = "dotnet_isolated")]
    DotNetIsolated { version: String },
    Php { version: String },
    Python { version: String },
    Node { version: String },
    Java { version: String },
    /// `JavaContainer { server: "JAVA", server_version: "" }` encodes as
    /// `JAVA|<java_version>`, which decodes as [`ApplicationStack::Java`].
    /// Flat documents are folded into that form when loaded.
    JavaContainer {
        server: String,
        #[serde(default)]
        server_version: String,
        #[serde(default)]
        java_version: String,
    },
    Ruby { version: String },
    Go { version: String },
    #[serde(rename = "powershell_core")]
    PowerShellCore { version: String },
    Docker(DockerStack),
    CustomHandler,
    /// Identifier of a kind this crate does not know about yet
    Raw { identifier: String },
}

impl ApplicationStack {
    /// The `KIND` token this stack encodes with
    pub fn kind(&self) -> &str {
        match self {
            ApplicationStack::DotNet { .. } => "DOTNET",
            ApplicationStack::DotNetIsolated { .. } => "DOTNET-ISOLATED",
            ApplicationStack::Php { .. } => "PHP",
            ApplicationStack::Python { .. } => "PYTHON",
            ApplicationStack::Node { .. } => "NODE",
            ApplicationStack::Java { .. } => "JAVA",
            ApplicationStack::JavaContainer { server, .. } => server,
            ApplicationStack::Ruby { .. } => "RUBY",
            ApplicationStack::Go { .. } => "GO",
            ApplicationStack::PowerShellCore { .. } => "POWERSHELL",
            ApplicationStack::Docker(_) => "DOCKER",
            ApplicationStack::CustomHandler => "CUSTOM",
            ApplicationStack::Raw { identifier } => {
                identifier.split('|').next().unwrap_or(identifier)
            },
        }
    }

    /// Value of `FUNCTIONS_WORKER_RUNTIME` implied by this stack
    pub fn worker_runtime(&self) -> Option<&'static str> {
        match self {
            ApplicationStack::CustomHandler => Some("custom"),
            ApplicationStack::Docker(_) | ApplicationStack::Raw { .. } => None,
            other => registry::worker_runtime_for(other.kind()),
        }
    }

    pub fn as_docker(&self) -> Option<&DockerStack> {
        match self {
            ApplicationStack::Docker(docker) => Some(docker),
            _ => None,
        }
    }

    /// The form this stack takes after an encode and decode
    pub fn normalized(self) -> Self {
        match self {
            ApplicationStack::JavaContainer {
                server,
                server_version,
                java_version,
            } if server.eq_ignore_ascii_case("JAVA") && server_version.is_empty() => {
                ApplicationStack::Java { version: java_version }
            },
            other => other,
        }
    }
}

/// Deserialize an optional stack in its normalized form
pub fn deserialize_normalized<'de, D>(deserializer: D) -> Result<Option<ApplicationStack>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ApplicationStack>::deserialize(deserializer)?.map(ApplicationStack::normalized))
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a stack for a particular site. Linux web apps name .NET
/// `DOTNETCORE`; function apps and Windows use `DOTNET`.
pub fn encode_for_site(stack: &ApplicationStack, os: OsFamily, function_app: bool) -> String {
    match stack {
        ApplicationStack::DotNet { version } if os == OsFamily::Linux && !function_app => {
            format!("DOTNETCORE|{}", version)
        },
        other => encode(other, os),
    }
}

/// Encode a stack into its identifier string
pub fn encode(stack: &ApplicationStack, os: OsFamily) -> String {
    match stack {
        ApplicationStack::DotNet { version } => format!("DOTNET|{}", version),
        ApplicationStack::DotNetIsolated { version } => format!("DOTNET-ISOLATED|{}", version),
        ApplicationStack::Php { version } => format!("PHP|{}", version),
        ApplicationStack::Python { version } => format!("PYTHON|{}", version),
        ApplicationStack::Node { version } => format!("NODE|{}", version),
        ApplicationStack::Java { version } => format!("JAVA|{}", version),
        ApplicationStack::JavaContainer {
            server,
            server_version,
            java_version,
        } => encode_java_container(server, server_version, java_version),
        ApplicationStack::Ruby { version } => format!("RUBY|{}", version),
        ApplicationStack::Go { version } => format!("GO|{}", version),
        ApplicationStack::PowerShellCore { version } => format!("POWERSHELL|{}", version),
        ApplicationStack::Docker(docker) => encode_docker(docker, os),
        // The remote expects an explicitly empty identifier for custom handlers
        ApplicationStack::CustomHandler => String::new(),
        ApplicationStack::Raw { identifier } => identifier.clone(),
    }
}

fn encode_java_container(server: &str, server_version: &str, java_version: &str) -> String {
    let server = server.to_ascii_uppercase();

    // The service writes plain Java SE as JAVA|<version>, never JAVA|-<version>
    if server == "JAVA" && server_version.is_empty() {
        return format!("JAVA|{}", java_version);
    }

    if java_version.is_empty() {
        format!("{}|{}", server, server_version)
    } else {
        format!("{}|{}-{}", server, server_version, java_version)
    }
}

fn encode_docker(docker: &DockerStack, os: OsFamily) -> String {
    let registry = docker
        .registry_url
        .as_deref()
        .map(registry_host)
        .filter(|host| !host.is_empty());

    let registry = match (os, registry) {
        (OsFamily::Windows, None) => Some(DEFAULT_WINDOWS_REGISTRY),
        (_, registry) => registry,
    };

    match registry {
        Some(host) => format!("DOCKER|{}/{}:{}", host, docker.image_name, docker.image_tag),
        None => format!("DOCKER|{}:{}", docker.image_name, docker.image_tag),
    }
}

/// Strip the URL scheme and trailing slash from a registry URL
pub fn registry_host(url: &str) -> &str {
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    host.trim_end_matches('/')
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode an identifier string. `None` means no stack is configured.
pub fn decode(identifier: &str, os: OsFamily) -> Option<ApplicationStack> {
    if identifier.is_empty() {
        return None;
    }

    let Some((kind, payload)) = identifier.split_once('|') else {
        tracing::debug!("Stack identifier without kind separator: {}", identifier);
        return Some(raw(identifier));
    };

    let Some(def) = registry::get_stack(kind) else {
        tracing::debug!("Unrecognized stack kind '{}', keeping identifier verbatim", kind);
        return Some(raw(identifier));
    };

    if payload.is_empty() {
        tracing::debug!("Stack identifier '{}' has no payload", identifier);
        return None;
    }

    match def.family {
        StackFamily::Container => decode_docker(payload, os).map(ApplicationStack::Docker),
        StackFamily::AppServer => Some(decode_java(kind, payload)),
        StackFamily::Language => Some(decode_language(kind, payload, identifier)),
    }
}

fn raw(identifier: &str) -> ApplicationStack {
    ApplicationStack::Raw {
        identifier: identifier.to_string(),
    }
}

fn decode_language(kind: &str, payload: &str, identifier: &str) -> ApplicationStack {
    let version = payload.to_string();
    match kind.to_ascii_uppercase().as_str() {
        "DOTNET" | "DOTNETCORE" => ApplicationStack::DotNet { version },
        "DOTNET-ISOLATED" => ApplicationStack::DotNetIsolated { version },
        "PHP" => ApplicationStack::Php { version },
        "PYTHON" => ApplicationStack::Python { version },
        "NODE" => ApplicationStack::Node { version },
        "RUBY" => ApplicationStack::Ruby { version },
        "GO" => ApplicationStack::Go { version },
        "POWERSHELL" => ApplicationStack::PowerShellCore { version },
        _ => raw(identifier),
    }
}

fn decode_java(kind: &str, payload: &str) -> ApplicationStack {
    let server = kind.to_ascii_uppercase();

    match payload.split_once('-') {
        None if server == "JAVA" => ApplicationStack::Java {
            version: payload.to_string(),
        },
        None => ApplicationStack::JavaContainer {
            server,
            server_version: payload.to_string(),
            java_version: String::new(),
        },
        Some((server_version, java_version)) => ApplicationStack::JavaContainer {
            server,
            server_version: server_version.to_string(),
            java_version: java_version.to_string(),
        },
    }
}

fn decode_docker(payload: &str, os: OsFamily) -> Option<DockerStack> {
    let last_slash = payload.rfind('/');
    let Some(tag_sep) = payload
        .rfind(':')
        .filter(|&idx| last_slash.map_or(true, |slash| idx > slash))
    else {
        tracing::debug!("Container identifier '{}' has no tag", payload);
        return None;
    };

    let (reference, tag) = (&payload[..tag_sep], &payload[tag_sep + 1..]);
    if reference.is_empty() || tag.is_empty() {
        tracing::debug!("Container identifier '{}' is incomplete", payload);
        return None;
    }

    let (registry, image) = match reference.split_once('/') {
        Some((first, rest)) if os == OsFamily::Windows || looks_like_registry(first) => {
            (Some(first), rest)
        },
        _ => (None, reference),
    };

    let registry = registry.filter(|host| {
        !(os == OsFamily::Windows && host.eq_ignore_ascii_case(DEFAULT_WINDOWS_REGISTRY))
    });

    Some(DockerStack {
        registry_url: registry.map(str::to_string),
        image_name: image.to_string(),
        image_tag: tag.to_string(),
        registry_username: None,
        registry_password: None,
    })
}

/// A leading path segment names a registry only if it looks like a host
fn looks_like_registry(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}
