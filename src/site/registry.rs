//! Stack Registry - Load stack kind definitions from JSON
//!
//! The set of stack kinds the remote service understands is pure data, so it
//! lives in an embedded JSON table instead of being spread across match arms.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded stack table (compiled into the binary)
const STACK_FILE: &str = include_str!("stacks.json");

/// How the payload after `KIND|` is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackFamily {
    /// `KIND|<version>`
    Language,
    /// `SERVER|<server_version>-<java_version>`
    AppServer,
    /// `DOCKER|[registry/]image:tag`
    Container,
}

/// Stack kind definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct StackDef {
    pub display_name: String,
    pub family: StackFamily,
    /// Value written to `FUNCTIONS_WORKER_RUNTIME` for function apps
    #[serde(default)]
    pub worker_runtime: Option<String>,
}

/// Root structure of stacks.json
#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub stacks: HashMap<String, StackDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<StackConfig> = OnceLock::new();

/// Get the stack registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static StackConfig {
    REGISTRY.get_or_init(|| {
        serde_json::from_str(STACK_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded stack JSON: {}", e))
    })
}

/// Look up a stack kind. Tokens are matched case-insensitively since function
/// apps have historically been written as `Python|3.9` rather than `PYTHON|3.9`.
pub fn get_stack(kind: &str) -> Option<&'static StackDef> {
    let registry = get_registry();
    registry
        .stacks
        .get(kind)
        .or_else(|| registry.stacks.get(&kind.to_ascii_uppercase()))
}

/// Worker runtime name for a kind token, if the kind runs as a functions worker
pub fn worker_runtime_for(kind: &str) -> Option<&'static str> {
    get_stack(kind)?.worker_runtime.as_deref()
}

/// All known kind tokens, sorted (for help output)
pub fn get_all_stack_kinds() -> Vec<&'static str> {
    let mut kinds: Vec<&'static str> = get_registry()
        .stacks
        .keys()
        .map(|s| s.as_str())
        .collect();
    kinds.sort_unstable();
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_successfully() {
        let registry = get_registry();
        assert!(!registry.stacks.is_empty(), "Registry should have stacks");
    }

    #[test]
    fn test_java_servers_are_app_servers() {
        for kind in ["JAVA", "TOMCAT", "JBOSSEAP"] {
            let def = get_stack(kind).unwrap();
            assert_eq!(def.family, StackFamily::AppServer, "{kind}");
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(get_stack("Python").is_some());
        assert!(get_stack("dotnet-isolated").is_some());
        assert!(get_stack("RUBY4").is_none());
    }

    #[test]
    fn test_worker_runtime_for() {
        assert_eq!(worker_runtime_for("PYTHON"), Some("python"));
        assert_eq!(worker_runtime_for("DOTNET-ISOLATED"), Some("dotnet-isolated"));
        assert_eq!(worker_runtime_for("PHP"), None);
        assert_eq!(worker_runtime_for("DOCKER"), None);
    }

    #[test]
    fn test_get_all_stack_kinds() {
        let kinds = get_all_stack_kinds();
        assert!(kinds.contains(&"DOCKER"));
        assert!(kinds.contains(&"POWERSHELL"));
        let mut sorted = kinds.clone();
        sorted.sort_unstable();
        assert_eq!(kinds, sorted);
    }
}
