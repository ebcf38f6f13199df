//! Layered configuration and the node registry.
//!
//! Connection parameters resolve through three layers: a node-specific
//! `.env.<node>` override file, then the process environment (node-prefixed
//! variables falling back to the global `MYSQL_*` set), then hard-coded
//! defaults. The registry maps ordered logical node names to typed
//! connection descriptors.

use snafu::prelude::*;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, InvalidPortSnafu, NodeEnvFileSnafu, UnknownNodeSnafu};
use crate::model::CourierName;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3306";
const DEFAULT_USER: &str = "root";
const DEFAULT_PASSWORD: &str = "password";
const DEFAULT_DATABASE: &str = "ridersdb";

/// Typed connection descriptor for one database target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionSettings {
    /// Resolve settings for the authoritative source database.
    ///
    /// Uses the global `MYSQL_*` variables, then defaults.
    pub fn for_source() -> Result<Self, ConfigError> {
        Self::from_prefixes(&["MYSQL"])
    }

    /// Resolve settings for a logical node.
    ///
    /// Loads `.env.<node>` into the environment first if it exists, then
    /// looks up `<NODE>_*` variables, falling back to `MYSQL_*`, falling
    /// back to defaults.
    ///
    /// The override file is exported into the process environment, so any
    /// `MYSQL_*` value it sets stays visible when later nodes without an
    /// override file of their own are resolved. Node-prefixed variables in
    /// override files avoid the leak entirely.
    pub fn for_node(node: &str) -> Result<Self, ConfigError> {
        let override_file = PathBuf::from(format!(".env.{node}"));
        if override_file.exists() {
            dotenvy::from_filename_override(&override_file).context(NodeEnvFileSnafu {
                path: override_file.display().to_string(),
            })?;
        }

        let prefix = node.to_uppercase();
        Self::from_prefixes(&[&prefix, "MYSQL"])
    }

    fn from_prefixes(prefixes: &[&str]) -> Result<Self, ConfigError> {
        let port_text = lookup(prefixes, "PORT", DEFAULT_PORT);
        let port = port_text
            .parse()
            .context(InvalidPortSnafu { value: port_text.clone() })?;

        Ok(Self {
            host: lookup(prefixes, "HOST", DEFAULT_HOST),
            port,
            user: lookup(prefixes, "USER", DEFAULT_USER),
            password: lookup(prefixes, "PASSWORD", DEFAULT_PASSWORD),
            database: lookup(prefixes, "DB", DEFAULT_DATABASE),
        })
    }
}

/// First non-empty `<PREFIX>_<KEY>` environment value wins; empty values
/// are treated as unset so an override file can't mask a layer by accident.
fn lookup(prefixes: &[&str], key: &str, default: &str) -> String {
    prefixes
        .iter()
        .find_map(|prefix| {
            env::var(format!("{prefix}_{key}"))
                .ok()
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_else(|| default.to_string())
}

/// Ordered collection of logical node names, resolvable to connection
/// descriptors.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    names: Vec<String>,
}

impl NodeRegistry {
    /// Create a registry with custom node names, in fan-out order.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// The ordered logical node names.
    pub fn node_names(&self) -> &[String] {
        &self.names
    }

    /// Resolve the connection descriptor for a registered node.
    pub fn describe(&self, name: &str) -> Result<ConnectionSettings, ConfigError> {
        ensure!(
            self.names.iter().any(|n| n == name),
            UnknownNodeSnafu { name }
        );
        ConnectionSettings::for_node(name)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new(vec![
            "node1".to_string(),
            "node2".to_string(),
            "node3".to_string(),
        ])
    }
}

/// Run-level configuration for the ETL job.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    /// Directory where staged fragment files are written.
    pub staging_dir: PathBuf,
    /// Path to the schema DDL script, executed verbatim on each node.
    pub schema_file: PathBuf,
    /// Courier identity used as the partitioning predicate.
    pub pivot: CourierName,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            staging_dir: Path::new("data").join("node_splits"),
            schema_file: Path::new("db").join("schema.sql"),
            pivot: CourierName::Jnt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own node name so the prefixed env vars never
    // collide across parallel tests.

    fn clear_global_vars() {
        for key in ["MYSQL_HOST", "MYSQL_PORT", "MYSQL_USER", "MYSQL_PASSWORD", "MYSQL_DB"] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults_when_env_unset() {
        clear_global_vars();
        let settings = ConnectionSettings::for_node("cfgtesta").unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 3306);
        assert_eq!(settings.user, "root");
        assert_eq!(settings.database, "ridersdb");
    }

    #[test]
    fn test_node_prefix_overrides_global() {
        clear_global_vars();
        env::set_var("CFGTESTB_HOST", "node-b.internal");
        env::set_var("CFGTESTB_PORT", "3310");

        let settings = ConnectionSettings::for_node("cfgtestb").unwrap();
        assert_eq!(settings.host, "node-b.internal");
        assert_eq!(settings.port, 3310);
        // Unset keys fall through to defaults.
        assert_eq!(settings.user, "root");

        env::remove_var("CFGTESTB_HOST");
        env::remove_var("CFGTESTB_PORT");
    }

    #[test]
    fn test_empty_value_falls_through() {
        clear_global_vars();
        env::set_var("CFGTESTC_HOST", "");
        let settings = ConnectionSettings::for_node("cfgtestc").unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        env::remove_var("CFGTESTC_HOST");
    }

    #[test]
    fn test_env_file_overrides_process_env() {
        clear_global_vars();
        env::set_var("CFGTESTE_HOST", "from-env");
        std::fs::write(".env.cfgteste", "CFGTESTE_HOST=from-file\n").unwrap();

        let settings = ConnectionSettings::for_node("cfgteste").unwrap();
        assert_eq!(settings.host, "from-file");

        std::fs::remove_file(".env.cfgteste").unwrap();
        env::remove_var("CFGTESTE_HOST");
    }

    #[test]
    fn test_invalid_port_is_fatal() {
        env::set_var("CFGTESTD_PORT", "not-a-port");
        let result = ConnectionSettings::for_node("cfgtestd");
        assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
        env::remove_var("CFGTESTD_PORT");
    }

    #[test]
    fn test_registry_default_order() {
        let registry = NodeRegistry::default();
        assert_eq!(registry.node_names(), &["node1", "node2", "node3"]);
    }

    #[test]
    fn test_registry_rejects_unknown_node() {
        let registry = NodeRegistry::default();
        assert!(matches!(
            registry.describe("node9"),
            Err(ConfigError::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_registry_custom_names() {
        let registry = NodeRegistry::new(vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(registry.node_names(), &["alpha", "beta"]);
        assert!(registry.describe("alpha").is_ok());
    }
}
