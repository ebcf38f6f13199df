//! Error types for riderfrag using snafu.
//!
//! This module defines structured error types with context selectors for
//! all error conditions in the codebase.

use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur while resolving configuration.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Port value could not be parsed as a number.
    #[snafu(display("Invalid port value '{value}'"))]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },

    /// Node-specific env file exists but could not be loaded.
    #[snafu(display("Failed to load env file {path}"))]
    NodeEnvFile { path: String, source: dotenvy::Error },

    /// Schema DDL file does not exist.
    #[snafu(display("Schema file not found: {path}"))]
    SchemaFileMissing { path: String },

    /// Schema DDL file could not be read.
    #[snafu(display("Failed to read schema file {path}"))]
    SchemaFileRead {
        path: String,
        source: std::io::Error,
    },

    /// Node name is not present in the registry.
    #[snafu(display("Unknown node: {name}"))]
    UnknownNode { name: String },

    /// Fan-out requires exactly three nodes.
    #[snafu(display("Expected exactly 3 nodes for fan-out, registry has {count}"))]
    WrongNodeCount { count: usize },

    /// Courier value is not a known courier.
    #[snafu(display("Unknown courier: {value}"))]
    UnknownCourier { value: String },
}

// ============ Connectivity Errors ============

/// Errors that can occur at the connectivity layer.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DbError {
    /// Liveness check failed after exhausting all retry attempts.
    #[snafu(display("Database ping failed"))]
    Ping { source: sqlx::Error },
}

// ============ Extract Errors ============

/// Errors that can occur while extracting from the source database.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ExtractError {
    /// The source join query could not execute.
    #[snafu(display("Source query failed"))]
    SourceQuery { source: sqlx::Error },
}

// ============ Validation Errors ============

/// Batch-level validation failure.
///
/// Carries every distinct offending value so the whole problem is visible
/// at once; no partial accept.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ValidationError {
    /// One or more rows contain values outside the closed enumerations.
    #[snafu(display("Invalid values detected: couriers {couriers:?}, vehicles {vehicles:?}"))]
    InvalidEnums {
        couriers: Vec<String>,
        vehicles: Vec<String>,
    },
}

// ============ Stage Errors ============

/// Errors that can occur while staging fragments to CSV files.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StageError {
    /// Staging directory could not be created.
    #[snafu(display("Failed to create staging directory {path}"))]
    CreateStagingDir {
        path: String,
        source: std::io::Error,
    },

    /// Fragment file could not be opened.
    #[snafu(display("Failed to open fragment file {path}"))]
    OpenFragment { path: String, source: csv::Error },

    /// Fragment row could not be serialized.
    #[snafu(display("Failed to write fragment row to {path}"))]
    WriteFragment { path: String, source: csv::Error },

    /// Fragment file could not be flushed to disk.
    #[snafu(display("Failed to flush fragment file {path}"))]
    FlushFragment {
        path: String,
        source: std::io::Error,
    },

    /// Staged fragment file does not exist.
    #[snafu(display("Missing fragment file: {path}"))]
    FragmentMissing { path: String },

    /// Fragment row could not be deserialized.
    #[snafu(display("Failed to read fragment row from {path}"))]
    ReadFragment { path: String, source: csv::Error },
}

// ============ Load Errors ============

/// Errors that can occur while loading a node.
///
/// Rows committed before the failure stay committed; recovery is
/// `reset` followed by a re-run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LoadError {
    /// Schema DDL execution failed.
    #[snafu(display("Schema DDL execution failed"))]
    Schema { source: sqlx::Error },

    /// Row insert failed.
    #[snafu(display("Row insert failed"))]
    Insert { source: sqlx::Error },

    /// Count query failed.
    #[snafu(display("Count query failed"))]
    Count { source: sqlx::Error },

    /// DROP DATABASE failed during reset.
    #[snafu(display("Failed to drop database"))]
    DropDatabase { source: sqlx::Error },

    /// CREATE DATABASE failed during reset.
    #[snafu(display("Failed to create database"))]
    CreateDatabase { source: sqlx::Error },

    /// Staged fragment could not be read for a bulk load.
    #[snafu(display("Failed to read staged fragment"))]
    Fragment { source: StageError },
}

// ============ Etl Error (top-level) ============

/// Top-level errors that aggregate all error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EtlError {
    /// Configuration error.
    #[snafu(display("Configuration error"))]
    Config { source: ConfigError },

    /// Connectivity error.
    #[snafu(display("Connectivity error"))]
    Db { source: DbError },

    /// Extraction error.
    #[snafu(display("Extract error"))]
    Extract { source: ExtractError },

    /// Validation error.
    #[snafu(display("Validation error"))]
    Validation { source: ValidationError },

    /// Staging error.
    #[snafu(display("Staging error"))]
    Stage { source: StageError },

    /// Load error.
    #[snafu(display("Load error"))]
    Load { source: LoadError },
}
