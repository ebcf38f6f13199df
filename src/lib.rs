//! riderfrag: fragment rider data from one MySQL source across three nodes.
//!
//! This library provides components for extracting rider records from an
//! authoritative source database, normalizing and validating them, splitting
//! the dataset on a courier-identity predicate, and loading each fragment
//! into an independent node database.
//!
//! # Example
//!
//! ```ignore
//! use riderfrag::{run_etl, EtlConfig, NodeRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), riderfrag::error::EtlError> {
//!     let stats = run_etl(&EtlConfig::default(), &NodeRegistry::default(), true).await?;
//!     println!("Extracted {} rows", stats.rows_extracted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod load;
pub mod model;
pub mod partition;
pub mod pipeline;
pub mod stage;
pub mod transform;

// Re-export main types
pub use config::{ConnectionSettings, EtlConfig, NodeRegistry};
pub use model::{CourierName, Rider, VehicleType};
pub use pipeline::{run_etl, EtlStats};
