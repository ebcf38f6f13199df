//! The full extract-transform-partition-load run.
//!
//! Sequential batch execution: ping, extract, normalize, validate,
//! partition, stage, then one independent load per node. There is no
//! cross-node transaction; a failure loading one node leaves earlier
//! nodes committed, and partial completion is recovered by re-running
//! after a reset.

use snafu::prelude::*;
use tracing::info;

use crate::config::{ConnectionSettings, EtlConfig, NodeRegistry};
use crate::db::{self, RetryPolicy};
use crate::error::{
    ConfigSnafu, DbSnafu, EtlError, ExtractSnafu, LoadSnafu, StageSnafu, ValidationSnafu,
    WrongNodeCountSnafu,
};
use crate::load;
use crate::partition::partition;
use crate::stage;
use crate::transform;

/// Per-node load outcome.
#[derive(Debug, Clone)]
pub struct NodeLoadStats {
    pub node: String,
    pub rows_loaded: u64,
    pub rows_verified: i64,
}

/// Statistics about one ETL run.
#[derive(Debug, Clone, Default)]
pub struct EtlStats {
    pub rows_extracted: usize,
    pub nodes: Vec<NodeLoadStats>,
}

/// Run the full pipeline against the source and all registered nodes.
///
/// `validate_enums` may be false for trusted inputs; when true, validation
/// is all-or-nothing before any staging or loading happens.
pub async fn run_etl(
    config: &EtlConfig,
    registry: &NodeRegistry,
    validate_enums: bool,
) -> Result<EtlStats, EtlError> {
    let node_names = registry.node_names();
    if node_names.len() != 3 {
        return WrongNodeCountSnafu {
            count: node_names.len(),
        }
        .fail()
        .context(ConfigSnafu);
    }

    // The DDL is read up front so a missing schema file fails before any
    // rows move.
    let ddl = load::read_schema_file(&config.schema_file).context(ConfigSnafu)?;

    let source = ConnectionSettings::for_source().context(ConfigSnafu)?;
    let source_pool = db::connect(&source);
    db::ping(&source_pool, &RetryPolicy::default())
        .await
        .context(DbSnafu)?;

    let raw = crate::extract::extract_riders(&source_pool)
        .await
        .context(ExtractSnafu)?;
    source_pool.close().await;
    info!("Extracted {} rows from source", raw.len());

    let riders = transform::normalize(raw);
    if validate_enums {
        transform::validate(&riders).context(ValidationSnafu)?;
    }

    let partitions = partition(riders, config.pivot);
    info!(
        "Partitioned on pivot {}: full={} group_a={} group_b={}",
        config.pivot,
        partitions.full.len(),
        partitions.group_a.len(),
        partitions.group_b.len()
    );

    let staged =
        stage::stage_partitions(&partitions, &config.staging_dir, registry).context(StageSnafu)?;

    let mut stats = EtlStats {
        rows_extracted: partitions.full.len(),
        nodes: Vec::new(),
    };

    // Each node load is an independent unit of work.
    for (name, path) in node_names.iter().zip(&staged) {
        let settings = registry.describe(name).context(ConfigSnafu)?;
        let pool = db::connect(&settings);

        load::ensure_schema(&pool, &ddl).await.context(LoadSnafu)?;
        let rows_loaded = load::bulk_load(path, &pool).await.context(LoadSnafu)?;
        let rows_verified = load::verify(&pool).await.context(LoadSnafu)?;
        pool.close().await;

        info!("{name}: loaded {rows_loaded} rows, verified count {rows_verified}");
        stats.nodes.push(NodeLoadStats {
            node: name.clone(),
            rows_loaded,
            rows_verified,
        });
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[tokio::test]
    async fn test_run_rejects_wrong_node_count() {
        // The fan-out guard fires before any file or database access.
        let registry = NodeRegistry::new(vec!["node1".to_string(), "node2".to_string()]);
        let result = run_etl(&EtlConfig::default(), &registry, true).await;

        match result {
            Err(EtlError::Config {
                source: ConfigError::WrongNodeCount { count },
            }) => assert_eq!(count, 2),
            other => panic!("expected WrongNodeCount, got {other:?}"),
        }
    }
}
