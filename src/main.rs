//! riderfrag: a standalone tool for fragmenting rider data across MySQL nodes.
//!
//! Extracts rider records from the authoritative source database, normalizes
//! and validates them, splits the dataset on a courier-identity pivot, and
//! loads the full set plus two disjoint fragments into three independent
//! node databases.

use clap::{Parser, Subcommand};
use snafu::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use riderfrag::config::{ConnectionSettings, EtlConfig, NodeRegistry};
use riderfrag::db::{self, RetryPolicy};
use riderfrag::error::{ConfigSnafu, DbSnafu, EtlError, LoadSnafu, UnknownNodeSnafu};
use riderfrag::model::CourierName;
use riderfrag::{load, pipeline, stage};

/// Rider data fragmentation tool.
#[derive(Parser, Debug)]
#[command(name = "riderfrag")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory for staged fragment files.
    #[arg(long, default_value = "data/node_splits")]
    staging_dir: PathBuf,

    /// Schema DDL script, executed verbatim on each node.
    #[arg(long, default_value = "db/schema.sql")]
    schema_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full ETL: extract, normalize, partition, stage, load all nodes.
    Run {
        /// Pivot courier for the fragment split.
        #[arg(long, default_value = "JNT")]
        pivot: String,

        /// Skip enum validation (trusted input only).
        #[arg(long)]
        no_validate: bool,
    },

    /// Create the schema and load the staged fragment on one node or all.
    Init {
        /// Target node name.
        #[arg(long, required_unless_present = "all")]
        node: Option<String>,

        /// Initialize every registered node.
        #[arg(long)]
        all: bool,
    },

    /// Drop and recreate one node's database, then re-run the schema. Destructive.
    Reset {
        /// Target node name.
        #[arg(long)]
        node: String,
    },

    /// Report the Riders row count on one node or all.
    Verify {
        /// Target node name.
        #[arg(long, required_unless_present = "all")]
        node: Option<String>,

        /// Verify every registered node.
        #[arg(long)]
        all: bool,
    },

    /// Health-check the source database with bounded retries.
    Ping,
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), EtlError> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Global .env, if present; node overrides are layered on top later.
    dotenvy::dotenv().ok();

    let registry = NodeRegistry::default();

    match &args.command {
        Command::Run { pivot, no_validate } => run(&args, &registry, pivot, *no_validate).await,
        Command::Init { node, all } => init(&args, &registry, node.as_deref(), *all).await,
        Command::Reset { node } => reset(&args, &registry, node).await,
        Command::Verify { node, all } => verify(&registry, node.as_deref(), *all).await,
        Command::Ping => ping().await,
    }
}

async fn run(
    args: &Args,
    registry: &NodeRegistry,
    pivot: &str,
    no_validate: bool,
) -> Result<(), EtlError> {
    let pivot: CourierName = pivot.parse().context(ConfigSnafu)?;
    let config = EtlConfig {
        staging_dir: args.staging_dir.clone(),
        schema_file: args.schema_file.clone(),
        pivot,
    };

    let stats = pipeline::run_etl(&config, registry, !no_validate).await?;

    info!("ETL completed successfully");
    info!("  Rows extracted: {}", stats.rows_extracted);
    for node in &stats.nodes {
        info!(
            "  {}: {} rows loaded, {} verified",
            node.node, node.rows_loaded, node.rows_verified
        );
    }
    Ok(())
}

/// Nodes targeted by a single-node-or-all subcommand, in registry order.
fn target_nodes(registry: &NodeRegistry, node: Option<&str>, all: bool) -> Vec<String> {
    if all {
        registry.node_names().to_vec()
    } else {
        node.into_iter().map(str::to_string).collect()
    }
}

async fn init(
    args: &Args,
    registry: &NodeRegistry,
    node: Option<&str>,
    all: bool,
) -> Result<(), EtlError> {
    let ddl = load::read_schema_file(&args.schema_file).context(ConfigSnafu)?;

    for name in target_nodes(registry, node, all) {
        info!("Initializing {name}");
        let settings = registry.describe(&name).context(ConfigSnafu)?;
        let index = registry
            .node_names()
            .iter()
            .position(|n| *n == name)
            .context(UnknownNodeSnafu { name: name.clone() })
            .context(ConfigSnafu)?;
        let fragment = stage::fragment_path(&args.staging_dir, index, &name);

        let pool = db::connect(&settings);
        load::ensure_schema(&pool, &ddl).await.context(LoadSnafu)?;
        let loaded = load::bulk_load(&fragment, &pool).await.context(LoadSnafu)?;
        let count = load::verify(&pool).await.context(LoadSnafu)?;
        pool.close().await;

        info!("{name}: {loaded} rows loaded, {count} rows in Riders");
    }
    Ok(())
}

async fn reset(args: &Args, registry: &NodeRegistry, node: &str) -> Result<(), EtlError> {
    let ddl = load::read_schema_file(&args.schema_file).context(ConfigSnafu)?;
    let settings = registry.describe(node).context(ConfigSnafu)?;

    load::reset(&settings, &ddl).await.context(LoadSnafu)?;
    info!("{node}: database reset and schema recreated");
    Ok(())
}

async fn verify(registry: &NodeRegistry, node: Option<&str>, all: bool) -> Result<(), EtlError> {
    for name in target_nodes(registry, node, all) {
        let settings = registry.describe(&name).context(ConfigSnafu)?;
        let pool = db::connect(&settings);
        let count = load::verify(&pool).await.context(LoadSnafu)?;
        pool.close().await;
        info!("{name}: {count} rows in Riders");
    }
    Ok(())
}

async fn ping() -> Result<(), EtlError> {
    let settings = ConnectionSettings::for_source().context(ConfigSnafu)?;
    let pool = db::connect(&settings);
    db::ping(&pool, &RetryPolicy::default())
        .await
        .context(DbSnafu)?;
    pool.close().await;
    info!("Source database is reachable");
    Ok(())
}
