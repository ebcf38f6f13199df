//! Loader: schema creation, bulk and direct loads, reset, verification.
//!
//! Loads do not deduplicate or upsert: re-running a load against a node
//! that already holds the same data duplicates rows. The supported recovery
//! path is `reset` followed by a re-run. Loads are single-attempt so a
//! retry can never duplicate partially committed rows.

use snafu::prelude::*;
use sqlx::mysql::MySqlPool;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::ConnectionSettings;
use crate::db;
use crate::error::{
    ConfigError, CountSnafu, CreateDatabaseSnafu, DropDatabaseSnafu, FragmentSnafu, InsertSnafu,
    LoadError, SchemaFileMissingSnafu, SchemaFileReadSnafu, SchemaSnafu,
};
use crate::model::Rider;
use crate::stage;

const INSERT_SQL: &str = "\
INSERT INTO Riders
    (courierName, vehicleType, firstName, lastName, gender, age, createdAt, updatedAt)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

/// Read the schema DDL script. The content is an opaque blob; it is never
/// parsed or validated here.
pub fn read_schema_file(path: &Path) -> Result<String, ConfigError> {
    let path_text = path.display().to_string();
    ensure!(
        path.exists(),
        SchemaFileMissingSnafu {
            path: path_text.clone()
        }
    );
    fs::read_to_string(path).context(SchemaFileReadSnafu { path: path_text })
}

/// Execute the schema DDL verbatim against a node.
pub async fn ensure_schema(pool: &MySqlPool, ddl: &str) -> Result<(), LoadError> {
    sqlx::raw_sql(ddl).execute(pool).await.context(SchemaSnafu)?;
    debug!("Schema ensured");
    Ok(())
}

/// Direct path: insert each rider individually via a parameterized
/// statement. Returns the number of rows inserted.
pub async fn insert_riders(riders: &[Rider], pool: &MySqlPool) -> Result<u64, LoadError> {
    let mut inserted = 0u64;
    for rider in riders {
        sqlx::query(INSERT_SQL)
            .bind(&rider.courier_name)
            .bind(&rider.vehicle_type)
            .bind(&rider.first_name)
            .bind(&rider.last_name)
            .bind(&rider.gender)
            .bind(rider.age)
            .bind(rider.created_at)
            .bind(rider.updated_at)
            .execute(pool)
            .await
            .context(InsertSnafu)?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Staged path: read a fragment file and load its rows into the node.
/// Returns the number of rows loaded.
pub async fn bulk_load(path: &Path, pool: &MySqlPool) -> Result<u64, LoadError> {
    let riders = stage::read_fragment(path).context(FragmentSnafu)?;
    let count = insert_riders(&riders, pool).await?;
    info!("Loaded {count} rows from {}", path.display());
    Ok(count)
}

/// Destructive reset: drop the node's database, recreate it, and re-run
/// the schema DDL. Never implicit; callers must ask for this explicitly.
pub async fn reset(settings: &ConnectionSettings, ddl: &str) -> Result<(), LoadError> {
    let admin = db::connect_admin(settings);

    sqlx::query(&format!(
        "DROP DATABASE IF EXISTS `{}`",
        settings.database
    ))
    .execute(&admin)
    .await
    .context(DropDatabaseSnafu)?;

    sqlx::query(&format!("CREATE DATABASE `{}`", settings.database))
        .execute(&admin)
        .await
        .context(CreateDatabaseSnafu)?;

    admin.close().await;
    info!("Dropped and recreated database {}", settings.database);

    let pool = db::connect(settings);
    ensure_schema(&pool, ddl).await?;
    pool.close().await;
    Ok(())
}

/// Post-load check: row count in the node's Riders table. This is the sole
/// correctness check; it does not compare row content with the source.
pub async fn verify(pool: &MySqlPool) -> Result<i64, LoadError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM Riders")
        .fetch_one(pool)
        .await
        .context(CountSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_schema_file_is_config_error() {
        let result = read_schema_file(Path::new("/nonexistent/schema.sql"));
        assert!(matches!(result, Err(ConfigError::SchemaFileMissing { .. })));
    }

    #[test]
    fn test_schema_file_content_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.sql");
        let ddl = "CREATE TABLE IF NOT EXISTS Riders (id INT);\n-- trailing comment\n";
        fs::write(&path, ddl).unwrap();

        assert_eq!(read_schema_file(&path).unwrap(), ddl);
    }
}
