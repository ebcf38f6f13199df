//! Extractor: the fixed source-side join.
//!
//! Single attempt; transient connectivity is the ping's problem, run it
//! against the same descriptor first.

use snafu::prelude::*;
use sqlx::mysql::MySqlPool;
use tracing::debug;

use crate::error::{ExtractError, SourceQuerySnafu};
use crate::model::RawRider;

/// Timestamps are cast to CHAR so malformed values reach the normalizer
/// as text instead of failing the row at decode time.
const RIDERS_QUERY: &str = "\
SELECT
    c.name AS courierName,
    r.vehicleType,
    r.firstName,
    r.lastName,
    r.gender,
    r.age,
    CAST(r.createdAt AS CHAR) AS createdAt,
    CAST(r.updatedAt AS CHAR) AS updatedAt
FROM Riders r
JOIN Couriers c ON r.courierId = c.id";

/// Extract the full rider dataset from the source database.
pub async fn extract_riders(pool: &MySqlPool) -> Result<Vec<RawRider>, ExtractError> {
    let rows = sqlx::query_as::<_, RawRider>(RIDERS_QUERY)
        .fetch_all(pool)
        .await
        .context(SourceQuerySnafu)?;

    debug!("Extracted {} rider rows from source", rows.len());
    Ok(rows)
}
