//! Connectivity layer: pooled connections and the bounded-retry ping.
//!
//! Pools validate connections lazily before first real use (pre-ping), so a
//! stale pooled connection is replaced transparently instead of surfacing to
//! the caller. The retry policy applies to the liveness check only; query
//! and load calls are single-attempt.

use snafu::prelude::*;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ConnectionSettings;
use crate::error::{DbError, PingSnafu};

/// Bounded retry policy for liveness checks.
///
/// Exponential backoff: 0.5s doubling per attempt, capped at 8s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given (1-based) failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.initial_delay.saturating_mul(2u32.saturating_pow(exponent));
        delay.min(self.max_delay)
    }
}

fn connect_options(settings: &ConnectionSettings) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.database)
}

/// Open a lazily-connected, pre-pinged pool for the given target.
pub fn connect(settings: &ConnectionSettings) -> MySqlPool {
    MySqlPoolOptions::new()
        .max_connections(2)
        .test_before_acquire(true)
        .connect_lazy_with(connect_options(settings))
}

/// Open a pool against the server without selecting a database.
///
/// Needed for `DROP DATABASE` / `CREATE DATABASE` during a node reset,
/// where the target database may not exist.
pub fn connect_admin(settings: &ConnectionSettings) -> MySqlPool {
    let options = MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password);

    MySqlPoolOptions::new()
        .max_connections(1)
        .test_before_acquire(true)
        .connect_lazy_with(options)
}

/// Whether an error is a transient connectivity failure worth retrying.
fn is_transient(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
    )
}

/// Run an operation under the retry policy.
///
/// Retries only transient connectivity failures; the final error is
/// returned unchanged once attempts are exhausted.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.max_attempts && is_transient(&error) => {
                let delay = policy.delay(attempt);
                warn!(
                    "Transient database error (attempt {attempt}/{}): {error}, retrying in {delay:?}",
                    policy.max_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Liveness check: `SELECT 1` wrapped in the bounded retry policy.
pub async fn ping(pool: &MySqlPool, policy: &RetryPolicy) -> Result<(), DbError> {
    with_retry(policy, || async {
        sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
    })
    .await
    .context(PingSnafu)?;

    debug!("Ping succeeded");
    Ok(())
}
