use async_trait::async_trait;
use burrow_core::store::Result;
use burrow_core::{
    Destination, InsertOutcome, MappingStore, ReadMappingStore, SequenceStore, ShortCode,
    StorageError, UrlRecord,
};
use jiff::Timestamp;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};
use std::time::Duration;
use tracing::debug;

/// The schema expected by [`MySqlStore`].
pub const SCHEMA: &str = include_str!("../ddl/mysql/short_urls.sql");

/// Counters backing [`SequenceStore`].
pub const SEQUENCES_SCHEMA: &str = include_str!("../ddl/mysql/short_code_sequences.sql");

/// MySQL implementation of the mapping store.
///
/// Uniqueness is enforced by the primary key on `short_code`: the conditional
/// insert is a plain `INSERT` whose duplicate-key failure is reported as
/// [`InsertOutcome::AlreadyExists`]. Delete is a soft delete through
/// `deleted_at`, so a code stays reserved forever.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `short_urls` and `short_code_sequences` tables if they do
    /// not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        // prepared statements take one statement each
        for ddl in [SCHEMA, SEQUENCES_SCHEMA] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_timestamp(column: &str, seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{seconds}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadMappingStore for MySqlStore {
    async fn lookup(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let row = sqlx::query(
            r#"
            SELECT destination, created_at, expire_at
            FROM short_urls
            WHERE short_code = ?
              AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let destination: String = row.try_get("destination").map_err(map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
        let expire_at: Option<i64> = row.try_get("expire_at").map_err(map_sqlx_error)?;

        Ok(Some(UrlRecord {
            code: code.clone(),
            destination: Destination::from_trusted(destination),
            created_at: parse_timestamp("created_at", created_at)?,
            expires_at: expire_at
                .map(|seconds| parse_timestamp("expire_at", seconds))
                .transpose()?,
        }))
    }
}

#[async_trait]
impl MappingStore for MySqlStore {
    async fn try_insert(&self, record: UrlRecord) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (short_code, destination, created_at, expire_at, deleted_at)
            VALUES (?, ?, ?, ?, NULL)
            "#,
        )
        .bind(record.code.as_str())
        .bind(record.destination.as_str())
        .bind(record.created_at.as_second())
        .bind(record.expires_at.map(|ts| ts.as_second()))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(err) if is_unique_violation(&err) => {
                debug!(code = %record.code, "duplicate short code rejected by unique index");
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET deleted_at = ?
            WHERE short_code = ?
              AND deleted_at IS NULL
            "#,
        )
        .bind(Timestamp::now().as_second())
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn sweep_expired(&self, now: Timestamp) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET deleted_at = ?
            WHERE deleted_at IS NULL
              AND expire_at IS NOT NULL
              AND expire_at <= ?
            "#,
        )
        .bind(now.as_second())
        .bind(now.as_second())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SequenceStore for MySqlStore {
    async fn reserve(&self, sequence: &str, size: u64) -> Result<u64> {
        // LAST_INSERT_ID is per connection, so both statements share one
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO short_code_sequences (name, next_value)
            VALUES (?, LAST_INSERT_ID(?))
            ON DUPLICATE KEY UPDATE next_value = LAST_INSERT_ID(next_value + ?)
            "#,
        )
        .bind(sequence)
        .bind(size)
        .bind(size)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        let end: u64 = sqlx::query_scalar("SELECT LAST_INSERT_ID()")
            .fetch_one(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;

        let start = end.checked_sub(size).ok_or_else(|| {
            StorageError::InvalidData(format!(
                "sequence {sequence} ended at {end}, below the block size {size}"
            ))
        })?;
        debug!(sequence, start, size, "reserved sequence block");
        Ok(start)
    }
}
