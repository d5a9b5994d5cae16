use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imgops_core::{AppError, HistoryRecord, NewHistoryRecord, OperationKind};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

/// Transactional record store for operation history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn HistoryTransaction>, AppError>;
}

/// An open history transaction.
///
/// Dropping it without calling `commit` discards every insert made through it.
#[async_trait]
pub trait HistoryTransaction: Send {
    async fn insert(&mut self, record: &NewHistoryRecord) -> Result<HistoryRecord, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    id: i32,
    timestamp: DateTime<Utc>,
    #[sqlx(rename = "type")]
    operation: String,
    extension_before: String,
    extension_after: String,
    size_before_mb: f64,
    size_after_mb: f64,
    width_before_px: i32,
    height_before_px: i32,
    width_after_px: i32,
    height_after_px: i32,
    image_link_before: String,
    image_link_after: String,
}

impl TryFrom<HistoryRow> for HistoryRecord {
    type Error = AppError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let operation = row
            .operation
            .parse::<OperationKind>()
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        Ok(HistoryRecord {
            id: row.id,
            timestamp: row.timestamp,
            operation,
            extension_before: row.extension_before,
            extension_after: row.extension_after,
            size_before_mb: row.size_before_mb,
            size_after_mb: row.size_after_mb,
            width_before_px: row.width_before_px,
            height_before_px: row.height_before_px,
            width_after_px: row.width_after_px,
            height_after_px: row.height_after_px,
            image_link_before: row.image_link_before,
            image_link_after: row.image_link_after,
        })
    }
}

fn persistence_error(context: &str, err: sqlx::Error) -> AppError {
    tracing::error!(error = %err, "{}", context);
    AppError::Persistence(format!("{}: {}", context, err))
}

/// Postgres-backed history store
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recent records first
    #[tracing::instrument(skip(self), fields(db.table = "histories", db.operation = "select"))]
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<HistoryRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, HistoryRow>(
            "SELECT * FROM histories ORDER BY timestamp DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| persistence_error("Failed to list history", e))?;

        rows.into_iter().map(HistoryRecord::try_from).collect()
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn begin(&self) -> Result<Box<dyn HistoryTransaction>, AppError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| persistence_error("Failed to begin transaction", e))?;

        Ok(Box::new(PgHistoryTransaction { tx: Some(tx) }))
    }
}

struct PgHistoryTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgHistoryTransaction {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, AppError> {
        self.tx.as_mut().ok_or_else(|| {
            AppError::Persistence("Transaction was already committed or rolled back".to_string())
        })
    }
}

#[async_trait]
impl HistoryTransaction for PgHistoryTransaction {
    #[tracing::instrument(
        skip(self, record),
        fields(db.table = "histories", db.operation = "insert", operation = %record.operation)
    )]
    async fn insert(&mut self, record: &NewHistoryRecord) -> Result<HistoryRecord, AppError> {
        let tx = self.tx()?;

        let row = sqlx::query_as::<Postgres, HistoryRow>(
            r#"
            INSERT INTO histories (
                timestamp, type, extension_before, extension_after,
                size_before_mb, size_after_mb,
                height_before_px, height_after_px, width_before_px, width_after_px,
                image_link_before, image_link_after
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(record.timestamp)
        .bind(record.operation.as_str())
        .bind(&record.extension_before)
        .bind(&record.extension_after)
        .bind(record.size_before_mb)
        .bind(record.size_after_mb)
        .bind(record.height_before_px)
        .bind(record.height_after_px)
        .bind(record.width_before_px)
        .bind(record.width_after_px)
        .bind(&record.image_link_before)
        .bind(&record.image_link_after)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| persistence_error("Failed to insert history record", e))?;

        HistoryRecord::try_from(row)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), AppError> {
        if let Some(tx) = self.tx.take() {
            tx.commit()
                .await
                .map_err(|e| persistence_error("Failed to commit transaction", e))?;
        }
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), AppError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback()
                .await
                .map_err(|e| persistence_error("Failed to rollback transaction", e))?;
        }
        Ok(())
    }
}

impl Drop for PgHistoryTransaction {
    fn drop(&mut self) {
        // sqlx rolls the inner transaction back when it is dropped
        if self.tx.is_some() {
            tracing::warn!("History transaction dropped without commit - rolling back");
        }
    }
}
