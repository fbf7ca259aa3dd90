use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] sqlx::Error),
}

/// One outbound call as stored in `api_logs`. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiCallRecord {
    pub id: String,
    pub method: String,
    pub endpoint: String,
    pub payload: Option<String>,
    pub status_code: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApiCall {
    pub method: String,
    pub endpoint: String,
    pub payload: Option<String>,
    pub status_code: i32,
}

#[async_trait]
pub trait ApiLogSink: Send + Sync {
    async fn record(&self, call: NewApiCall) -> Result<ApiCallRecord, DatabaseError>;
}

pub struct ApiLogStore {
    pool: SqlitePool,
}

impl ApiLogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_tables(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_logs (
                id TEXT PRIMARY KEY,
                method TEXT NOT NULL,
                endpoint TEXT NOT NULL,
                payload TEXT,
                status_code INTEGER NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_api_logs_created_at ON api_logs(created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

#[async_trait]
impl ApiLogSink for ApiLogStore {
    async fn record(&self, call: NewApiCall) -> Result<ApiCallRecord, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();

        let result = sqlx::query_as::<_, ApiCallRecord>(
            r#"
            INSERT INTO api_logs (id, method, endpoint, payload, status_code, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(call.method)
        .bind(call.endpoint)
        .bind(call.payload)
        .bind(call.status_code)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }
}

// In-memory sink for tests
#[cfg(test)]
pub struct MemoryApiLog {
    records: tokio::sync::RwLock<Vec<ApiCallRecord>>,
}

#[cfg(test)]
impl MemoryApiLog {
    pub fn new() -> Self {
        Self {
            records: tokio::sync::RwLock::new(Vec::new()),
        }
    }

    pub async fn records(&self) -> Vec<ApiCallRecord> {
        self.records.read().await.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ApiLogSink for MemoryApiLog {
    async fn record(&self, call: NewApiCall) -> Result<ApiCallRecord, DatabaseError> {
        let record = ApiCallRecord {
            id: Uuid::new_v4().to_string(),
            method: call.method,
            endpoint: call.endpoint,
            payload: call.payload,
            status_code: call.status_code,
            created_at: chrono::Utc::now(),
        };

        self.records.write().await.push(record.clone());
        Ok(record)
    }
}
