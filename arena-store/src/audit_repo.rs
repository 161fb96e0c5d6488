use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use arena_core::repository::{AuditRepository, RepoError};
use arena_shared::models::AuditEntry;

/// Append-only: there is deliberately no update or delete statement in
/// this module.
pub struct StoreAuditRepository {
    pool: PgPool,
}

impl StoreAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    entry_type: String,
    message: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl AuditRepository for StoreAuditRepository {
    async fn append(&self, entry_type: &str, message: &str) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO audit_log (id, entry_type, message, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(entry_type)
        .bind(message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>, RepoError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT id, entry_type, message, created_at FROM audit_log ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AuditEntry {
                id: row.id,
                entry_type: row.entry_type,
                message: row.message,
                created_at: row.created_at,
            })
            .collect())
    }
}
