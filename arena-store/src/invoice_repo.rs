use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use arena_core::repository::{InvoiceRepository, RepoError};
use arena_shared::models::Invoice;

pub struct StoreInvoiceRepository {
    pool: PgPool,
}

impl StoreInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    booking_id: Uuid,
    document: String,
    qr_payload: String,
    total: f64,
    generated_at: DateTime<Utc>,
}

#[async_trait]
impl InvoiceRepository for StoreInvoiceRepository {
    async fn upsert(&self, invoice: Invoice) -> Result<(), RepoError> {
        // Re-approval overwrites the previous artifact.
        sqlx::query(
            r#"
            INSERT INTO invoices (booking_id, document, qr_payload, total, generated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (booking_id) DO UPDATE
            SET document = EXCLUDED.document,
                qr_payload = EXCLUDED.qr_payload,
                total = EXCLUDED.total,
                generated_at = EXCLUDED.generated_at
            "#,
        )
        .bind(invoice.booking_id)
        .bind(&invoice.document)
        .bind(&invoice.qr_payload)
        .bind(invoice.total)
        .bind(invoice.generated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, booking_id: Uuid) -> Result<Option<Invoice>, RepoError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            "SELECT booking_id, document, qr_payload, total, generated_at FROM invoices WHERE booking_id = $1",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Invoice {
            booking_id: r.booking_id,
            document: r.document,
            qr_payload: r.qr_payload,
            total: r.total,
            generated_at: r.generated_at,
        }))
    }
}
