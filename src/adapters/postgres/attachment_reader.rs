//! PostgreSQL implementation of AttachmentReader.
//!
//! `lead_files` rows are written by the upload surface; this adapter
//! only reads them.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::LeadId;
use crate::ports::{AttachmentError, AttachmentLink, AttachmentReader};

/// PostgreSQL implementation of AttachmentReader.
#[derive(Clone)]
pub struct PostgresAttachmentReader {
    pool: PgPool,
}

impl PostgresAttachmentReader {
    /// Creates a new PostgresAttachmentReader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentReader for PostgresAttachmentReader {
    async fn list(&self, lead_id: LeadId) -> Result<Vec<AttachmentLink>, AttachmentError> {
        let rows = sqlx::query(
            r#"
            SELECT file_name, url
            FROM lead_files
            WHERE lead_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(lead_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AttachmentError::Lookup(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| AttachmentLink {
                file_name: row.get("file_name"),
                url: row.get("url"),
            })
            .collect())
    }
}
