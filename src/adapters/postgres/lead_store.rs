//! PostgreSQL implementation of LeadStore.
//!
//! Transcript turns live in `lead_turns`, ordered by a bigserial id so
//! appends keep processing order. The completed marker is a conditional
//! UPDATE: the row transition is the atomic check-and-set that dedupes
//! the completion pipeline.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::LeadId;
use crate::domain::lead::{ConversationTurn, LeadCompleteness, TurnRole};
use crate::ports::{LeadStore, LeadStoreError};

/// PostgreSQL implementation of LeadStore.
#[derive(Clone)]
pub struct PostgresLeadStore {
    pool: PgPool,
}

impl PostgresLeadStore {
    /// Creates a new PostgresLeadStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PostgresLeadStore {
    async fn create_lead(&self) -> Result<LeadId, LeadStoreError> {
        let lead_id = LeadId::new();
        sqlx::query(
            r#"
            INSERT INTO leads (id, completeness, completed_marker, created_at, updated_at)
            VALUES ($1, $2, FALSE, NOW(), NOW())
            "#,
        )
        .bind(lead_id.as_uuid())
        .bind(LeadCompleteness::InProgress.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| LeadStoreError::database(format!("failed to insert lead: {e}")))?;

        Ok(lead_id)
    }

    async fn append_turn(
        &self,
        lead_id: LeadId,
        turn: &ConversationTurn,
    ) -> Result<(), LeadStoreError> {
        let suggestions = serde_json::to_string(&turn.suggestions)
            .map_err(|e| LeadStoreError::database(format!("failed to encode suggestions: {e}")))?;

        let result = sqlx::query(
            r#"
            INSERT INTO lead_turns (lead_id, role, text, suggestions, created_at)
            SELECT id, $2, $3, $4, NOW() FROM leads WHERE id = $1
            "#,
        )
        .bind(lead_id.as_uuid())
        .bind(turn.role.as_str())
        .bind(&turn.text)
        .bind(&suggestions)
        .execute(&self.pool)
        .await
        .map_err(|e| LeadStoreError::database(format!("failed to insert turn: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(LeadStoreError::NotFound(lead_id));
        }
        Ok(())
    }

    async fn get_history(&self, lead_id: LeadId) -> Result<Vec<ConversationTurn>, LeadStoreError> {
        let exists = sqlx::query("SELECT 1 FROM leads WHERE id = $1")
            .bind(lead_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LeadStoreError::database(format!("failed to look up lead: {e}")))?;
        if exists.is_none() {
            return Err(LeadStoreError::NotFound(lead_id));
        }

        let rows = sqlx::query(
            r#"
            SELECT role, text, suggestions
            FROM lead_turns
            WHERE lead_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(lead_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LeadStoreError::database(format!("failed to load transcript: {e}")))?;

        let mut transcript = Vec::with_capacity(rows.len());
        for row in rows {
            let role: String = row.get("role");
            let text: String = row.get("text");
            let suggestions: String = row.get("suggestions");

            let role = match role.as_str() {
                "user" => TurnRole::User,
                "assistant" => TurnRole::Assistant,
                other => {
                    return Err(LeadStoreError::database(format!(
                        "unknown turn role in storage: {other}"
                    )))
                }
            };
            let suggestions: Vec<String> = serde_json::from_str(&suggestions).map_err(|e| {
                LeadStoreError::database(format!("corrupt suggestions column: {e}"))
            })?;

            transcript.push(ConversationTurn {
                role,
                text,
                suggestions,
            });
        }
        Ok(transcript)
    }

    async fn set_brief(&self, lead_id: LeadId, brief: &str) -> Result<(), LeadStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leads SET brief = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(lead_id.as_uuid())
        .bind(brief)
        .execute(&self.pool)
        .await
        .map_err(|e| LeadStoreError::database(format!("failed to store brief: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(LeadStoreError::NotFound(lead_id));
        }
        Ok(())
    }

    async fn set_completeness(
        &self,
        lead_id: LeadId,
        completeness: LeadCompleteness,
    ) -> Result<(), LeadStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leads SET completeness = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(lead_id.as_uuid())
        .bind(completeness.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| LeadStoreError::database(format!("failed to update completeness: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(LeadStoreError::NotFound(lead_id));
        }
        Ok(())
    }

    async fn try_mark_completed(&self, lead_id: LeadId) -> Result<bool, LeadStoreError> {
        // The conditional UPDATE is the dedup point: exactly one caller
        // observes the FALSE -> TRUE transition.
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET completed_marker = TRUE, completeness = $2, updated_at = NOW()
            WHERE id = $1 AND completed_marker = FALSE
            "#,
        )
        .bind(lead_id.as_uuid())
        .bind(LeadCompleteness::Complete.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| LeadStoreError::database(format!("failed to set completed marker: {e}")))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Distinguish "already marked" from "no such lead".
        let exists = sqlx::query("SELECT 1 FROM leads WHERE id = $1")
            .bind(lead_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LeadStoreError::database(format!("failed to look up lead: {e}")))?;

        match exists {
            Some(_) => Ok(false),
            None => Err(LeadStoreError::NotFound(lead_id)),
        }
    }
}
