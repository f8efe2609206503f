//! PostgreSQL backend.

use super::sequence::SequenceState;
use super::store::{TemplateStore, validate_identifier};
use crate::config::DatabaseConfig;
use crate::types::{Template, TemplateFilter};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow, PgSslMode};
use sqlx::types::Json;
use sqlx::Row;
use tracing::{debug, info};

const SELECT_TEMPLATES: &str = "SELECT id::bigint AS id, name, category, subcategory,
        prompt_template, inputs::jsonb AS inputs, updated_at::timestamptz AS updated_at
    FROM templates";

/// A single-connection pool; statements run strictly one after another.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(if config.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Prefer
            });

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {}", config.describe()))?;

        info!(target_db = %config.describe(), "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Fully qualified name of the sequence behind `table.id`.
    async fn serial_sequence(&self, table: &str) -> Result<String> {
        let sequence: Option<String> =
            sqlx::query_scalar("SELECT pg_get_serial_sequence($1, 'id')")
                .bind(table)
                .fetch_one(&self.pool)
                .await?;
        sequence.ok_or_else(|| anyhow!("Table {} has no serial id sequence", table))
    }
}

fn template_from_row(row: &PgRow) -> Result<Template> {
    Ok(Template {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        subcategory: row.try_get("subcategory")?,
        prompt_template: row
            .try_get::<Option<String>, _>("prompt_template")?
            .unwrap_or_default(),
        inputs: row
            .try_get::<Option<Value>, _>("inputs")?
            .unwrap_or(Value::Null),
        updated_at: row.try_get::<Option<DateTime<Utc>>, _>("updated_at")?,
    })
}

#[async_trait]
impl TemplateStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_templates(&self, filter: &TemplateFilter) -> Result<Vec<Template>> {
        let sql = format!(
            "{} WHERE ($1::text IS NULL OR name = $1)
               AND ($2::text IS NULL OR category = $2)
               AND ($3::text IS NULL OR subcategory = $3)
             ORDER BY id",
            SELECT_TEMPLATES
        );
        let rows = sqlx::query(&sql)
            .bind(filter.name.as_deref())
            .bind(filter.category.as_deref())
            .bind(filter.subcategory.as_deref())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list templates")?;
        rows.iter().map(template_from_row).collect()
    }

    async fn get_template(&self, id: i64) -> Result<Option<Template>> {
        let sql = format!("{} WHERE id = $1", SELECT_TEMPLATES);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read template {}", id))?;
        row.as_ref().map(template_from_row).transpose()
    }

    async fn update_template(&self, id: i64, prompt: &str, inputs: &Value) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE templates SET prompt_template = $1, inputs = $2, updated_at = NOW()
             WHERE id = $3",
        )
        .bind(prompt)
        .bind(Json(inputs))
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update template {}", id))?;
        debug!(template_id = id, changed = result.rows_affected(), "Updated template row");
        Ok(result.rows_affected() > 0)
    }

    async fn sequence_state(&self, table: &str) -> Result<SequenceState> {
        let table = validate_identifier(table)?;
        let sequence = self.serial_sequence(table).await?;

        let max_id: Option<i64> =
            sqlx::query_scalar(&format!("SELECT MAX(id)::bigint FROM {}", table))
                .fetch_one(&self.pool)
                .await?;
        // `sequence` comes back from pg_get_serial_sequence already quoted.
        // Before the first nextval after setval(.., false), last_value is the
        // id still to be handed out.
        let last_value: i64 = sqlx::query_scalar(&format!(
            "SELECT CASE WHEN is_called THEN last_value ELSE last_value - 1 END FROM {}",
            sequence
        ))
        .fetch_one(&self.pool)
        .await?;

        Ok(SequenceState {
            table: table.to_string(),
            max_id,
            last_value,
        })
    }

    async fn set_sequence_next(&self, table: &str, next: i64) -> Result<()> {
        let table = validate_identifier(table)?;
        let sequence = self.serial_sequence(table).await?;
        sqlx::query("SELECT setval($1::regclass, $2, false)")
            .bind(&sequence)
            .bind(next)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to reset sequence {}", sequence))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
