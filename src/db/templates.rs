//! Template and sequence queries for the SQLite mirror.

use super::sequence::SequenceState;
use super::store::{TemplateStore, validate_identifier};
use super::{Database, now};
use crate::types::{Template, TemplateFilter};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};
use serde_json::Value;
use tracing::{debug, warn};

const TEMPLATE_COLUMNS: &str =
    "id, name, category, subcategory, prompt_template, inputs, updated_at";

/// Map a row selected with `TEMPLATE_COLUMNS`.
fn template_from_row(row: &Row) -> rusqlite::Result<Template> {
    let id: i64 = row.get(0)?;
    let raw_inputs: Option<String> = row.get(5)?;
    let updated_at = match row.get::<_, Option<DateTime<Utc>>>(6) {
        Ok(value) => value,
        Err(e) => {
            warn!(template_id = id, error = %e, "Unreadable updated_at; treating as unset");
            None
        }
    };
    Ok(Template {
        id,
        name: row.get(1)?,
        category: row.get(2)?,
        subcategory: row.get(3)?,
        prompt_template: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        inputs: decode_inputs(raw_inputs),
        updated_at,
    })
}

/// Stored text that is not valid JSON is kept as a string value.
fn decode_inputs(raw: Option<String>) -> Value {
    match raw {
        None => Value::Null,
        Some(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
    }
}

#[async_trait]
impl TemplateStore for Database {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn list_templates(&self, filter: &TemplateFilter) -> Result<Vec<Template>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM templates
                 WHERE (?1 IS NULL OR name = ?1)
                   AND (?2 IS NULL OR category = ?2)
                   AND (?3 IS NULL OR subcategory = ?3)
                 ORDER BY id",
                TEMPLATE_COLUMNS
            ))?;
            let templates = stmt
                .query_map(
                    params![filter.name, filter.category, filter.subcategory],
                    template_from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(templates)
        })
    }

    async fn get_template(&self, id: i64) -> Result<Option<Template>> {
        self.with_conn(|conn| {
            let template = conn
                .query_row(
                    &format!("SELECT {} FROM templates WHERE id = ?1", TEMPLATE_COLUMNS),
                    params![id],
                    template_from_row,
                )
                .optional()?;
            Ok(template)
        })
    }

    async fn update_template(&self, id: i64, prompt: &str, inputs: &Value) -> Result<bool> {
        let encoded = serde_json::to_string(inputs)?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE templates SET prompt_template = ?1, inputs = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![prompt, encoded, now(), id],
            )?;
            debug!(template_id = id, changed, "Updated template row");
            Ok(changed > 0)
        })
    }

    async fn sequence_state(&self, table: &str) -> Result<SequenceState> {
        let table = validate_identifier(table)?;
        self.with_conn(|conn| {
            let max_id: Option<i64> =
                conn.query_row(&format!("SELECT MAX(id) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            let last_value: i64 = conn
                .query_row(
                    "SELECT seq FROM sqlite_sequence WHERE name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .optional()?
                .unwrap_or(0);
            Ok(SequenceState {
                table: table.to_string(),
                max_id,
                last_value,
            })
        })
    }

    async fn set_sequence_next(&self, table: &str, next: i64) -> Result<()> {
        let table = validate_identifier(table)?;
        // sqlite_sequence stores the last id handed out.
        let last = next - 1;
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE sqlite_sequence SET seq = ?2 WHERE name = ?1",
                params![table, last],
            )?;
            if changed == 0 {
                conn.execute(
                    "INSERT INTO sqlite_sequence (name, seq) VALUES (?1, ?2)",
                    params![table, last],
                )?;
            }
            Ok(())
        })
    }

    async fn close(&self) {
        debug!("Releasing SQLite connection");
    }
}
