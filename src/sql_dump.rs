//! SQL file generation for manual review and execution.
//!
//! The file is a one-way export: literal `UPDATE` statements wrapped in a
//! transaction. String literals are single-quoted with embedded quotes doubled.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::Path;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SqlDialect {
    #[default]
    Postgres,
    Sqlite,
}

impl SqlDialect {
    fn json_literal(self, json: &str) -> String {
        match self {
            SqlDialect::Postgres => format!("{}::jsonb", quote_literal(json)),
            SqlDialect::Sqlite => quote_literal(json),
        }
    }

    fn now(self) -> &'static str {
        match self {
            SqlDialect::Postgres => "NOW()",
            SqlDialect::Sqlite => "CURRENT_TIMESTAMP",
        }
    }
}

impl From<crate::config::Backend> for SqlDialect {
    fn from(backend: crate::config::Backend) -> Self {
        match backend {
            crate::config::Backend::Postgres => SqlDialect::Postgres,
            crate::config::Backend::Sqlite => SqlDialect::Sqlite,
        }
    }
}

/// `'text'` with every `'` doubled.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// One `UPDATE templates ...` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateUpdate {
    pub id: i64,
    /// Shown in the comment above the statement.
    pub label: String,
    pub prompt: String,
    pub inputs: Value,
}

impl TemplateUpdate {
    pub fn render(&self, dialect: SqlDialect) -> Result<String> {
        let inputs = serde_json::to_string(&self.inputs)?;
        Ok(format!(
            "-- Template {}: {}\nUPDATE templates\nSET prompt_template = {},\n    inputs = {},\n    updated_at = {}\nWHERE id = {};\n",
            self.id,
            single_line(&self.label),
            quote_literal(&self.prompt),
            dialect.json_literal(&inputs),
            dialect.now(),
            self.id,
        ))
    }
}

/// Comments must not span lines.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A collection of updates rendered as one transaction.
#[derive(Debug, Clone, Default)]
pub struct SqlDump {
    dialect: SqlDialect,
    updates: Vec<TemplateUpdate>,
}

impl SqlDump {
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            updates: Vec::new(),
        }
    }

    pub fn push(&mut self, update: TemplateUpdate) {
        self.updates.push(update);
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn render(&self, generated_at: DateTime<Utc>) -> Result<String> {
        let mut out = String::new();
        out.push_str(&format!(
            "-- Generated by template-audit at {}\n-- {} statement(s). Review before running.\n\nBEGIN;\n\n",
            generated_at.to_rfc3339(),
            self.updates.len()
        ));
        for update in &self.updates {
            out.push_str(&update.render(self.dialect)?);
            out.push('\n');
        }
        out.push_str("COMMIT;\n");
        Ok(out)
    }

    pub fn write_to(&self, path: &Path, generated_at: DateTime<Utc>) -> Result<()> {
        let sql = self.render(generated_at)?;
        std::fs::write(path, sql)
            .with_context(|| format!("Failed to write SQL file {}", path.display()))
    }
}
