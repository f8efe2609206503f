//! The storage seam shared by both backends.

use super::sequence::SequenceState;
use crate::error::{AuditError, AuditResult};
use crate::types::{Template, TemplateFilter};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Row access used by every command. Calls are issued one at a time.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Templates matching `filter`, ordered by id.
    async fn list_templates(&self, filter: &TemplateFilter) -> Result<Vec<Template>>;

    async fn get_template(&self, id: i64) -> Result<Option<Template>>;

    /// Overwrite prompt text and inputs and bump `updated_at`.
    /// Returns `false` when no row has that id.
    async fn update_template(&self, id: i64, prompt: &str, inputs: &Value) -> Result<bool>;

    /// Highest id in `table` and the last value of its id sequence.
    async fn sequence_state(&self, table: &str) -> Result<SequenceState>;

    /// Make `next` the next id generated for `table`.
    async fn set_sequence_next(&self, table: &str, next: i64) -> Result<()>;

    /// Release the connection.
    async fn close(&self);
}

/// Accept only plain identifiers for table names interpolated into SQL.
pub fn validate_identifier(name: &str) -> AuditResult<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(AuditError::InvalidIdentifier(name.to_string()))
    }
}
