//! Whole-template replacement literals.
//!
//! A replacement file carries the full corrected prompt text and input list for
//! one named template. Applying it is a one-time migration performed by the
//! `replace` command; nothing here inspects or patches text.

use crate::error::AuditError;
use crate::types::InputField;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateReplacement {
    /// Exact template name to overwrite.
    pub name: String,
    pub prompt_template: String,
    #[serde(default = "empty_inputs")]
    pub inputs: Value,
}

fn empty_inputs() -> Value {
    Value::Array(Vec::new())
}

impl TemplateReplacement {
    /// Load from a `.json` file or any YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replacement file {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let replacement: Self = if is_json {
            serde_json::from_str(&content).map_err(|e| AuditError::replacement(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| AuditError::replacement(e.to_string()))?
        };
        replacement.validate()?;
        Ok(replacement)
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        if self.name.trim().is_empty() {
            return Err(AuditError::replacement("name must not be empty"));
        }
        let Value::Array(items) = &self.inputs else {
            return Err(AuditError::replacement("inputs must be a list"));
        };
        if let Some(pos) = items
            .iter()
            .position(|item| item.get("name").and_then(Value::as_str).is_none())
        {
            return Err(AuditError::replacement(format!(
                "input #{} has no name",
                pos + 1
            )));
        }
        Ok(())
    }

    pub fn input_fields(&self) -> Vec<InputField> {
        InputField::parse_list(&self.inputs)
    }
}
