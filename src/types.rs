//! Core types for template auditing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A stored prompt template row.
///
/// `inputs` holds the column exactly as stored so that writes can round-trip
/// without normalization. Use [`Template::input_fields`] for the typed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub prompt_template: String,
    pub inputs: Value,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Template {
    /// Typed input field descriptors parsed leniently from `inputs`.
    pub fn input_fields(&self) -> Vec<InputField> {
        InputField::parse_list(&self.inputs)
    }

    /// `category/subcategory`, or whichever part is present.
    pub fn category_path(&self) -> String {
        match (self.category.as_deref(), self.subcategory.as_deref()) {
            (Some(c), Some(s)) => format!("{}/{}", c, s),
            (Some(c), None) => c.to_string(),
            (None, Some(s)) => s.to_string(),
            (None, None) => "-".to_string(),
        }
    }
}

/// Kind of value an input field collects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Textarea,
    Select,
    /// Any kind this tool does not interpret, kept verbatim.
    Other(String),
}

impl FieldKind {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "textarea" => FieldKind::Textarea,
            "select" => FieldKind::Select,
            _ => FieldKind::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Other(s) => s,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, FieldKind::Number)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FieldKind::parse(&s))
    }
}

/// One value a user supplies to fill a template's placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl InputField {
    /// A required number field, as appended when a hardcoded count is replaced.
    pub fn number(name: &str, label: &str, example: &str, default_value: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Number,
            label: Some(label.to_string()),
            placeholder: Some(example.to_string()),
            required: true,
            default_value,
        }
    }

    /// Parse a stored `inputs` value.
    ///
    /// Accepts an array of objects or a string holding a JSON array (the column
    /// is sometimes double-encoded). Entries without a string `name` are skipped
    /// and anything unrecognized yields an empty list.
    pub fn parse_list(value: &Value) -> Vec<InputField> {
        match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_object().and_then(Self::from_object))
                .collect(),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(inner @ Value::Array(_)) => Self::parse_list(&inner),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        let name = obj.get("name")?.as_str()?.to_string();
        let text = |key: &str| obj.get(key).and_then(|v| v.as_str()).map(String::from);

        let required = match obj.get("required") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        };

        let default_value = obj
            .get("default")
            .or_else(|| obj.get("defaultValue"))
            .filter(|v| !v.is_null())
            .cloned();

        Some(Self {
            name,
            kind: text("type").map(|t| FieldKind::parse(&t)).unwrap_or_default(),
            label: text("label"),
            placeholder: text("placeholder"),
            required,
            default_value,
        })
    }

    /// JSON object form used when appending a field to a stored list.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Optional row filter for listing templates. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

impl TemplateFilter {
    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}
