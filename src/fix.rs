//! Rewrites for hardcoded counts.
//!
//! Given a template and its consistency report, [`plan_fix`] replaces each
//! flagged literal that has a suggested placeholder with `{{placeholder}}` and
//! appends a `number` input field for any placeholder the template does not
//! declare yet. The checker itself never rewrites; this is the driver side.

use crate::checker::{ConsistencyReport, HardcodedFinding, overlaps, placeholder_token};
use crate::types::{InputField, Template};
use heck::ToTitleCase;
use serde::Serialize;
use serde_json::Value;
use std::ops::Range;
use tracing::warn;

/// One literal replaced by a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub rule: String,
    pub literal: String,
    pub placeholder: String,
}

/// New prompt text and inputs for one template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixPlan {
    pub template_id: i64,
    pub template_name: String,
    pub prompt: String,
    pub inputs: Value,
    pub substitutions: Vec<Substitution>,
    /// Names of input fields appended to the list.
    pub added_fields: Vec<String>,
}

/// Plan the rewrite for `template`, or `None` when nothing is fixable.
pub fn plan_fix(template: &Template, report: &ConsistencyReport) -> Option<FixPlan> {
    let picked = pick_substitutions(&report.hardcoded);
    if picked.is_empty() {
        return None;
    }

    let mut prompt = template.prompt_template.clone();
    let mut substitutions = Vec::with_capacity(picked.len());
    // Right to left so earlier byte offsets stay valid.
    for (span, finding, placeholder) in picked.iter().rev() {
        prompt.replace_range(span.clone(), &placeholder_token(placeholder));
        substitutions.push(Substitution {
            rule: finding.rule.clone(),
            literal: finding.value.clone().unwrap_or_default(),
            placeholder: placeholder.to_string(),
        });
    }
    substitutions.reverse();

    let mut fields = editable_inputs(template);
    let mut added_fields = Vec::new();
    for sub in &substitutions {
        let declared = fields
            .iter()
            .any(|f| f.get("name").and_then(Value::as_str) == Some(sub.placeholder.as_str()));
        if declared || added_fields.contains(&sub.placeholder) {
            continue;
        }
        fields.push(new_number_field(&sub.placeholder, &sub.literal).to_value());
        added_fields.push(sub.placeholder.clone());
    }

    Some(FixPlan {
        template_id: template.id,
        template_name: template.name.clone(),
        prompt,
        inputs: Value::Array(fields),
        substitutions,
        added_fields,
    })
}

/// Fixable findings in text order, dropping any whose number overlaps one
/// already taken (several rules can match the same literal).
fn pick_substitutions(findings: &[HardcodedFinding]) -> Vec<(Range<usize>, &HardcodedFinding, &str)> {
    let mut candidates: Vec<(Range<usize>, &HardcodedFinding, &str)> = findings
        .iter()
        .filter_map(|f| {
            let span = f.value_span.clone()?;
            let placeholder = f.suggested_placeholder.as_deref()?;
            Some((span, f, placeholder))
        })
        .collect();
    candidates.sort_by_key(|(span, _, _)| span.start);

    let mut picked: Vec<(Range<usize>, &HardcodedFinding, &str)> = Vec::new();
    for candidate in candidates {
        if picked.iter().all(|(taken, _, _)| !overlaps(taken, &candidate.0)) {
            picked.push(candidate);
        }
    }
    picked
}

/// The stored inputs as a mutable JSON array.
fn editable_inputs(template: &Template) -> Vec<Value> {
    match &template.inputs {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            _ => {
                warn!(template_id = template.id, "Inputs are not a JSON array; starting a new list");
                Vec::new()
            }
        },
        _ => {
            warn!(template_id = template.id, "Inputs are not a JSON array; starting a new list");
            Vec::new()
        }
    }
}

fn new_number_field(name: &str, literal: &str) -> InputField {
    let default_value = literal
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(literal.to_string()));
    InputField::number(
        name,
        &name.to_title_case(),
        &format!("e.g. {}", literal),
        Some(default_value),
    )
}
