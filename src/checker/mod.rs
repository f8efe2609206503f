//! Placeholder / input-field consistency checks.
//!
//! [`ConsistencyChecker::check`] is a pure function of a prompt text and its
//! declared input fields. It classifies; it never rewrites. Drivers decide what
//! to do with the report (see `crate::fix` and the `replace` command).
//!
//! The report answers four questions:
//! 1. Which placeholders does the text contain?
//! 2. Is each declared field referenced by some placeholder (under the
//!    configured [`MatchStrategy`])?
//! 3. Is each placeholder declared by some field (exact name)?
//! 4. Does every `number` field have its exact placeholder? This is the
//!    pass/fail tally used by verification reports.
//!
//! Independently, the [`RuleSet`] flags numbers that look hand-typed.

pub mod placeholders;
pub mod rules;

pub use placeholders::{extract_placeholders, placeholder_spans, placeholder_token};
pub use rules::{HardcodedRule, RuleSet, RuleSpec, load_rules_file};

use crate::types::{FieldKind, InputField, Template};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

/// Rule name used for digits flagged because a number field lacks its placeholder.
pub const BARE_NUMBER_RULE: &str = "bare-number";

static BARE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\b").expect("bare number pattern is valid"));

/// How a declared field name is matched against extracted placeholders.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Placeholder must equal the field name.
    Exact,
    /// Field name may appear anywhere inside a placeholder name.
    #[default]
    Substring,
}

impl MatchStrategy {
    pub fn matches(self, field_name: &str, placeholder: &str) -> bool {
        if field_name.is_empty() {
            return false;
        }
        match self {
            MatchStrategy::Exact => placeholder == field_name,
            MatchStrategy::Substring => placeholder.contains(field_name),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Substring => "substring",
        }
    }
}

impl std::str::FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(MatchStrategy::Exact),
            "substring" => Ok(MatchStrategy::Substring),
            _ => Err(format!(
                "Invalid match strategy '{}'. Valid options: exact, substring",
                s
            )),
        }
    }
}

/// Whether a declared field is referenced by the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldUsage {
    pub name: String,
    pub kind: FieldKind,
    pub referenced: bool,
}

/// Whether a placeholder in the text has a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderUsage {
    pub name: String,
    pub declared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFieldStatus {
    Ok,
    MissingPlaceholder,
}

/// Exact-name check for a `number` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberFieldCheck {
    pub name: String,
    pub status: NumberFieldStatus,
}

impl NumberFieldCheck {
    pub fn is_ok(&self) -> bool {
        self.status == NumberFieldStatus::Ok
    }
}

/// A number in the text that probably should have been a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardcodedFinding {
    pub rule: String,
    /// The matched phrase.
    pub matched: String,
    pub span: Range<usize>,
    /// The literal number inside the phrase, when the rule captures it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_span: Option<Range<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_placeholder: Option<String>,
}

/// Result of checking one prompt text against its input fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub placeholders: Vec<String>,
    pub fields: Vec<FieldUsage>,
    pub placeholder_coverage: Vec<PlaceholderUsage>,
    pub number_fields: Vec<NumberFieldCheck>,
    pub hardcoded: Vec<HardcodedFinding>,
}

impl ConsistencyReport {
    /// Every `number` field has its exact placeholder.
    pub fn is_correct(&self) -> bool {
        self.number_fields.iter().all(NumberFieldCheck::is_ok)
    }

    pub fn has_hardcoded(&self) -> bool {
        !self.hardcoded.is_empty()
    }

    pub fn missing_number_placeholders(&self) -> Vec<&str> {
        self.number_fields
            .iter()
            .filter(|c| !c.is_ok())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn unreferenced_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.referenced)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn undeclared_placeholders(&self) -> Vec<&str> {
        self.placeholder_coverage
            .iter()
            .filter(|p| !p.declared)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Number of individual problems of any kind.
    pub fn issue_count(&self) -> usize {
        self.missing_number_placeholders().len()
            + self.unreferenced_fields().len()
            + self.undeclared_placeholders().len()
            + self.hardcoded.len()
    }

    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }
}

/// Checks templates against a rule set with a chosen match strategy.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyChecker {
    rules: RuleSet,
    strategy: MatchStrategy,
}

impl ConsistencyChecker {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            strategy: MatchStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn check_template(&self, template: &Template) -> ConsistencyReport {
        self.check(&template.prompt_template, &template.input_fields())
    }

    pub fn check(&self, prompt: &str, fields: &[InputField]) -> ConsistencyReport {
        let placeholders = extract_placeholders(prompt);

        let field_usage: Vec<FieldUsage> = fields
            .iter()
            .map(|f| FieldUsage {
                name: f.name.clone(),
                kind: f.kind.clone(),
                referenced: placeholders
                    .iter()
                    .any(|p| self.strategy.matches(&f.name, p)),
            })
            .collect();

        let placeholder_coverage: Vec<PlaceholderUsage> = placeholders
            .iter()
            .map(|p| PlaceholderUsage {
                name: p.clone(),
                declared: fields.iter().any(|f| &f.name == p),
            })
            .collect();

        let number_fields: Vec<NumberFieldCheck> = fields
            .iter()
            .filter(|f| f.kind.is_number())
            .map(|f| NumberFieldCheck {
                name: f.name.clone(),
                status: if placeholders.iter().any(|p| p == &f.name) {
                    NumberFieldStatus::Ok
                } else {
                    NumberFieldStatus::MissingPlaceholder
                },
            })
            .collect();

        let missing: Vec<&str> = number_fields
            .iter()
            .filter(|c| !c.is_ok())
            .map(|c| c.name.as_str())
            .collect();
        let hardcoded = self.find_hardcoded(prompt, &missing);

        ConsistencyReport {
            placeholders,
            fields: field_usage,
            placeholder_coverage,
            number_fields,
            hardcoded,
        }
    }

    fn find_hardcoded(&self, prompt: &str, missing_numbers: &[&str]) -> Vec<HardcodedFinding> {
        let mut findings: Vec<HardcodedFinding> = self
            .rules
            .scan(prompt)
            .into_iter()
            .map(|hit| HardcodedFinding {
                rule: hit.rule.name().to_string(),
                matched: prompt[hit.span.clone()].to_string(),
                value: hit.value_span.clone().map(|r| prompt[r].to_string()),
                value_span: hit.value_span,
                span: hit.span,
                suggested_placeholder: hit.rule.placeholder().map(String::from),
            })
            .collect();

        if missing_numbers.is_empty() {
            return findings;
        }

        let mut covered: Vec<Range<usize>> = findings.iter().map(|f| f.span.clone()).collect();
        covered.extend(placeholder_spans(prompt));

        let bare: Vec<Range<usize>> = BARE_NUMBER_RE
            .find_iter(prompt)
            .map(|m| m.range())
            .filter(|r| !covered.iter().any(|c| overlaps(c, r)))
            .collect();

        findings.extend(bare.into_iter().map(|r| HardcodedFinding {
            rule: BARE_NUMBER_RULE.to_string(),
            matched: prompt[r.clone()].to_string(),
            value: Some(prompt[r.clone()].to_string()),
            value_span: Some(r.clone()),
            span: r,
            suggested_placeholder: None,
        }));

        // One missing field and one literal count: the literal belongs to that field.
        if let [only] = missing_numbers {
            let mut numbers: Vec<&Range<usize>> = Vec::new();
            for span in findings.iter().filter_map(|f| f.value_span.as_ref()) {
                if !numbers.iter().any(|n| overlaps(n, span)) {
                    numbers.push(span);
                }
            }
            if numbers.len() == 1 {
                for finding in findings.iter_mut().filter(|f| f.value_span.is_some()) {
                    finding.suggested_placeholder = Some(only.to_string());
                }
            }
        }

        findings
    }
}

pub(crate) fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
