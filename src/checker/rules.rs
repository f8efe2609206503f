//! Rule library for spotting hand-typed counts in prompt text.
//!
//! Each rule is a regular expression; capture group 1, when the pattern has
//! one, is the literal number that should have been a placeholder. The
//! built-in library covers phrasings seen in the template dataset and can be
//! extended from configuration without code changes.

use crate::config::CheckerConfig;
use crate::error::{AuditError, AuditResult};
use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Serializable description of a rule, as written in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub pattern: String,
    /// Placeholder the matched number should become, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl RuleSpec {
    pub fn new(name: &str, pattern: &str, placeholder: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            placeholder: placeholder.map(String::from),
        }
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct HardcodedRule {
    spec: RuleSpec,
    regex: Regex,
}

impl HardcodedRule {
    pub fn compile(spec: RuleSpec) -> AuditResult<Self> {
        let regex =
            Regex::new(&spec.pattern).map_err(|e| AuditError::invalid_rule(&spec.name, e))?;
        Ok(Self { spec, regex })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.spec.placeholder.as_deref()
    }
}

/// One rule hit inside a text.
#[derive(Debug, Clone)]
pub struct RuleMatch<'a> {
    pub rule: &'a HardcodedRule,
    pub span: Range<usize>,
    pub value_span: Option<Range<usize>>,
}

/// Ordered collection of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<HardcodedRule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Specs of the built-in library.
    pub fn builtin_specs() -> Vec<RuleSpec> {
        vec![
            RuleSpec::new(
                "hashtag-count",
                r"(?i)\b(\d+)\s+(?:relevant\s+|trending\s+|popular\s+|targeted\s+)?hashtags?\b",
                Some("hashtag_count"),
            ),
            RuleSpec::new(
                "pinterest-descriptions",
                r"(?i)\b(\d+)\s+(?:unique\s+|different\s+)?pinterest\s+(?:pin\s+)?descriptions?\b",
                Some("total_posts"),
            ),
            RuleSpec::new(
                "tiktok-video-ideas",
                r"(?i)\b(\d+)\s+(?:unique\s+|viral\s+)?tiktok\s+video\s+ideas?\b",
                Some("total_posts"),
            ),
            RuleSpec::new(
                "post-count",
                r"(?i)\b(\d+)\s+(?:unique\s+|different\s+|engaging\s+)?(?:social\s+media\s+)?(?:posts|captions|tweets|titles|headlines)\b",
                Some("total_posts"),
            ),
            RuleSpec::new("exact-count", r"(?i)\bexactly\s+(\d+)\b", None),
        ]
    }

    pub fn builtin() -> Self {
        Self::compile(Self::builtin_specs()).unwrap_or_default()
    }

    pub fn compile(specs: impl IntoIterator<Item = RuleSpec>) -> AuditResult<Self> {
        let rules = specs
            .into_iter()
            .map(HardcodedRule::compile)
            .collect::<AuditResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Assemble the rule set described by checker configuration:
    /// built-ins (unless disabled), then inline rules, then the rules file.
    pub fn from_config(config: &CheckerConfig) -> Result<Self> {
        let mut specs = if config.builtin_rules {
            Self::builtin_specs()
        } else {
            Vec::new()
        };
        specs.extend(config.rules.iter().cloned());
        if let Some(ref path) = config.rules_file {
            specs.extend(load_rules_file(path)?);
        }
        Ok(Self::compile(specs)?)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HardcodedRule> {
        self.rules.iter()
    }

    /// Every match of every rule, in rule order then text order.
    pub fn scan<'a>(&'a self, text: &str) -> Vec<RuleMatch<'a>> {
        let mut hits = Vec::new();
        for rule in &self.rules {
            for caps in rule.regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                if whole.as_str().is_empty() {
                    continue;
                }
                hits.push(RuleMatch {
                    rule,
                    span: whole.range(),
                    value_span: caps.get(1).map(|m| m.range()),
                });
            }
        }
        hits
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RulesFile {
    List(Vec<RuleSpec>),
    Wrapped { rules: Vec<RuleSpec> },
}

/// Load rule specs from a YAML file: either a bare list or `{ rules: [...] }`.
pub fn load_rules_file(path: &Path) -> Result<Vec<RuleSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
    let parsed: RulesFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse rules file: {}", path.display()))?;
    Ok(match parsed {
        RulesFile::List(rules) | RulesFile::Wrapped { rules } => rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn matched<'a>(set: &RuleSet, text: &'a str) -> Vec<(String, &'a str)> {
        set.scan(text)
            .into_iter()
            .map(|m| (m.rule.name().to_string(), &text[m.span]))
            .collect()
    }

    #[test]
    fn builtin_rules_compile() {
        assert_eq!(RuleSet::builtin().len(), RuleSet::builtin_specs().len());
    }

    #[test]
    fn builtin_rules_flag_known_phrasings() {
        let set = RuleSet::builtin();

        let hits = matched(&set, "Include 10 relevant hashtags at the end.");
        assert_eq!(hits, vec![("hashtag-count".to_string(), "10 relevant hashtags")]);

        let hits = matched(&set, "Write 5 Pinterest descriptions for my board");
        assert_eq!(hits[0].0, "pinterest-descriptions");

        let hits = matched(&set, "Give me 7 TikTok video ideas");
        assert_eq!(hits[0], ("tiktok-video-ideas".to_string(), "7 TikTok video ideas"));
    }

    #[test]
    fn value_span_points_at_number() {
        let set = RuleSet::builtin();
        let text = "Create 12 captions";
        let hit = &set.scan(text)[0];
        assert_eq!(&text[hit.value_span.clone().unwrap()], "12");
    }

    #[test]
    fn placeholders_are_not_flagged() {
        let set = RuleSet::builtin();
        assert!(set.scan("Write {{total_posts}} Pinterest descriptions").is_empty());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = RuleSet::compile(vec![RuleSpec::new("broken", r"(\d+", None)]).unwrap_err();
        assert!(matches!(err, AuditError::InvalidRule { ref name, .. } if name == "broken"));
    }

    #[test]
    fn config_can_disable_builtins_and_add_rules() {
        let config = CheckerConfig {
            builtin_rules: false,
            rules: vec![RuleSpec::new("slides", r"\b(\d+)\s+slides\b", Some("slide_count"))],
            ..Default::default()
        };
        let set = RuleSet::from_config(&config).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().placeholder(), Some("slide_count"));
    }

    #[test]
    fn rules_file_accepts_list_and_wrapped_forms() {
        let mut list = tempfile::NamedTempFile::new().unwrap();
        writeln!(list, "- name: a\n  pattern: '\\d+ apples'").unwrap();
        assert_eq!(load_rules_file(list.path()).unwrap().len(), 1);

        let mut wrapped = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            wrapped,
            "rules:\n  - name: b\n    pattern: '(\\d+) pears'\n    placeholder: pear_count"
        )
        .unwrap();
        let specs = load_rules_file(wrapped.path()).unwrap();
        assert_eq!(specs[0].placeholder.as_deref(), Some("pear_count"));
    }
}
