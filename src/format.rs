//! Human-readable rendering of reports.

use crate::checker::{ConsistencyReport, NumberFieldStatus};
use crate::db::{SequenceRepair, SequenceState};
use crate::fix::FixPlan;
use crate::types::Template;

/// Output format for the verification report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Summary,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "summary" => Ok(ReportFormat::Summary),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: text, json, summary",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Summary => write!(f, "summary"),
        }
    }
}

/// `#12 Pinterest Descriptions [social/pinterest]`
pub fn format_template_heading(template: &Template) -> String {
    format!(
        "#{} {} [{}]",
        template.id,
        template.name,
        template.category_path()
    )
}

/// Multi-line report for one template.
pub fn format_report_text(template: &Template, report: &ConsistencyReport) -> String {
    let mut out = String::new();
    let verdict = if report.is_correct() { "OK" } else { "INCORRECT" };
    out.push_str(&format!("{}  {}\n", format_template_heading(template), verdict));

    if report.placeholders.is_empty() {
        out.push_str("  placeholders: (none)\n");
    } else {
        out.push_str(&format!("  placeholders: {}\n", report.placeholders.join(", ")));
    }

    for field in &report.fields {
        let mark = if field.referenced { "+" } else { "-" };
        out.push_str(&format!("  {} field {} ({})\n", mark, field.name, field.kind));
    }

    for check in &report.number_fields {
        if check.status == NumberFieldStatus::MissingPlaceholder {
            out.push_str(&format!(
                "  ! number field '{}' has no {{{{{}}}}} in the prompt\n",
                check.name, check.name
            ));
        }
    }

    for name in report.undeclared_placeholders() {
        out.push_str(&format!("  ! placeholder {{{{{}}}}} has no input field\n", name));
    }

    for finding in &report.hardcoded {
        match &finding.suggested_placeholder {
            Some(p) => out.push_str(&format!(
                "  ~ hardcoded [{}] \"{}\" -> {{{{{}}}}}\n",
                finding.rule, finding.matched, p
            )),
            None => out.push_str(&format!(
                "  ~ hardcoded [{}] \"{}\"\n",
                finding.rule, finding.matched
            )),
        }
    }

    out
}

/// One line per template for the summary format.
pub fn format_report_line(template: &Template, report: &ConsistencyReport) -> String {
    let verdict = if report.is_correct() { "ok" } else { "FAIL" };
    format!(
        "{:<5} {}  issues={} hardcoded={}",
        verdict,
        format_template_heading(template),
        report.issue_count(),
        report.hardcoded.len()
    )
}

/// `3/4 templates correct (75.0%)`
pub fn format_tally(correct: usize, total: usize) -> String {
    if total == 0 {
        return "0/0 templates correct".to_string();
    }
    format!(
        "{}/{} templates correct ({:.1}%)",
        correct,
        total,
        correct as f64 * 100.0 / total as f64
    )
}

pub fn format_fix_plan(plan: &FixPlan) -> String {
    let mut out = format!("#{} {}\n", plan.template_id, plan.template_name);
    for sub in &plan.substitutions {
        out.push_str(&format!(
            "  {} -> {{{{{}}}}}  [{}]\n",
            sub.literal, sub.placeholder, sub.rule
        ));
    }
    for name in &plan.added_fields {
        out.push_str(&format!("  + number field '{}'\n", name));
    }
    out
}

pub fn format_sequence(state: &SequenceState, repair: &SequenceRepair) -> String {
    let max = state
        .max_id
        .map(|m| m.to_string())
        .unwrap_or_else(|| "(empty)".to_string());
    let action = match repair {
        SequenceRepair::InSync => "in sync, no change needed".to_string(),
        SequenceRepair::Advance { next } => format!("behind, next id must become {}", next),
    };
    format!(
        "{}: max(id)={} sequence last_value={} -> {}",
        state.table, max, state.last_value, action
    )
}
