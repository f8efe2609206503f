//! Read-only reports: `check`, `scan` and `show`.

use super::build_checker;
use crate::cli::check::CheckArgs;
use crate::cli::scan::ScanArgs;
use crate::cli::show::ShowArgs;
use crate::config::Config;
use crate::db::TemplateStore;
use crate::format::{
    ReportFormat, format_report_line, format_report_text, format_tally, format_template_heading,
};
use crate::types::{Template, TemplateFilter};
use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, warn};

/// Tally of a verification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub total: usize,
    pub correct: usize,
    pub with_hardcoded: usize,
}

impl CheckSummary {
    pub fn all_correct(&self) -> bool {
        self.correct == self.total
    }
}

pub async fn run_check(
    store: &dyn TemplateStore,
    config: &Config,
    args: &CheckArgs,
) -> Result<CheckSummary> {
    let mut checker_config = config.checker.clone();
    if let Some(strategy) = args.match_strategy {
        checker_config.match_strategy = strategy;
    }
    let checker = build_checker(&checker_config)?;

    let templates = store
        .list_templates(&args.filter.to_filter())
        .await
        .context("Failed to list templates")?;

    let mut summary = CheckSummary::default();
    let mut rows = Vec::new();

    for template in &templates {
        let report = checker.check_template(template);
        summary.total += 1;
        if report.is_correct() {
            summary.correct += 1;
        }
        if report.has_hardcoded() {
            summary.with_hardcoded += 1;
        }

        if args.only_issues && !report.has_issues() {
            continue;
        }

        match args.format {
            ReportFormat::Text => println!("{}", format_report_text(template, &report)),
            ReportFormat::Summary => println!("{}", format_report_line(template, &report)),
            ReportFormat::Json => rows.push(json!({
                "id": template.id,
                "name": template.name,
                "category": template.category,
                "subcategory": template.subcategory,
                "correct": report.is_correct(),
                "report": report,
            })),
        }
    }

    match args.format {
        ReportFormat::Json => {
            let output = json!({
                "templates": rows,
                "total": summary.total,
                "correct": summary.correct,
                "with_hardcoded": summary.with_hardcoded,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => println!("{}", format_tally(summary.correct, summary.total)),
    }

    info!(
        total = summary.total,
        correct = summary.correct,
        with_hardcoded = summary.with_hardcoded,
        "Verification finished"
    );
    Ok(summary)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub flagged: usize,
    pub findings: usize,
}

pub async fn run_scan(
    store: &dyn TemplateStore,
    config: &Config,
    args: &ScanArgs,
) -> Result<ScanSummary> {
    let checker = build_checker(&config.checker)?;
    let templates = store
        .list_templates(&args.filter.to_filter())
        .await
        .context("Failed to list templates")?;

    let mut summary = ScanSummary {
        scanned: templates.len(),
        ..Default::default()
    };
    let mut rows = Vec::new();

    for template in &templates {
        let report = checker.check_template(template);
        if !report.has_hardcoded() {
            continue;
        }
        summary.flagged += 1;
        summary.findings += report.hardcoded.len();

        if args.json {
            rows.push(json!({
                "id": template.id,
                "name": template.name,
                "findings": report.hardcoded,
            }));
            continue;
        }

        println!("{}", format_template_heading(template));
        for finding in &report.hardcoded {
            let suggestion = finding
                .suggested_placeholder
                .as_deref()
                .map(|p| format!(" -> {{{{{}}}}}", p))
                .unwrap_or_default();
            println!("  [{}] \"{}\"{}", finding.rule, finding.matched, suggestion);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!(
            "{} of {} template(s) contain hardcoded values ({} finding(s))",
            summary.flagged, summary.scanned, summary.findings
        );
    }
    Ok(summary)
}

/// Print the matching templates. Returns how many were shown; none is not an error.
pub async fn run_show(store: &dyn TemplateStore, config: &Config, args: &ShowArgs) -> Result<usize> {
    let checker = build_checker(&config.checker)?;

    let templates: Vec<Template> = match (args.id, &args.name) {
        (Some(id), _) => store.get_template(id).await?.into_iter().collect(),
        (None, Some(name)) => store.list_templates(&TemplateFilter::by_name(name)).await?,
        (None, None) => Vec::new(),
    };

    if templates.is_empty() {
        let wanted = args
            .id
            .map(|id| format!("id {}", id))
            .or_else(|| args.name.as_ref().map(|n| format!("name '{}'", n)))
            .unwrap_or_default();
        warn!(wanted = %wanted, "Template not found");
        println!("No template found with {}", wanted);
        return Ok(0);
    }

    for template in &templates {
        let report = checker.check_template(template);
        print!("{}", format_report_text(template, &report));
        println!("  prompt:");
        for line in template.prompt_template.lines() {
            println!("    {}", line);
        }
        println!("  inputs:");
        let inputs = serde_json::to_string_pretty(&template.inputs)?;
        for line in inputs.lines() {
            println!("    {}", line);
        }
        if let Some(updated_at) = template.updated_at {
            println!("  updated_at: {}", updated_at.to_rfc3339());
        }
        println!();
    }
    Ok(templates.len())
}
