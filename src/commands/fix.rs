//! `fix`: rewrite hardcoded counts into placeholders and verify each write.

use super::{apply_update, build_checker};
use crate::cli::fix::FixArgs;
use crate::config::Config;
use crate::db::TemplateStore;
use crate::fix::plan_fix;
use crate::format::format_fix_plan;
use anyhow::{Context, Result};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub scanned: usize,
    pub planned: usize,
    pub applied: usize,
    pub failed: usize,
}

/// Rewrite every template that has a fixable hardcoded count.
///
/// A failed row is reported and counted; the remaining rows are still
/// processed. Failing to list templates aborts the run.
pub async fn run_fix(store: &dyn TemplateStore, config: &Config, args: &FixArgs) -> Result<FixSummary> {
    let checker = build_checker(&config.checker)?;
    let templates = store
        .list_templates(&args.filter.to_filter())
        .await
        .context("Failed to list templates")?;

    let mut summary = FixSummary {
        scanned: templates.len(),
        ..Default::default()
    };

    for template in &templates {
        let report = checker.check_template(template);
        let Some(plan) = plan_fix(template, &report) else {
            continue;
        };
        summary.planned += 1;
        print!("{}", format_fix_plan(&plan));

        if args.dry_run {
            continue;
        }

        match apply_update(store, plan.template_id, &plan.prompt, &plan.inputs).await {
            Ok(updated) => {
                summary.applied += 1;
                let after = checker.check_template(&updated);
                println!(
                    "  updated and verified ({})",
                    if after.is_correct() { "now correct" } else { "still incorrect" }
                );
                info!(template_id = plan.template_id, "Template fixed");
            }
            Err(e) => {
                summary.failed += 1;
                error!(template_id = plan.template_id, error = %e, "Failed to fix template");
                println!("  FAILED: {:#}", e);
            }
        }
    }

    if args.dry_run {
        println!(
            "Dry run: {} of {} template(s) would be changed",
            summary.planned, summary.scanned
        );
    } else {
        println!(
            "Fixed {} of {} planned template(s) ({} failed, {} scanned)",
            summary.applied, summary.planned, summary.failed, summary.scanned
        );
    }
    Ok(summary)
}
