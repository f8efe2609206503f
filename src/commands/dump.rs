//! `dump-sql`: write pending template changes to a reviewable SQL file.

use super::build_checker;
use crate::cli::dump::DumpArgs;
use crate::config::Config;
use crate::db::{TemplateStore, now};
use crate::fix::plan_fix;
use crate::sql_dump::{SqlDialect, SqlDump, TemplateUpdate};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpSummary {
    pub path: PathBuf,
    pub statements: usize,
}

/// Write the updates `fix` would apply (or, with `--all`, every selected
/// template as it is now) to a SQL file.
pub async fn run_dump_sql(
    store: &dyn TemplateStore,
    config: &Config,
    args: &DumpArgs,
) -> Result<DumpSummary> {
    let checker = build_checker(&config.checker)?;
    let dialect = args
        .dialect
        .unwrap_or_else(|| SqlDialect::from(config.database.backend));
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.sql_dump_path.clone());

    let templates = store
        .list_templates(&args.filter.to_filter())
        .await
        .context("Failed to list templates")?;

    let mut dump = SqlDump::new(dialect);
    for template in &templates {
        let label = format!("{} [{}]", template.name, template.category_path());
        if args.all {
            dump.push(TemplateUpdate {
                id: template.id,
                label,
                prompt: template.prompt_template.clone(),
                inputs: template.inputs.clone(),
            });
            continue;
        }

        let report = checker.check_template(template);
        if let Some(plan) = plan_fix(template, &report) {
            dump.push(TemplateUpdate {
                id: plan.template_id,
                label,
                prompt: plan.prompt,
                inputs: plan.inputs,
            });
        }
    }

    dump.write_to(&path, now())?;
    println!(
        "Wrote {} statement(s) to {}",
        dump.len(),
        path.display()
    );
    info!(path = %path.display(), statements = dump.len(), "SQL dump written");

    Ok(DumpSummary {
        path,
        statements: dump.len(),
    })
}
