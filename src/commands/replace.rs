//! `replace`: overwrite templates from a replacement file.

use super::{apply_update, build_checker};
use crate::cli::replace::ReplaceArgs;
use crate::config::Config;
use crate::db::TemplateStore;
use crate::error::AuditError;
use crate::format::format_report_text;
use crate::replacement::TemplateReplacement;
use crate::types::{Template, TemplateFilter};
use anyhow::Result;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub matched: usize,
    pub updated: usize,
}

/// Overwrite the named template (or `--id`) with a replacement file.
/// No matching template is an error.
pub async fn run_replace(
    store: &dyn TemplateStore,
    config: &Config,
    args: &ReplaceArgs,
) -> Result<ReplaceSummary> {
    let replacement = TemplateReplacement::load(&args.file)?;
    let checker = build_checker(&config.checker)?;

    let targets: Vec<Template> = match args.id {
        Some(id) => store.get_template(id).await?.into_iter().collect(),
        None => {
            store
                .list_templates(&TemplateFilter::by_name(&replacement.name))
                .await?
        }
    };

    if targets.is_empty() {
        let wanted = match args.id {
            Some(id) => format!("id {}", id),
            None => format!("'{}'", replacement.name),
        };
        return Err(AuditError::not_found(format!("template {}", wanted)).into());
    }

    let mut summary = ReplaceSummary {
        matched: targets.len(),
        ..Default::default()
    };

    for target in &targets {
        if target.name != replacement.name {
            warn!(
                template_id = target.id,
                stored = %target.name,
                replacement = %replacement.name,
                "Template name differs from replacement name"
            );
        }

        if args.dry_run {
            let preview = Template {
                prompt_template: replacement.prompt_template.clone(),
                inputs: replacement.inputs.clone(),
                ..target.clone()
            };
            let report = checker.check_template(&preview);
            println!("Dry run, would replace:");
            print!("{}", format_report_text(&preview, &report));
            continue;
        }

        let updated = apply_update(
            store,
            target.id,
            &replacement.prompt_template,
            &replacement.inputs,
        )
        .await?;
        summary.updated += 1;
        info!(template_id = target.id, "Template replaced");

        let report = checker.check_template(&updated);
        println!("Replaced and verified:");
        print!("{}", format_report_text(&updated, &report));
    }

    Ok(summary)
}
