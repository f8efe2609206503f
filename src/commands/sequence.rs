//! `repair-sequence`: move a lagging id sequence past the highest id.

use crate::cli::sequence::SequenceArgs;
use crate::config::Config;
use crate::db::{SequenceRepair, SequenceState, TemplateStore, plan_sequence_repair};
use crate::format::format_sequence;
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    pub before: SequenceState,
    pub repair: SequenceRepair,
    /// State re-read after a repair was applied.
    pub after: Option<SequenceState>,
}

pub async fn run_repair_sequence(
    store: &dyn TemplateStore,
    config: &Config,
    args: &SequenceArgs,
) -> Result<SequenceOutcome> {
    let table = args
        .table
        .as_deref()
        .unwrap_or(&config.database.sequence_table);

    let before = store
        .sequence_state(table)
        .await
        .with_context(|| format!("Failed to read id sequence of {}", table))?;
    let repair = plan_sequence_repair(&before);
    println!("Before: {}", format_sequence(&before, &repair));

    let SequenceRepair::Advance { next } = repair else {
        return Ok(SequenceOutcome {
            before,
            repair,
            after: None,
        });
    };

    if args.dry_run {
        println!("Dry run: sequence not changed");
        return Ok(SequenceOutcome {
            before,
            repair,
            after: None,
        });
    }

    store
        .set_sequence_next(table, next)
        .await
        .with_context(|| format!("Failed to advance id sequence of {}", table))?;
    let after = store.sequence_state(table).await?;
    println!("After:  {}", format_sequence(&after, &plan_sequence_repair(&after)));
    info!(table = %table, next, "Sequence advanced");

    Ok(SequenceOutcome {
        before,
        repair,
        after: Some(after),
    })
}
