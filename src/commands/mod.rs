//! Subcommand drivers.
//!
//! Each `run_*` function takes an open store, the loaded configuration and
//! its parsed arguments, prints its report to stdout and returns a summary
//! the caller turns into an exit status. Statements are issued one at a time.

pub mod check;
pub mod dump;
pub mod fix;
pub mod replace;
pub mod sequence;

pub use check::{CheckSummary, ScanSummary, run_check, run_scan, run_show};
pub use dump::{DumpSummary, run_dump_sql};
pub use fix::{FixSummary, run_fix};
pub use replace::{ReplaceSummary, run_replace};
pub use sequence::{SequenceOutcome, run_repair_sequence};

use crate::checker::{ConsistencyChecker, RuleSet};
use crate::config::CheckerConfig;
use crate::db::TemplateStore;
use crate::error::AuditError;
use crate::types::Template;
use anyhow::Result;
use serde_json::Value;
use tracing::debug;

/// Checker configured with the rule set and match strategy from config.
pub fn build_checker(config: &CheckerConfig) -> Result<ConsistencyChecker> {
    let rules = RuleSet::from_config(config)?;
    debug!(
        rules = rules.len(),
        strategy = config.match_strategy.as_str(),
        "Built consistency checker"
    );
    Ok(ConsistencyChecker::new(rules).with_strategy(config.match_strategy))
}

/// Write prompt text and inputs, then read the row back and confirm both
/// round-tripped unchanged.
pub async fn apply_update(
    store: &dyn TemplateStore,
    id: i64,
    prompt: &str,
    inputs: &Value,
) -> Result<Template> {
    if !store.update_template(id, prompt, inputs).await? {
        return Err(AuditError::not_found(format!("template id {}", id)).into());
    }

    let stored = store
        .get_template(id)
        .await?
        .ok_or_else(|| AuditError::verification(id, "row disappeared after update"))?;

    if stored.prompt_template != prompt {
        return Err(AuditError::verification(id, "prompt text differs after update").into());
    }
    if stored.inputs != *inputs {
        return Err(AuditError::verification(id, "inputs differ after update").into());
    }

    debug!(template_id = id, "Update verified");
    Ok(stored)
}
