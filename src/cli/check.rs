//! Check subcommand for template-audit CLI
//!
//! Runs the consistency checker over every selected template and prints the
//! per-template report followed by the pass/fail tally.

use super::FilterArgs;
use crate::checker::MatchStrategy;
use crate::format::ReportFormat;
use clap::Args;

/// Arguments for the check subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format: text (default), json, or summary
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: ReportFormat,

    /// Only print templates that have at least one issue
    #[arg(long)]
    pub only_issues: bool,

    /// Exit with status 1 when any template is incorrect
    #[arg(long)]
    pub fail_on_issues: bool,

    /// Field/placeholder matching (overrides config)
    #[arg(long = "match", value_enum, value_name = "STRATEGY")]
    pub match_strategy: Option<MatchStrategy>,
}
