//! Fix subcommand for template-audit CLI
//!
//! Rewrites hardcoded counts into placeholders and appends the matching
//! `number` input fields. Every write is read back and verified.

use super::FilterArgs;
use clap::Args;

/// Arguments for the fix subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct FixArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print the planned changes without writing them
    #[arg(long)]
    pub dry_run: bool,
}
