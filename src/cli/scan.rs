//! Scan subcommand for template-audit CLI

use super::FilterArgs;
use clap::Args;

/// Arguments for the scan subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print findings as JSON
    #[arg(long)]
    pub json: bool,
}
