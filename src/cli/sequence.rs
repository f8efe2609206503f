//! Repair-sequence subcommand for template-audit CLI

use clap::Args;

/// Arguments for the repair-sequence subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct SequenceArgs {
    /// Table whose id sequence is checked (default: database.sequence_table)
    #[arg(long, value_name = "TABLE")]
    pub table: Option<String>,

    /// Report the sequence state without changing it
    #[arg(long)]
    pub dry_run: bool,
}
