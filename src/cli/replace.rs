//! Replace subcommand for template-audit CLI
//!
//! Overwrites a template's prompt text and input list with a hand-written
//! replacement file (YAML, or JSON when the extension is `.json`).

use clap::Args;
use std::path::PathBuf;

/// Arguments for the replace subcommand
#[derive(Args, Debug, Clone)]
pub struct ReplaceArgs {
    /// Replacement file with `name`, `prompt_template` and `inputs`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only overwrite this template id instead of every template with the name
    #[arg(long, value_name = "ID")]
    pub id: Option<i64>,

    /// Print the resulting report without writing
    #[arg(long)]
    pub dry_run: bool,
}
