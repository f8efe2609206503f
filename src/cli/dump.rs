//! Dump-sql subcommand for template-audit CLI
//!
//! Writes `UPDATE` statements to a file for manual review instead of touching
//! the database.

use super::FilterArgs;
use crate::sql_dump::SqlDialect;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the dump-sql subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct DumpArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output file path (default: output.sql_dump_path from config)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Dump every selected template's current content, not only fixes
    #[arg(long)]
    pub all: bool,

    /// SQL dialect (default: matches the configured backend)
    #[arg(long, value_enum)]
    pub dialect: Option<SqlDialect>,
}
