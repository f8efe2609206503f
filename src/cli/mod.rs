//! CLI command definitions for template-audit
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod check;
pub mod dump;
pub mod fix;
pub mod replace;
pub mod scan;
pub mod sequence;
pub mod show;

use crate::config::Backend;
use crate::types::TemplateFilter;
use check::CheckArgs;
use clap::{Args, Parser, Subcommand};
use dump::DumpArgs;
use fix::FixArgs;
use replace::ReplaceArgs;
use scan::ScanArgs;
use sequence::SequenceArgs;
use show::ShowArgs;
use std::path::PathBuf;

/// Audit prompt templates for placeholder / input-field consistency
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (replaces project and user config files)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Storage backend (overrides config)
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<Backend>,

    /// Path to SQLite mirror file (overrides config, implies --backend sqlite)
    #[arg(long, global = true, value_name = "FILE")]
    pub sqlite: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify every number input field has its placeholder and print the tally
    Check(CheckArgs),

    /// List templates whose text contains hardcoded counts
    Scan(ScanArgs),

    /// Print one template with its consistency report
    Show(ShowArgs),

    /// Replace hardcoded counts with placeholders and add missing number fields
    Fix(FixArgs),

    /// Overwrite a template with the contents of a replacement file
    Replace(ReplaceArgs),

    /// Move an id sequence past the table's highest id
    RepairSequence(SequenceArgs),

    /// Write the pending fixes as a reviewable SQL file
    DumpSql(DumpArgs),
}

/// Row selection shared by the commands that walk many templates.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only templates with this exact name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Only templates in this category
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Only templates in this subcategory
    #[arg(long, value_name = "SUBCATEGORY")]
    pub subcategory: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> TemplateFilter {
        TemplateFilter {
            name: self.name.clone(),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_options_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "template-audit",
            "check",
            "--sqlite",
            "mirror.db",
            "-v",
            "--log",
            "off",
        ])
        .unwrap();
        assert_eq!(cli.sqlite, Some(PathBuf::from("mirror.db")));
        assert!(cli.verbose);
        assert_eq!(cli.log, "off");
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn backend_and_config() {
        let cli = Cli::try_parse_from([
            "template-audit",
            "--backend",
            "sqlite",
            "--config",
            "audit.yaml",
            "repair-sequence",
        ])
        .unwrap();
        assert_eq!(cli.backend, Some(Backend::Sqlite));
        assert_eq!(cli.config, Some(PathBuf::from("audit.yaml")));
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["template-audit"]).is_err());
    }

    #[test]
    fn filter_args_become_template_filter() {
        let args = FilterArgs {
            category: Some("social".into()),
            ..Default::default()
        };
        let filter = args.to_filter();
        assert_eq!(filter.category.as_deref(), Some("social"));
        assert!(filter.name.is_none());
    }
}
