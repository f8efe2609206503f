//! Show subcommand for template-audit CLI

use clap::Args;

/// Arguments for the show subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ShowArgs {
    /// Template id
    #[arg(long, value_name = "ID", required_unless_present = "name")]
    pub id: Option<i64>,

    /// Exact template name (every template with that name is shown)
    #[arg(long, value_name = "NAME", conflicts_with = "id")]
    pub name: Option<String>,
}
