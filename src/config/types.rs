//! Configuration types.

use crate::checker::{MatchStrategy, RuleSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Top-level configuration passed explicitly into every command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub checker: CheckerConfig,
    pub output: OutputConfig,
}

/// Storage backend selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Production PostgreSQL database
    #[default]
    Postgres,
    /// Local SQLite mirror
    Sqlite,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Sqlite => "sqlite",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Backend::Postgres),
            "sqlite" => Ok(Backend::Sqlite),
            _ => Err(format!(
                "Invalid backend '{}'. Valid options: postgres, sqlite",
                s
            )),
        }
    }
}

/// Connection settings. Every field has a literal default.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Require TLS for the PostgreSQL connection.
    pub ssl: bool,
    /// SQLite mirror file, used when `backend: sqlite`.
    pub sqlite_path: PathBuf,
    /// Table whose id sequence `repair-sequence` checks.
    pub sequence_table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Postgres,
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            ssl: false,
            sqlite_path: PathBuf::from("templates.db"),
            sequence_table: "saved_prompts".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Human-readable target, without credentials.
    pub fn describe(&self) -> String {
        match self.backend {
            Backend::Postgres => format!(
                "postgres://{}@{}:{}/{}{}",
                self.user,
                self.host,
                self.port,
                self.name,
                if self.ssl { " (tls)" } else { "" }
            ),
            Backend::Sqlite => format!("sqlite://{}", self.sqlite_path.display()),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl", &self.ssl)
            .field("sqlite_path", &self.sqlite_path)
            .field("sequence_table", &self.sequence_table)
            .finish()
    }
}

/// Consistency checker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub match_strategy: MatchStrategy,
    /// Include the built-in hardcoded-number rules.
    pub builtin_rules: bool,
    /// Extra YAML rules file.
    pub rules_file: Option<PathBuf>,
    /// Extra inline rules.
    pub rules: Vec<RuleSpec>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            match_strategy: MatchStrategy::Substring,
            builtin_rules: true,
            rules_file: None,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default destination for `dump-sql`.
    pub sql_dump_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sql_dump_path: PathBuf::from("template_updates.sql"),
        }
    }
}
