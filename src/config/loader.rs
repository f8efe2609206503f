//! Configuration loader with tier-based merging.
//!
//! Tiers, lowest priority first: built-in defaults, project file, user file,
//! environment. An explicit `--config` file replaces the two file tiers.

use super::merge::merge_tiers;
use super::types::{Backend, Config};
use crate::error::AuditError;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project-level config file, relative to the working directory.
pub const PROJECT_CONFIG_FILE: &str = "template-audit.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where the file tiers live.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit file from `--config`; when set, project and user files are skipped.
    pub explicit: Option<PathBuf>,
    pub project_file: Option<PathBuf>,
    pub user_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// `./template-audit.yaml` and `~/.template-audit/config.yaml`.
    pub fn discover() -> Self {
        Self {
            explicit: None,
            project_file: Some(PathBuf::from(PROJECT_CONFIG_FILE)),
            user_file: dirs::home_dir().map(|h| h.join(".template-audit").join("config.yaml")),
        }
    }

    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }
}

/// Source of environment values. Production reads the process environment;
/// tests pass a closure over a fixed map.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Loaded configuration plus a record of which files contributed.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load from the discovered paths and the process environment.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self> {
        Self::load_with(ConfigPaths::discover().with_explicit(explicit), &ProcessEnv)
    }

    pub fn load_with(paths: ConfigPaths, env: &dyn EnvSource) -> Result<Self> {
        let mut tiers: Vec<Value> = vec![
            serde_json::to_value(Config::default()).context("Failed to encode defaults")?,
        ];
        let mut sources = Vec::new();

        if let Some(ref explicit) = paths.explicit {
            // An explicit file must exist and parse.
            tiers.push(read_tier(explicit)?.ok_or_else(|| {
                AuditError::config(format!("Config file not found: {}", explicit.display()))
            })?);
            sources.push((ConfigTier::Project, explicit.clone()));
        } else {
            for (tier, file) in [
                (ConfigTier::Project, &paths.project_file),
                (ConfigTier::User, &paths.user_file),
            ] {
                let Some(file) = file else { continue };
                match read_tier(file) {
                    Ok(Some(value)) => {
                        debug!(tier = %tier, path = %file.display(), "Loaded config tier");
                        tiers.push(value);
                        sources.push((tier, file.clone()));
                    }
                    Ok(None) => {}
                    Err(e) => warn!(path = %file.display(), error = %e, "Ignoring unreadable config file"),
                }
            }
        }

        let merged = merge_tiers(tiers);
        let mut config: Config = serde_json::from_value(merged)
            .map_err(|e| AuditError::config(format!("Invalid configuration: {}", e)))?;

        apply_env_overrides(&mut config, env)?;

        Ok(Self { config, sources })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Files that contributed, in merge order.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }
}

/// Read one YAML tier. `Ok(None)` when the file does not exist.
fn read_tier(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(Some(value))
}

/// Apply environment overrides (highest tier).
pub fn apply_env_overrides(config: &mut Config, env: &dyn EnvSource) -> Result<()> {
    let db = &mut config.database;

    if let Some(host) = env.get("DB_HOST") {
        db.host = host;
    }
    if let Some(port) = env.get("DB_PORT") {
        db.port = port
            .parse()
            .map_err(|_| AuditError::config(format!("DB_PORT is not a port number: {}", port)))?;
    }
    if let Some(name) = env.get("DB_NAME") {
        db.name = name;
    }
    if let Some(user) = env.get("DB_USER") {
        db.user = user;
    }
    if let Some(password) = env.get("DB_PASSWORD") {
        db.password = password;
    }
    if let Some(ssl) = env.get("DB_SSL") {
        db.ssl = parse_flag(&ssl);
    }
    if let Some(backend) = env.get("TEMPLATE_AUDIT_BACKEND") {
        db.backend = backend.parse::<Backend>().map_err(AuditError::config)?;
    }
    if let Some(path) = env.get("TEMPLATE_AUDIT_SQLITE_PATH") {
        db.sqlite_path = PathBuf::from(path);
    }
    if let Some(strategy) = env.get("TEMPLATE_AUDIT_MATCH_STRATEGY") {
        config.checker.match_strategy = strategy.parse().map_err(AuditError::config)?;
    }
    if let Some(rules) = env.get("TEMPLATE_AUDIT_RULES_FILE") {
        config.checker.rules_file = Some(PathBuf::from(rules));
    }

    Ok(())
}

/// Truthy values for boolean environment flags.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "require" | "required"
    )
}
