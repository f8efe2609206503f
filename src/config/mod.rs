//! Configuration system.
//!
//! Configuration is an explicit [`Config`] value built once in `main` and passed
//! down; nothing reads the environment after loading.
//!
//! ## Tiers (later wins, merged field by field)
//! 1. **Defaults** - literal values in [`types`]
//! 2. **Project** - `./template-audit.yaml`
//! 3. **User** - `~/.template-audit/config.yaml`
//! 4. **Environment** - see below
//!
//! `--config <file>` replaces tiers 2 and 3.
//!
//! ## Environment Variables
//! - `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_SSL`
//! - `TEMPLATE_AUDIT_BACKEND` - `postgres` or `sqlite`
//! - `TEMPLATE_AUDIT_SQLITE_PATH` - SQLite mirror file
//! - `TEMPLATE_AUDIT_MATCH_STRATEGY` - `substring` or `exact`
//! - `TEMPLATE_AUDIT_RULES_FILE` - extra hardcoded-number rules

mod loader;
mod merge;
mod types;

pub use loader::{
    ConfigLoader, ConfigPaths, ConfigTier, EnvSource, PROJECT_CONFIG_FILE, ProcessEnv,
    apply_env_overrides,
};
pub use merge::{merge_into, merge_tiers};
pub use types::*;
