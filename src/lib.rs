//! Template Audit Library
//!
//! Checks prompt templates for placeholder / input-field consistency and
//! repairs what the checks find. This module exports the core components for
//! testing and integration.

pub mod checker;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod fix;
pub mod format;
pub mod logging;
pub mod replacement;
pub mod sql_dump;
pub mod types;
