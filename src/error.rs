//! Structured error types for audit operations.
//!
//! Storage and driver code propagates `anyhow::Error`; the variants here are the
//! domain conditions callers may want to match on (for example to pick an exit
//! status or to tell "not found" apart from a broken connection).

use thiserror::Error;

/// Domain errors raised by the audit drivers and configuration layer.
#[derive(Debug, Error)]
pub enum AuditError {
    /// No template matched the requested name or id.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A hardcoded-number rule failed to compile.
    #[error("Invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    /// A table name that cannot be interpolated into SQL safely.
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Configuration could not be loaded or merged.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A replacement file was unreadable or malformed.
    #[error("Replacement file error: {0}")]
    Replacement(String),

    /// Re-reading a row after an update did not return what was written.
    #[error("Verification failed for template {id}: {detail}")]
    VerificationFailed { id: i64, detail: String },
}

impl AuditError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::TemplateNotFound(what.into())
    }

    pub fn invalid_rule(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidRule {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn replacement(msg: impl Into<String>) -> Self {
        Self::Replacement(msg.into())
    }

    pub fn verification(id: i64, detail: impl Into<String>) -> Self {
        Self::VerificationFailed {
            id,
            detail: detail.into(),
        }
    }

    /// Whether this error is the expected "nothing matched" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound(_))
    }
}

/// Result type for audit operations that only fail with domain errors.
pub type AuditResult<T> = std::result::Result<T, AuditError>;
