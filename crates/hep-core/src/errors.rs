//! Structured error types shared across hepsim crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable payload carried by every [`HepError`].
///
/// `code` is a stable kebab-case identifier; `context` names the offending
/// species, distribution, path or value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable identifier, e.g. `registry-full`.
    pub code: String,
    /// One-line description.
    pub message: String,
    /// Offending names and values.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested remedy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload without context or hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records one context entry, replacing an earlier value for `key`.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remedy.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the simulator.
///
/// Setup failures (`InvalidDescriptor`, `CapacityExceeded`, `TypeNotFound`,
/// `KinematicallyForbidden`, `Config`) stop a run. Validation failures
/// (`ValidationMismatch`, `FitDegenerate`) are collected into reports instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum HepError {
    /// A particle descriptor failed domain validation.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(ErrorInfo),
    /// The particle registry is full.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(ErrorInfo),
    /// A lookup by name or index did not resolve.
    #[error("type not found: {0}")]
    TypeNotFound(ErrorInfo),
    /// A decay or boost is not physically possible with the given inputs.
    #[error("kinematically forbidden: {0}")]
    KinematicallyForbidden(ErrorInfo),
    /// An observed quantity fell outside its tolerance band.
    #[error("validation mismatch: {0}")]
    ValidationMismatch(ErrorInfo),
    /// A requested fit could not be resolved.
    #[error("degenerate fit: {0}")]
    FitDegenerate(ErrorInfo),
    /// Configuration or distribution layout errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization, persistence and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// An operation was invoked out of order on a stateful component.
    #[error("invalid state: {0}")]
    InvalidState(ErrorInfo),
}

impl Display for ErrorInfo {
    /// Renders as `[code] message {key=value, ...} (hint: ...)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " {{{key}={value}")?;
            for (key, value) in entries {
                write!(f, ", {key}={value}")?;
            }
            f.write_str("}")?;
        }
        match &self.hint {
            Some(hint) => write!(f, " (hint: {hint})"),
            None => Ok(()),
        }
    }
}

impl HepError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            HepError::InvalidDescriptor(info)
            | HepError::CapacityExceeded(info)
            | HepError::TypeNotFound(info)
            | HepError::KinematicallyForbidden(info)
            | HepError::ValidationMismatch(info)
            | HepError::FitDegenerate(info)
            | HepError::Config(info)
            | HepError::Serde(info)
            | HepError::InvalidState(info) => info,
        }
    }

    /// Whether the error must abort the surrounding run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            HepError::ValidationMismatch(_) | HepError::FitDegenerate(_)
        )
    }
}
