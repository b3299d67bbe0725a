//! Error taxonomy for the document engine.
//!
//! Guard and authorization failures are recoverable and typed so a caller
//! can map them to field-level or status-level feedback. Invariant
//! violations are programming errors and must not be caught and retried.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::DocumentStatus;

/// One field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collection of field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection holding a single field error.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(())` when no error was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Guard failure on a transition or malformed document data.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The requested status cannot be reached from the current one.
    #[error("cannot move document from '{from}' to '{requested}' (allowed: {allowed:?})")]
    IllegalTransition {
        from: DocumentStatus,
        requested: DocumentStatus,
        allowed: Vec<DocumentStatus>,
    },

    /// The requested status name is not a known state.
    #[error("unknown document status '{requested}' (known: draft, wait, valid, invalid)")]
    UnknownStatus { requested: String },

    /// The acting user lacks the capability required by the transition.
    #[error("actor {actor} lacks capability '{action}'")]
    Forbidden { actor: Uuid, action: String },

    /// No document stored under the given identifier.
    #[error("document {0} not found")]
    NotFound(Uuid),

    /// Programming error: broken precondition that upstream code must
    /// prevent. Abort loudly, never retry.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Failure propagated from a storage collaborator.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<ValidationErrors> for EngineError {
    fn from(errors: ValidationErrors) -> Self {
        EngineError::Validation(errors)
    }
}
