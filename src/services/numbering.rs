//! Sequential document numbering.
//!
//! Indices are assigned exactly once at creation and never reused, even
//! when the document is later deleted: gaps are acceptable, duplicates are
//! not. Under concurrent creations within one scope the store must
//! serialize increments (a storage-backed implementation typically relies
//! on a unique constraint plus retry, or a serialized counter row).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::DocumentKind;

/// Monotonic per-scope sequence counters.
pub trait SequenceStore: Send + Sync {
    /// Next company-scoped index, strictly increasing per company.
    fn next_company_index(&self, company_id: Uuid) -> Result<i32, EngineError>;

    /// Next project-scoped index, strictly increasing per project.
    fn next_project_index(&self, project_id: Uuid) -> Result<i32, EngineError>;
}

/// In-memory sequence store for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemorySequences {
    company: Mutex<HashMap<Uuid, i32>>,
    project: Mutex<HashMap<Uuid, i32>>,
}

impl InMemorySequences {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(counters: &Mutex<HashMap<Uuid, i32>>, scope: Uuid) -> Result<i32, EngineError> {
        let mut counters = counters
            .lock()
            .map_err(|_| EngineError::Invariant("sequence store lock poisoned".to_string()))?;
        let counter = counters.entry(scope).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

impl SequenceStore for InMemorySequences {
    fn next_company_index(&self, company_id: Uuid) -> Result<i32, EngineError> {
        Self::next(&self.company, company_id)
    }

    fn next_project_index(&self, project_id: Uuid) -> Result<i32, EngineError> {
        Self::next(&self.project, project_id)
    }
}

/// Build the human-readable internal identifier for a new document.
///
/// Deterministic and side-effect free: the result is stored on the document
/// at creation and never recomputed, so later changes to a customer or
/// company code leave existing identifiers untouched.
pub fn build_internal_number(
    kind: DocumentKind,
    company_code: &str,
    customer_code: &str,
    project_index: i32,
    date: NaiveDate,
) -> String {
    format!(
        "{}_{}_{}{}_{}",
        company_code,
        customer_code,
        kind.number_tag(),
        project_index,
        date.format("%m%y"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_strictly_increasing_per_scope() {
        let sequences = InMemorySequences::new();
        let company_a = Uuid::new_v4();
        let company_b = Uuid::new_v4();

        assert_eq!(sequences.next_company_index(company_a).unwrap(), 1);
        assert_eq!(sequences.next_company_index(company_a).unwrap(), 2);
        // Scopes do not share counters.
        assert_eq!(sequences.next_company_index(company_b).unwrap(), 1);
        assert_eq!(sequences.next_company_index(company_a).unwrap(), 3);
    }

    #[test]
    fn test_internal_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let number =
            build_internal_number(DocumentKind::Invoice, "ACME", "CUST01", 12, date);
        assert_eq!(number, "ACME_CUST01_I12_0326");
    }

    #[test]
    fn test_internal_number_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        let first = build_internal_number(DocumentKind::Estimation, "CO", "CU", 4, date);
        let second = build_internal_number(DocumentKind::Estimation, "CO", "CU", 4, date);
        assert_eq!(first, second);
    }
}
