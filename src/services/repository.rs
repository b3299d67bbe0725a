//! Aggregate load/save contract.
//!
//! Persistence is a collaborator, not a concern of the engine: the host
//! application supplies an implementation and owns transaction boundaries.
//! Cascade semantics come for free: the aggregate owns its children, so
//! saving or deleting a document carries groups, lines, discounts and
//! history with it.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::error::EngineError;
use crate::models::Document;

/// Document aggregate store keyed by document identifier.
pub trait DocumentRepository: Send + Sync {
    fn load(&self, document_id: Uuid) -> Result<Option<Document>, EngineError>;

    fn save(&self, document: &Document) -> Result<(), EngineError>;

    /// Remove the aggregate. Returns whether a document was stored.
    fn delete(&self, document_id: Uuid) -> Result<bool, EngineError>;
}

/// In-memory repository for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    documents: Mutex<HashMap<Uuid, Document>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentRepository for InMemoryRepository {
    fn load(&self, document_id: Uuid) -> Result<Option<Document>, EngineError> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| EngineError::Invariant("repository lock poisoned".to_string()))?;
        Ok(documents.get(&document_id).cloned())
    }

    fn save(&self, document: &Document) -> Result<(), EngineError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| EngineError::Invariant("repository lock poisoned".to_string()))?;
        documents.insert(document.document_id, document.clone());
        Ok(())
    }

    fn delete(&self, document_id: Uuid) -> Result<bool, EngineError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| EngineError::Invariant("repository lock poisoned".to_string()))?;
        Ok(documents.remove(&document_id).is_some())
    }
}
