//! In-memory document registry.
//!
//! Documents live until deleted or until the process exits. Each document
//! sits behind its own mutex, so chat appends to one document are serialized
//! while other documents stay available.

use glean_domain::{Document, DocumentId, DocumentRegistry, DocumentSummary, QaEntry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

/// Registry error
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A lock was poisoned by a panicking writer
    #[error("Registry lock poisoned: {0}")]
    Poisoned(String),
}

type Entry = Arc<Mutex<Document>>;

/// Document registry backed by a `HashMap`
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    documents: Arc<RwLock<HashMap<DocumentId, Entry>>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered documents
    pub fn len(&self) -> Result<usize, RegistryError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.len())
    }

    /// True when no documents are registered
    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.len()? == 0)
    }

    fn entry(&self, id: &DocumentId) -> Result<Option<Entry>, RegistryError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.get(id).cloned())
    }
}

impl DocumentRegistry for InMemoryRegistry {
    type Error = RegistryError;

    fn insert(&self, document: Document) -> Result<(), Self::Error> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        documents.insert(document.id().clone(), Arc::new(Mutex::new(document)));
        Ok(())
    }

    fn get(&self, id: &DocumentId) -> Result<Option<Document>, Self::Error> {
        match self.entry(id)? {
            Some(entry) => {
                let document = entry.lock().map_err(poisoned)?;
                Ok(Some(document.clone()))
            }
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<DocumentSummary>, Self::Error> {
        let entries: Vec<Entry> = {
            let documents = self.documents.read().map_err(poisoned)?;
            documents.values().cloned().collect()
        };

        let mut summaries = Vec::with_capacity(entries.len());
        for entry in entries {
            summaries.push(entry.lock().map_err(poisoned)?.summary());
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    fn remove(&self, id: &DocumentId) -> Result<bool, Self::Error> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        Ok(documents.remove(id).is_some())
    }

    fn append_chat(&self, id: &DocumentId, entry: QaEntry) -> Result<bool, Self::Error> {
        match self.entry(id)? {
            Some(document) => {
                document.lock().map_err(poisoned)?.append_chat(entry);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn chat_history(&self, id: &DocumentId) -> Result<Option<Vec<QaEntry>>, Self::Error> {
        match self.entry(id)? {
            Some(document) => {
                let document = document.lock().map_err(poisoned)?;
                Ok(Some(document.chat_log().to_vec()))
            }
            None => Ok(None),
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> RegistryError {
    RegistryError::Poisoned(e.to_string())
}
