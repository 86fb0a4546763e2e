use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use crate::error::StoreError;
use crate::pipeline::ProcessingRecord;

use super::{DocumentFilter, DocumentMeta, DocumentStore, StoredDocument};

struct Entry {
    seq: u64,
    document: StoredDocument,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    documents: HashMap<String, Entry>,
}

/// Process-local document store.
pub struct MemoryDocumentStore {
    max_file_size: u64,
    inner: RwLock<Inner>,
}

impl MemoryDocumentStore {
    pub fn new(max_file_size: u64) -> Self {
        Self {
            max_file_size,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("Document store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("Document store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn update<F>(&self, id: &str, f: F) -> Result<StoredDocument, StoreError>
    where
        F: FnOnce(&mut StoredDocument),
    {
        let mut inner = self.write();
        let entry = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        f(&mut entry.document);
        Ok(entry.document.clone())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn register(&self, meta: DocumentMeta) -> Result<StoredDocument, StoreError> {
        if meta.file_size > self.max_file_size {
            return Err(StoreError::TooLarge {
                id: meta.filename,
                size: meta.file_size,
                max: self.max_file_size,
            });
        }

        let id = uuid::Uuid::new_v4().to_string();
        let document = StoredDocument::register(id.clone(), meta);

        let mut inner = self.write();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.documents.insert(
            id.clone(),
            Entry {
                seq,
                document: document.clone(),
            },
        );
        debug!("Registered document {} ({})", id, document.filename);

        Ok(document)
    }

    fn mark_processing(&self, id: &str) -> Result<(), StoreError> {
        self.update(id, StoredDocument::mark_processing).map(|_| ())
    }

    fn apply_record(
        &self,
        id: &str,
        record: &ProcessingRecord,
    ) -> Result<StoredDocument, StoreError> {
        let document = self.update(id, |doc| doc.apply_record(record))?;
        debug!("Document {} is now {}", id, document.status);
        Ok(document)
    }

    fn get(&self, id: &str) -> Result<StoredDocument, StoreError> {
        self.read()
            .documents
            .get(id)
            .map(|entry| entry.document.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list(&self, filter: &DocumentFilter) -> Vec<StoredDocument> {
        let inner = self.read();
        let mut entries: Vec<&Entry> = inner
            .documents
            .values()
            .filter(|e| filter.status.map_or(true, |s| e.document.status == s))
            .collect();
        entries.sort_by_key(|e| e.seq);

        entries
            .into_iter()
            .skip(filter.skip)
            .take(filter.limit)
            .map(|e| e.document.clone())
            .collect()
    }

    fn delete(&self, id: &str) -> Result<StoredDocument, StoreError> {
        self.write()
            .documents
            .remove(id)
            .map(|entry| entry.document)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
