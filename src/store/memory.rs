use std::sync::RwLock;

use crate::errors::StoreError;
use crate::store::{DurableStore, Tables};

/// process-local store; committed state lives behind a lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryStore {
    fn load(&self) -> Result<Tables, StoreError> {
        self.tables
            .read()
            .map(|t| t.clone())
            .map_err(|_| StoreError::Unavailable {
                message: "memory store lock poisoned".to_string(),
            })
    }

    fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        let mut guard = self.tables.write().map_err(|_| StoreError::Unavailable {
            message: "memory store lock poisoned".to_string(),
        })?;
        *guard = tables.clone();
        Ok(())
    }
}
