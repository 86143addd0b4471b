//! In-memory enrollment store
//!
//! Backs tests and the ephemeral mode of the JSON request handler. Nothing
//! survives the process.

use crate::error::StoreError;
use crate::store::{Enrollment, EnrollmentStore};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Enrollment records held in a mutex-guarded map
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Enrollment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Enrollment>>, StoreError> {
        self.records.lock().map_err(|_| StoreError::Unavailable {
            message: "enrollment map lock poisoned".to_string(),
        })
    }
}

impl EnrollmentStore for MemoryStore {
    fn get(&self, principal_id: &str) -> Result<Option<Enrollment>, StoreError> {
        Ok(self.lock()?.get(principal_id).cloned())
    }

    fn upsert(&self, enrollment: Enrollment) -> Result<(), StoreError> {
        self.lock()?
            .insert(enrollment.principal_id.clone(), enrollment);
        Ok(())
    }
}
