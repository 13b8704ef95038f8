use std::sync::{Arc, Mutex};

use super::domain::SubmissionRecord;

/// Storage abstraction holding the submission the next download renders.
pub trait SubmissionStore: Send + Sync {
    /// Replace the held submission wholesale.
    fn replace(&self, record: SubmissionRecord) -> Result<(), StoreError>;
    fn latest(&self) -> Result<Option<SubmissionRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("submission store unavailable: {0}")]
    Unavailable(String),
}

/// Single-slot store: the most recent submission wins.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubmissionStore {
    slot: Arc<Mutex<Option<SubmissionRecord>>>,
}

impl SubmissionStore for InMemorySubmissionStore {
    fn replace(&self, record: SubmissionRecord) -> Result<(), StoreError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("submission mutex poisoned".to_string()))?;
        *guard = Some(record);
        Ok(())
    }

    fn latest(&self) -> Result<Option<SubmissionRecord>, StoreError> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("submission mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}
