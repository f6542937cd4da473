//! Validate-then-append boundary in front of the [`RecordStore`].

use std::sync::Arc;

use sensor_core::error::ValidationError;
use sensor_core::models::{CandidateRecord, SensorRecord};
use sensor_core::validation::RecordValidator;

use crate::store::{AppendReport, RecordStore};

/// Read and upload operations exposed to the transport layer.
///
/// Cheap to clone; clones share the same store.
#[derive(Debug, Clone)]
pub struct IngestService {
    store: Arc<RecordStore>,
    validator: Arc<RecordValidator>,
}

impl IngestService {
    pub fn new(store: Arc<RecordStore>, validator: RecordValidator) -> Self {
        Self {
            store,
            validator: Arc::new(validator),
        }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Every stored record, in insertion order.
    pub fn records(&self) -> Vec<SensorRecord> {
        self.store.get_all()
    }

    /// Validate the whole batch, then append it.
    ///
    /// A single invalid record rejects the batch and the store is untouched.
    pub fn upload(&self, candidates: &[CandidateRecord]) -> Result<AppendReport, ValidationError> {
        let records = self.validator.validate_batch(candidates).map_err(|err| {
            tracing::warn!(
                rejected = err.violations.len(),
                batch = candidates.len(),
                "upload rejected"
            );
            err
        })?;
        Ok(self.store.append(records))
    }
}
