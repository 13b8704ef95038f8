use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::clock::{Clock, SystemClock};
use super::delivery::{DeliveryError, DeliveryPipeline, DeliveryReport, DeliverySettings};
use super::domain::{ChecklistSubmission, SubmissionId, SubmissionRecord};
use super::mail::ChecklistMailer;
use super::render::{ChecklistRenderer, RenderError};
use super::store::{StoreError, SubmissionStore};
use super::validation::{self, SubmissionRejected};

/// Service composing the submission store, renderer, and delivery pipeline.
pub struct ChecklistService<S, M> {
    store: Arc<S>,
    renderer: ChecklistRenderer,
    pipeline: DeliveryPipeline<M>,
    clock: Arc<dyn Clock>,
    sequence: AtomicU64,
}

impl<S, M> ChecklistService<S, M>
where
    S: SubmissionStore + 'static,
    M: ChecklistMailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, settings: DeliverySettings) -> Self {
        Self {
            store,
            renderer: ChecklistRenderer,
            pipeline: DeliveryPipeline::new(settings, mailer),
            clock: Arc::new(SystemClock),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &DeliverySettings {
        self.pipeline.settings()
    }

    fn next_submission_id(&self) -> SubmissionId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        SubmissionId(format!("sub-{id:06}"))
    }

    /// Validate and store a submission, replacing whatever was held before.
    pub fn submit(
        &self,
        submission: ChecklistSubmission,
    ) -> Result<SubmissionRecord, ChecklistServiceError> {
        if let Err(rejected) = validation::validate(&submission) {
            warn!(error = %rejected, "checklist submission rejected");
            return Err(rejected.into());
        }

        let record = SubmissionRecord {
            submission_id: self.next_submission_id(),
            received_at: self.clock.now(),
            submission,
        };
        self.store.replace(record.clone())?;
        info!(
            submission = %record.submission_id,
            property = record.property_label(),
            "checklist submission stored"
        );
        Ok(record)
    }

    /// The submission the next download will render.
    pub fn current(&self) -> Result<SubmissionRecord, ChecklistServiceError> {
        self.store
            .latest()?
            .ok_or(ChecklistServiceError::NoSubmission)
    }

    /// Render the current submission, save it, and queue its email.
    pub async fn download(&self) -> Result<DeliveryReport, ChecklistServiceError> {
        let record = self.current()?;
        let generated_at = self.clock.now();
        let document = self.renderer.render(&record.submission, generated_at)?;
        let report = self
            .pipeline
            .deliver(&record, document, generated_at)
            .await?;
        Ok(report)
    }
}

/// Error raised by the checklist service.
#[derive(Debug, thiserror::Error)]
pub enum ChecklistServiceError {
    #[error(transparent)]
    Rejected(#[from] SubmissionRejected),
    #[error("No form submission found. Please submit the form first.")]
    NoSubmission,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
