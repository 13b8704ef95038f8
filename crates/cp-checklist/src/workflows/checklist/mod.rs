//! Inspection checklist intake and delivery.
//!
//! A submission is validated and held in a [`SubmissionStore`]; a download renders
//! the held submission to PDF, saves it under the configured output directory,
//! returns it to the caller, and emails it to the address mapped for its property.

pub mod clock;
pub mod delivery;
pub mod domain;
pub mod mail;
pub mod recipients;
pub mod render;
pub mod router;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use delivery::{
    DeliveryError, DeliveryPipeline, DeliveryReport, DeliverySettings, FilenameStyle,
};
pub use domain::{
    ChecklistSubmission, ConditionCheck, RequiredField, RiskMitigationItem, SubmissionId,
    SubmissionRecord, PLACEHOLDER,
};
pub use mail::{
    ChecklistMailer, ConfiguredMailer, LoggingMailer, MailAttachment, MailError, MailMessage,
    MailReceipt, SmtpMailer,
};
pub use recipients::PropertyRecipientMap;
pub use render::{
    ChecklistDocument, ChecklistRenderer, DocumentSection, RenderError, RenderedDocument,
    SectionBody,
};
pub use router::{catch_panic_layer, checklist_router};
pub use service::{ChecklistService, ChecklistServiceError};
pub use store::{InMemorySubmissionStore, StoreError, SubmissionStore};
pub use validation::{validate, SubmissionRejected};
