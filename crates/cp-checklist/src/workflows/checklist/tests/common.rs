use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;

use crate::workflows::checklist::{
    ChecklistMailer, ChecklistService, ChecklistSubmission, DeliverySettings, FilenameStyle,
    FixedClock, InMemorySubmissionStore, MailError, MailMessage, MailReceipt,
    PropertyRecipientMap, StoreError, SubmissionRecord, SubmissionStore,
};

pub(super) fn fixed_now() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 10, 16, 9, 15, 0)
        .single()
        .expect("unambiguous local time")
}

pub(super) fn submission() -> ChecklistSubmission {
    ChecklistSubmission {
        business_name: Some("Acme Co".to_string()),
        property_address: Some("123 Main St".to_string()),
        fire_safety_measures: Some("sprinklers".to_string()),
        security_systems: Some("cameras".to_string()),
        maintenance_schedule: Some("monthly".to_string()),
        selected_property: Some("San Clemente".to_string()),
        ..ChecklistSubmission::default()
    }
}

pub(super) fn settings(output_dir: &Path) -> DeliverySettings {
    DeliverySettings {
        output_dir: output_dir.to_path_buf(),
        filename_style: FilenameStyle::EpochMillis,
        recipients: PropertyRecipientMap::standard(),
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingMailer {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().expect("mail mutex poisoned").clone()
    }
}

#[async_trait]
impl ChecklistMailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError> {
        let recipient = message.to.clone();
        self.sent.lock().expect("mail mutex poisoned").push(message);
        Ok(MailReceipt {
            recipient,
            response: "250".to_string(),
        })
    }
}

pub(super) struct FailingMailer;

#[async_trait]
impl ChecklistMailer for FailingMailer {
    async fn send(&self, _message: MailMessage) -> Result<MailReceipt, MailError> {
        Err(MailError::Transport("relay refused connection".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl SubmissionStore for UnavailableStore {
    fn replace(&self, _record: SubmissionRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn latest(&self) -> Result<Option<SubmissionRecord>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

pub(super) struct PanickingStore;

impl SubmissionStore for PanickingStore {
    fn replace(&self, _record: SubmissionRecord) -> Result<(), StoreError> {
        panic!("store slot corrupted");
    }

    fn latest(&self) -> Result<Option<SubmissionRecord>, StoreError> {
        panic!("store slot corrupted");
    }
}

pub(super) type TestService = ChecklistService<InMemorySubmissionStore, RecordingMailer>;

pub(super) fn build_service(
    output_dir: &Path,
) -> (Arc<TestService>, InMemorySubmissionStore, RecordingMailer) {
    let store = InMemorySubmissionStore::default();
    let mailer = RecordingMailer::default();
    let service = ChecklistService::new(
        Arc::new(store.clone()),
        Arc::new(mailer.clone()),
        settings(output_dir),
    )
    .with_clock(Arc::new(FixedClock(fixed_now())));
    (Arc::new(service), store, mailer)
}

pub(super) fn pdf_files(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "pdf"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let payload = serde_json::from_slice(&bytes).expect("json body");
    (status, payload)
}
