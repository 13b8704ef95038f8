use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::AppConfig;

use super::domain::{SubmissionId, SubmissionRecord};
use super::mail::{ChecklistMailer, MailError, MailMessage, MailReceipt};
use super::recipients::PropertyRecipientMap;
use super::render::RenderedDocument;

/// How saved checklist files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameStyle {
    /// `checklist-<epoch millis>.pdf`
    #[default]
    EpochMillis,
    /// `checklist-<YYYYMMDD-HHMMSS>.pdf`
    Timestamp,
}

impl FilenameStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "millis" | "epoch" | "epoch_millis" => Some(Self::EpochMillis),
            "timestamp" | "datetime" => Some(Self::Timestamp),
            _ => None,
        }
    }

    pub fn file_name(self, at: DateTime<Local>) -> String {
        self.numbered_file_name(at, 0)
    }

    /// Name for the `attempt`-th try; retries append `-<attempt>` to the stem.
    pub fn numbered_file_name(self, at: DateTime<Local>, attempt: u32) -> String {
        let stem = match self {
            Self::EpochMillis => at.timestamp_millis().to_string(),
            Self::Timestamp => at.format("%Y%m%d-%H%M%S").to_string(),
        };
        if attempt == 0 {
            format!("checklist-{stem}.pdf")
        } else {
            format!("checklist-{stem}-{attempt}.pdf")
        }
    }
}

/// Settings the pipeline needs beyond the mail transport.
#[derive(Debug, Clone)]
pub struct DeliverySettings {
    pub output_dir: PathBuf,
    pub filename_style: FilenameStyle,
    pub recipients: PropertyRecipientMap,
}

impl DeliverySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            output_dir: config.storage.output_dir.clone(),
            filename_style: config.storage.filename_style,
            recipients: config.recipients.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("unable to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to write checklist file {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of a download: the saved file plus the pending email job.
#[derive(Debug)]
pub struct DeliveryReport {
    pub submission_id: SubmissionId,
    pub file_name: String,
    pub path: PathBuf,
    pub recipient: String,
    pub document: RenderedDocument,
    /// Email send running in the background; awaiting it is optional.
    pub mail: JoinHandle<Result<MailReceipt, MailError>>,
}

impl DeliveryReport {
    /// Wait for the email job, folding a panicked or cancelled task into `MailError`.
    pub async fn mail_outcome(self) -> Result<MailReceipt, MailError> {
        match self.mail.await {
            Ok(outcome) => outcome,
            Err(err) => Err(MailError::Aborted(err.to_string())),
        }
    }
}

/// Saves rendered checklists and hands them to the mail transport.
pub struct DeliveryPipeline<M> {
    settings: DeliverySettings,
    mailer: Arc<M>,
}

impl<M> DeliveryPipeline<M>
where
    M: ChecklistMailer + 'static,
{
    pub fn new(settings: DeliverySettings, mailer: Arc<M>) -> Self {
        Self { settings, mailer }
    }

    pub fn settings(&self) -> &DeliverySettings {
        &self.settings
    }

    /// Persist the document, then spawn the email send once the file is complete.
    pub async fn deliver(
        &self,
        record: &SubmissionRecord,
        document: RenderedDocument,
        generated_at: DateTime<Local>,
    ) -> Result<DeliveryReport, DeliveryError> {
        let output_dir = &self.settings.output_dir;
        fs::create_dir_all(output_dir)
            .await
            .map_err(|source| DeliveryError::CreateDir {
                path: output_dir.clone(),
                source,
            })?;

        let (file_name, path) = self.save(&document.bytes, generated_at).await?;
        info!(path = %path.display(), submission = %record.submission_id, "checklist PDF saved");

        let property = record.submission.selected_property();
        let recipient = self.settings.recipients.resolve(property).to_string();
        info!(
            property = property.unwrap_or("unspecified"),
            %recipient,
            "checklist email queued"
        );

        let message = MailMessage::for_checklist(
            recipient.clone(),
            property,
            record.received_at,
            file_name.clone(),
            document.bytes.clone(),
        );
        let mail = spawn_mail_job(self.mailer.clone(), message);

        Ok(DeliveryReport {
            submission_id: record.submission_id.clone(),
            file_name,
            path,
            recipient,
            document,
            mail,
        })
    }
}

impl<M> DeliveryPipeline<M> {
    /// Write to the first free name for `generated_at`, never replacing an earlier file.
    async fn save(
        &self,
        bytes: &[u8],
        generated_at: DateTime<Local>,
    ) -> Result<(String, PathBuf), DeliveryError> {
        let mut attempt = 0;
        loop {
            let file_name = self
                .settings
                .filename_style
                .numbered_file_name(generated_at, attempt);
            let path = self.settings.output_dir.join(&file_name);
            match write_new_file(&path, bytes).await {
                Ok(()) => return Ok((file_name, path)),
                Err(err)
                    if err.kind() == ErrorKind::AlreadyExists
                        && attempt + 1 < MAX_NAME_ATTEMPTS =>
                {
                    attempt += 1;
                }
                Err(source) => return Err(DeliveryError::WriteFile { path, source }),
            }
        }
    }
}

const MAX_NAME_ATTEMPTS: u32 = 100;

async fn write_new_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

fn spawn_mail_job<M>(
    mailer: Arc<M>,
    message: MailMessage,
) -> JoinHandle<Result<MailReceipt, MailError>>
where
    M: ChecklistMailer + 'static,
{
    tokio::spawn(async move {
        let recipient = message.to.clone();
        let outcome = mailer.send(message).await;
        match &outcome {
            Ok(receipt) => info!(
                recipient = %receipt.recipient,
                response = %receipt.response,
                "checklist email sent"
            ),
            Err(err) => error!(%recipient, error = %err, "checklist email failed"),
        }
        outcome
    })
}
