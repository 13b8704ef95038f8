use async_trait::async_trait;
use chrono::{DateTime, Local};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::info;

use crate::config::MailConfig;

/// Attachment carried by a checklist email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Outbound checklist email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: MailAttachment,
}

impl MailMessage {
    pub fn for_checklist(
        to: impl Into<String>,
        property: Option<&str>,
        submitted_at: DateTime<Local>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let property = property.unwrap_or("Unknown Property");
        Self {
            to: to.into(),
            subject: format!("Your Checklist PDF for {property}"),
            body: format!(
                "Hello! Attached is the PDF for {}, submitted {}.",
                property,
                submitted_at.format("%-m/%-d/%Y at %-I:%M:%S %p")
            ),
            attachment: MailAttachment {
                file_name: file_name.into(),
                content_type: mime::APPLICATION_PDF.to_string(),
                bytes,
            },
        }
    }
}

/// Acknowledgement from the mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    pub recipient: String,
    pub response: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid mail address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("unable to build message: {0}")]
    Message(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
    #[error("mail job did not complete: {0}")]
    Aborted(String),
}

/// Outbound mail hook used once a checklist PDF is saved.
#[async_trait]
pub trait ChecklistMailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError>;
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse::<Mailbox>().map_err(|err| MailError::Address {
        address: address.to_string(),
        reason: err.to_string(),
    })
}

/// SMTP relay transport authenticated with a service account.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)
            .map_err(|err| MailError::Transport(err.to_string()))?;
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_string(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from: parse_mailbox(&config.from)?,
        })
    }
}

/// Assemble the multipart message: plain-text body plus the PDF attachment.
fn compose(from: &Mailbox, message: MailMessage) -> Result<Message, MailError> {
    let to = parse_mailbox(&message.to)?;
    let content_type = ContentType::parse(&message.attachment.content_type)
        .map_err(|err| MailError::Message(format!("{err:?}")))?;
    let attachment =
        Attachment::new(message.attachment.file_name).body(message.attachment.bytes, content_type);

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(message.subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(message.body))
                .singlepart(attachment),
        )
        .map_err(|err| MailError::Message(err.to_string()))
}

#[async_trait]
impl ChecklistMailer for SmtpMailer {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError> {
        let recipient = message.to.clone();
        let email = compose(&self.from, message)?;
        let response = self
            .transport
            .send(email)
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;

        Ok(MailReceipt {
            recipient,
            response: response.code().to_string(),
        })
    }
}

/// Stand-in transport that only logs what would have been sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailer;

#[async_trait]
impl ChecklistMailer for LoggingMailer {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            attachment = %message.attachment.file_name,
            bytes = message.attachment.bytes.len(),
            "mail delivery disabled; message logged only"
        );
        Ok(MailReceipt {
            recipient: message.to,
            response: "logged".to_string(),
        })
    }
}

/// Transport selected from configuration at startup.
#[derive(Debug)]
pub enum ConfiguredMailer {
    Smtp(SmtpMailer),
    Logging(LoggingMailer),
}

impl ConfiguredMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        if config.enabled {
            SmtpMailer::from_config(config).map(Self::Smtp)
        } else {
            Ok(Self::Logging(LoggingMailer))
        }
    }
}

#[async_trait]
impl ChecklistMailer for ConfiguredMailer {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError> {
        match self {
            Self::Smtp(mailer) => mailer.send(message).await,
            Self::Logging(mailer) => mailer.send(message).await,
        }
    }
}
