use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Local, TimeZone};
use cp_checklist::config::AppConfig;
use cp_checklist::workflows::checklist::{
    checklist_router, ChecklistMailer, ChecklistService, ChecklistSubmission, ConditionCheck,
    DeliverySettings, FixedClock, InMemorySubmissionStore, MailError, MailMessage, MailReceipt,
    PropertyRecipientMap,
};
use printpdf::lopdf::Document;
use serde_json::json;
use tower::ServiceExt;

#[derive(Default, Clone)]
struct OutboxMailer {
    outbox: Arc<Mutex<Vec<MailMessage>>>,
}

#[async_trait]
impl ChecklistMailer for OutboxMailer {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError> {
        let recipient = message.to.clone();
        self.outbox.lock().expect("outbox mutex").push(message);
        Ok(MailReceipt {
            recipient,
            response: "250".to_string(),
        })
    }
}

fn pdf_text(bytes: &[u8]) -> String {
    let document = Document::load_mem(bytes).expect("response is a readable PDF");
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    document.extract_text(&pages).expect("text extracts")
}

fn assert_appear_in_order(text: &str, expected: &[String]) {
    let mut rest = text;
    for needle in expected {
        let at = rest
            .find(needle.as_str())
            .unwrap_or_else(|| panic!("'{needle}' missing or out of order in:\n{text}"));
        rest = &rest[at + needle.len()..];
    }
}

fn service_for(
    output_dir: &std::path::Path,
    recipients: PropertyRecipientMap,
) -> (
    Arc<ChecklistService<InMemorySubmissionStore, OutboxMailer>>,
    OutboxMailer,
) {
    let mailer = OutboxMailer::default();
    let now = Local
        .with_ymd_and_hms(2026, 10, 16, 11, 0, 0)
        .single()
        .expect("unambiguous local time");
    let service = ChecklistService::new(
        Arc::new(InMemorySubmissionStore::default()),
        Arc::new(mailer.clone()),
        DeliverySettings {
            output_dir: output_dir.to_path_buf(),
            filename_style: Default::default(),
            recipients,
        },
    )
    .with_clock(Arc::new(FixedClock(now)));
    (Arc::new(service), mailer)
}

#[tokio::test]
async fn acme_submission_is_rendered_saved_and_emailed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (service, mailer) = service_for(dir.path(), PropertyRecipientMap::standard());
    let router = checklist_router(service);

    let payload = json!({
        "businessName": "Acme Co",
        "propertyAddress": "123 Main St",
        "fireSafetyMeasures": "sprinklers",
        "securitySystems": "cameras",
        "maintenanceSchedule": "monthly",
        "selectedProperty": "San Clemente"
    });
    let response = router
        .clone()
        .oneshot(
            Request::post("/submit-form")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::get("/download-pdf")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");

    let text = pdf_text(&body);
    let mut expected = vec![
        "Commercial Property Insurance".to_string(),
        "Business Information".to_string(),
        "Business Name: Acme Co".to_string(),
        "Property Address: 123 Main St".to_string(),
        "Risk Mitigation Details".to_string(),
        "Fire Safety Measures: sprinklers".to_string(),
        "Security Systems: cameras".to_string(),
        "Maintenance Schedule: monthly".to_string(),
        "Additional Property Condition Checks".to_string(),
    ];
    expected.extend(
        ConditionCheck::ordered()
            .iter()
            .map(|check| format!("{}: N/A", check.label())),
    );
    expected.push("Additional Notes".to_string());
    expected.push("Generated on 10/16/2026 at 11:00:00 AM".to_string());
    assert_appear_in_order(&text, &expected);

    let mut sent = Vec::new();
    for _ in 0..50 {
        sent = mailer.outbox.lock().expect("outbox mutex").clone();
        if !sent.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(sent.len(), 1, "exactly one email per download");
    assert_eq!(sent[0].to, "sanclemente.inspections@example.com");
    assert_eq!(sent[0].attachment.bytes, body.to_vec());

    let saved = dir.path().join(&sent[0].attachment.file_name);
    assert_eq!(std::fs::read(saved).expect("saved PDF"), body.to_vec());
}

fn tenant(business: &str, property: &str) -> ChecklistSubmission {
    ChecklistSubmission {
        business_name: Some(business.to_string()),
        property_address: Some("9 Pier Rd".to_string()),
        fire_safety_measures: Some("extinguishers".to_string()),
        security_systems: Some("alarm".to_string()),
        maintenance_schedule: Some("weekly".to_string()),
        selected_property: Some(property.to_string()),
        ..ChecklistSubmission::default()
    }
}

#[tokio::test]
async fn configured_recipient_table_drives_delivery() {
    let config = AppConfig::from_lookup(|key| match key {
        "CHECKLIST_PROPERTY_RECIPIENTS" => Some("Harbor Point=harbor@example.com".to_string()),
        "CHECKLIST_DEFAULT_RECIPIENT" => Some("frontdesk@example.com".to_string()),
        _ => None,
    })
    .expect("config loads");

    let mut recipients = Vec::new();
    for (business, property) in [("Harbor Deli", "harbor point"), ("Surf Shop", "San Clemente")] {
        let dir = tempfile::tempdir().expect("tempdir");
        let (service, mailer) = service_for(dir.path(), config.recipients.clone());
        service.submit(tenant(business, property)).expect("accepted");

        let report = service.download().await.expect("download succeeds");
        let receipt = report.mail_outcome().await.expect("email sent");
        assert_eq!(mailer.outbox.lock().expect("outbox mutex").len(), 1);
        recipients.push(receipt.recipient);
    }

    assert_eq!(recipients, vec!["harbor@example.com", "frontdesk@example.com"]);
}
