//! Checklist rendering: a layout pass producing [`ChecklistDocument`] followed by a
//! paint pass encoding it as a PDF.

pub mod layout;
mod pdf;

use chrono::{DateTime, Local};

use super::domain::ChecklistSubmission;
pub use layout::{ChecklistDocument, DocumentSection, SectionBody};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unable to load PDF font: {0}")]
    Font(String),
    #[error("unable to encode PDF document: {0}")]
    Encode(String),
}

/// Encoded PDF produced for a single download.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub layout: ChecklistDocument,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ChecklistRenderer;

impl ChecklistRenderer {
    pub fn layout(
        &self,
        submission: &ChecklistSubmission,
        generated_at: DateTime<Local>,
    ) -> ChecklistDocument {
        layout::build(submission, generated_at)
    }

    pub fn render(
        &self,
        submission: &ChecklistSubmission,
        generated_at: DateTime<Local>,
    ) -> Result<RenderedDocument, RenderError> {
        let layout = self.layout(submission, generated_at);
        let (bytes, page_count) = pdf::paint(&layout)?;
        Ok(RenderedDocument {
            layout,
            bytes,
            page_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_pdf_byte_stream() {
        let submission = ChecklistSubmission {
            business_name: Some("Acme Co".to_string()),
            ..ChecklistSubmission::default()
        };

        let rendered = ChecklistRenderer
            .render(&submission, Local::now())
            .expect("document renders");

        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.page_count, 1);
    }

    fn painted_text(bytes: &[u8]) -> String {
        let document = printpdf::lopdf::Document::load_mem(bytes).expect("readable PDF");
        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        document.extract_text(&pages).expect("text extracts")
    }

    #[test]
    fn every_section_body_is_painted() {
        let submission = ChecklistSubmission {
            business_name: Some("Harbor Deli".to_string()),
            property_address: Some("9 Pier Rd".to_string()),
            security_systems: Some("monitored alarm".to_string()),
            potholes: Some("two near exit".to_string()),
            additional_notes: Some("Gate code changes monthly.".to_string()),
            ..ChecklistSubmission::default()
        };

        let rendered = ChecklistRenderer
            .render(&submission, Local::now())
            .expect("document renders");
        let text = painted_text(&rendered.bytes);

        // The title may wrap; every other entry fits on one line.
        for line in rendered.layout.text_lines().into_iter().skip(1) {
            assert!(text.contains(&line), "'{line}' not painted");
        }
        assert!(text.contains("Business Name: Harbor Deli"));
        assert!(text.contains("- Security Systems: monitored alarm"));
        assert!(text.contains("- Potholes: two near exit"));
        assert!(text.contains("Gate code changes monthly."));
    }

    #[test]
    fn long_notes_flow_onto_additional_pages() {
        let notes = "Tenant reported intermittent flooding near loading dock. ".repeat(120);
        let submission = ChecklistSubmission {
            additional_notes: Some(notes),
            ..ChecklistSubmission::default()
        };

        let rendered = ChecklistRenderer
            .render(&submission, Local::now())
            .expect("document renders");

        assert!(rendered.page_count > 1);
    }
}
