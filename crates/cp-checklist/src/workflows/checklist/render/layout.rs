use chrono::{DateTime, Local};
use serde::Serialize;

use crate::workflows::checklist::domain::{
    ChecklistSubmission, ConditionCheck, RiskMitigationItem, PLACEHOLDER,
};

pub const TITLE: &str = "Commercial Property Insurance Risk Mitigation Checklist";
pub const BUSINESS_SECTION: &str = "Business Information";
pub const RISK_SECTION: &str = "Risk Mitigation Details";
pub const CONDITION_SECTION: &str = "Additional Property Condition Checks";
pub const NOTES_SECTION: &str = "Additional Notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SectionBody {
    Lines(Vec<String>),
    Bullets(Vec<String>),
    Paragraph(String),
}

impl SectionBody {
    pub fn entries(&self) -> Vec<&str> {
        match self {
            SectionBody::Lines(lines) | SectionBody::Bullets(lines) => {
                lines.iter().map(String::as_str).collect()
            }
            SectionBody::Paragraph(text) => vec![text.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSection {
    pub heading: &'static str,
    pub body: SectionBody,
}

/// Page-independent layout of a rendered checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistDocument {
    pub title: &'static str,
    pub sections: Vec<DocumentSection>,
    /// Right-aligned generation footer.
    pub footer: String,
}

impl ChecklistDocument {
    pub fn section(&self, heading: &str) -> Option<&DocumentSection> {
        self.sections
            .iter()
            .find(|section| section.heading == heading)
    }

    /// Every printed line in reading order, without wrapping.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.to_string()];
        for section in &self.sections {
            lines.push(section.heading.to_string());
            lines.extend(section.body.entries().into_iter().map(str::to_string));
        }
        lines.push(self.footer.clone());
        lines
    }
}

fn labelled(label: &str, value: Option<&str>) -> String {
    format!("{}: {}", label, value.unwrap_or(PLACEHOLDER))
}

pub(crate) fn generated_footer(generated_at: DateTime<Local>) -> String {
    format!(
        "Generated on {} at {}",
        generated_at.format("%-m/%-d/%Y"),
        generated_at.format("%-I:%M:%S %p")
    )
}

pub(crate) fn build(submission: &ChecklistSubmission, generated_at: DateTime<Local>) -> ChecklistDocument {
    let mut business = vec![
        labelled("Business Name", submission.business_name()),
        labelled("Property Address", submission.property_address()),
    ];
    if let Some(property) = submission.selected_property() {
        business.push(labelled("Property", Some(property)));
    }

    let risk = RiskMitigationItem::ordered()
        .into_iter()
        .map(|item| labelled(item.label(), submission.risk_mitigation(item)))
        .collect();

    let conditions = ConditionCheck::ordered()
        .into_iter()
        .map(|check| labelled(check.label(), submission.condition(check)))
        .collect();

    let notes = submission
        .additional_notes()
        .unwrap_or(PLACEHOLDER)
        .to_string();

    ChecklistDocument {
        title: TITLE,
        sections: vec![
            DocumentSection {
                heading: BUSINESS_SECTION,
                body: SectionBody::Lines(business),
            },
            DocumentSection {
                heading: RISK_SECTION,
                body: SectionBody::Bullets(risk),
            },
            DocumentSection {
                heading: CONDITION_SECTION,
                body: SectionBody::Bullets(conditions),
            },
            DocumentSection {
                heading: NOTES_SECTION,
                body: SectionBody::Paragraph(notes),
            },
        ],
        footer: generated_footer(generated_at),
    }
}
