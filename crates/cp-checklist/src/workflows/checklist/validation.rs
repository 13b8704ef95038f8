use super::domain::{ChecklistSubmission, RequiredField};

/// Submission refused because required answers are missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("All required fields must be completed (missing: {}).", missing_labels(.missing))]
pub struct SubmissionRejected {
    pub missing: Vec<RequiredField>,
}

fn missing_labels(missing: &[RequiredField]) -> String {
    missing
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that every required field carries a non-blank answer.
pub fn validate(submission: &ChecklistSubmission) -> Result<(), SubmissionRejected> {
    let missing: Vec<RequiredField> = RequiredField::ordered()
        .into_iter()
        .filter(|field| submission.required(*field).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SubmissionRejected { missing })
    }
}
