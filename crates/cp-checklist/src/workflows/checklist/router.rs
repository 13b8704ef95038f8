use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use super::domain::ChecklistSubmission;
use super::mail::ChecklistMailer;
use super::service::{ChecklistService, ChecklistServiceError};
use super::store::SubmissionStore;

pub const SUBMISSION_ID_HEADER: HeaderName = HeaderName::from_static("x-submission-id");

const SUBMITTED_MESSAGE: &str = "Checklist submitted successfully! Please click \"Download PDF\".";
const GENERATION_FAILED_MESSAGE: &str = "Error generating PDF";
const PANIC_MESSAGE: &str = "Something broke!";

pub type PanicResponder = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Turns a panicking handler into a JSON 500 instead of a dropped connection.
pub fn catch_panic_layer() -> CatchPanicLayer<PanicResponder> {
    CatchPanicLayer::custom(panic_response as PanicResponder)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    error!(panic = detail, "request handler panicked");

    let body = json!({
        "message": PANIC_MESSAGE,
        "success": false,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Router builder exposing the submit and download endpoints.
pub fn checklist_router<S, M>(service: Arc<ChecklistService<S, M>>) -> Router
where
    S: SubmissionStore + 'static,
    M: ChecklistMailer + 'static,
{
    Router::new()
        .route("/submit-form", post(submit_handler::<S, M>))
        .route("/download-pdf", get(download_handler::<S, M>))
        .layer(catch_panic_layer())
        .with_state(service)
}

fn rejected(message: String) -> Response {
    let payload = json!({
        "message": message,
        "success": false,
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<S, M>(
    State(service): State<Arc<ChecklistService<S, M>>>,
    payload: Result<Json<ChecklistSubmission>, JsonRejection>,
) -> Response
where
    S: SubmissionStore + 'static,
    M: ChecklistMailer + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection.body_text()),
    };

    match service.submit(submission) {
        Ok(record) => {
            let payload = json!({
                "message": SUBMITTED_MESSAGE,
                "submissionId": record.submission_id,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(ChecklistServiceError::Rejected(error)) => rejected(error.to_string()),
        Err(other) => {
            error!(error = %other, "error processing checklist submission");
            let payload = json!({
                "message": "An error occurred while processing your submission.",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn download_handler<S, M>(
    State(service): State<Arc<ChecklistService<S, M>>>,
) -> Response
where
    S: SubmissionStore + 'static,
    M: ChecklistMailer + 'static,
{
    match service.download().await {
        Ok(report) => {
            let disposition = format!("attachment; filename=\"{}\"", report.file_name);
            let headers = [
                (header::CONTENT_TYPE, mime::APPLICATION_PDF.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
                (SUBMISSION_ID_HEADER, report.submission_id.0),
            ];
            // The email job keeps running after the handle is dropped.
            (StatusCode::OK, headers, report.document.bytes).into_response()
        }
        Err(err @ ChecklistServiceError::NoSubmission) => {
            let payload = json!({ "message": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(err @ (ChecklistServiceError::Render(_) | ChecklistServiceError::Delivery(_))) => {
            error!(error = %err, "PDF generation error");
            let payload = json!({ "message": GENERATION_FAILED_MESSAGE });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "checklist download failed");
            let payload = json!({ "message": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
