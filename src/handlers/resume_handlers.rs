//! HTTP handlers for resume upload, form-based writing, lookup, and
//! download. Uploads arrive as multipart form data; downloads stream the
//! stored blob back without buffering it in memory.

use crate::{
    errors::AppError,
    models::resume::{ResumeMeta, ResumeRecord},
    services::resume_store::ResumeBackend,
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

/// Body for `POST /api/students/{student_id}/resume/write`.
#[derive(Debug, Deserialize)]
pub struct ResumeWriteRequest {
    pub name: String,
    pub major: String,
    pub grade: String,
    pub certificates: String,
}

/// Stand-in body for form-written resumes until PDF generation exists.
const PLACEHOLDER_PDF: &[u8] = b"%PDF-1.4\n";

/// Upload a resume PDF to `/api/students/{student_id}/resume`.
///
/// Expects a `file` part with content type `application/pdf` and an
/// optional `meta` part holding a JSON object.
pub async fn upload_resume(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ResumeRecord>, AppError> {
    let mut file_part: Option<(String, Option<String>, Bytes)> = None;
    let mut meta_text = String::from("{}");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("invalid multipart body: {err}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                // Browsers send `filename=""` for some inputs; treat that the
                // same as no filename at all.
                let filename = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or("resume.pdf")
                    .to_string();
                let content_type = field.content_type().map(str::to_string);
                let content = field.bytes().await.map_err(|err| {
                    AppError::bad_request(format!("could not read upload: {err}"))
                })?;
                file_part = Some((filename, content_type, content));
            }
            Some("meta") => {
                meta_text = field.text().await.map_err(|err| {
                    AppError::bad_request(format!("could not read `meta` field: {err}"))
                })?;
            }
            _ => {}
        }
    }

    let (filename, content_type, content) =
        file_part.ok_or_else(|| AppError::bad_request("Missing `file` upload field."))?;

    if content_type.as_deref() != Some("application/pdf") {
        return Err(AppError::bad_request("Only PDF uploads are allowed."));
    }

    let mut meta = parse_meta(&meta_text)?;

    if content.is_empty() {
        return Err(AppError::bad_request("Uploaded file is empty."));
    }

    // TODO: extract text from the PDF here and fold it into `meta` once a
    // parser is picked.

    meta.insert("source".into(), json!("upload"));

    let record = state
        .store
        .save_resume(&student_id, &filename, content, Some(meta))
        .await?;
    Ok(Json(record))
}

/// Create a resume from form fields at
/// `/api/students/{student_id}/resume/write`.
///
/// No real PDF exists for form input yet, so a minimal placeholder body is
/// stored and the form fields travel in the record metadata.
pub async fn write_resume(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(data): Json<ResumeWriteRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    let mut meta = ResumeMeta::new();
    meta.insert("source".into(), json!("write"));
    meta.insert("name".into(), json!(data.name));
    meta.insert("major".into(), json!(data.major));
    meta.insert("grade".into(), json!(data.grade));
    meta.insert("certificates".into(), json!(data.certificates));

    let record = state
        .store
        .save_resume(
            &student_id,
            &format!("resume_{}.pdf", data.name),
            Bytes::from_static(PLACEHOLDER_PDF),
            Some(meta),
        )
        .await?;
    Ok(Json(record))
}

/// Fetch the current resume record for a student.
pub async fn get_resume(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = state.store.get_resume(&student_id).await?;
    Ok(Json(record))
}

/// Download `/api/resume-files/{student_id}/{stored_filename}` as a
/// streaming attachment.
pub async fn download_resume(
    State(state): State<AppState>,
    Path((student_id, stored_filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let stream = state
        .store
        .get_resume_stream(&student_id, &stored_filename)
        .await?;

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    let disposition = format!("attachment; filename=\"{stored_filename}\"");
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok(response)
}

fn parse_meta(text: &str) -> Result<ResumeMeta, AppError> {
    if text.is_empty() {
        return Ok(ResumeMeta::new());
    }
    serde_json::from_str(text).map_err(|_| AppError::bad_request("`meta` must be valid JSON."))
}
