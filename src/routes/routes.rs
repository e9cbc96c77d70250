//! Defines routes for the scholarship catalog and resume storage API.
//!
//! ## Structure
//! - **Service endpoints**
//!   - `GET /`        — banner with the main endpoints
//!   - `GET /healthz` — liveness
//!   - `GET /readyz`  — readiness of the selected resume backend
//!
//! - **Resume endpoints**
//!   - `POST /api/students/{student_id}/resume`        — multipart PDF upload
//!   - `GET  /api/students/{student_id}/resume`        — current resume record
//!   - `POST /api/students/{student_id}/resume/write`  — form-based resume
//!   - `GET  /api/resume-files/{student_id}/{stored_filename}` — download
//!
//! - **Scholarship endpoints**
//!   - `GET    /api/scholarships`                       — list, `?category=` filter
//!   - `GET    /api/scholarships/saved`                 — saved entries
//!   - `GET    /api/scholarships/{scholarship_id}`      — single entry
//!   - `POST   /api/scholarships/{scholarship_id}/save` — mark saved
//!   - `DELETE /api/scholarships/{scholarship_id}/save` — unmark
//!
//! Static segments win over parameters, so `/api/scholarships/saved` is
//! never captured as a `{scholarship_id}`.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz, root},
        resume_handlers::{download_resume, get_resume, upload_resume, write_resume},
        scholarship_handlers::{
            get_scholarship, list_saved_scholarships, list_scholarships, remove_saved_scholarship,
            save_scholarship,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Largest accepted upload body. Resume PDFs with embedded scans run well
/// past axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build and return the router for all API routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // service endpoints (mounted at root)
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // resume routes
        .route(
            "/api/students/{student_id}/resume",
            post(upload_resume).get(get_resume),
        )
        .route("/api/students/{student_id}/resume/write", post(write_resume))
        .route(
            "/api/resume-files/{student_id}/{stored_filename}",
            get(download_resume),
        )
        // scholarship routes
        .route("/api/scholarships", get(list_scholarships))
        .route("/api/scholarships/saved", get(list_saved_scholarships))
        .route("/api/scholarships/{scholarship_id}", get(get_scholarship))
        .route(
            "/api/scholarships/{scholarship_id}/save",
            post(save_scholarship).delete(remove_saved_scholarship),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
