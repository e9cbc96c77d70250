//! Health & readiness handlers.
//!
//! - GET /        -> service banner with the main endpoints
//! - GET /healthz -> simple liveness ("ok")
//! - GET /readyz  -> readiness for whichever resume backend was selected

use crate::{services::resume_store::ResumeStore, state::AppState};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

/// `GET /`
///
/// Service banner pointing at the main endpoints.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Scholarship & Resume API running",
        "resumeUpload": "/api/students/{studentId}/resume",
        "scholarships": "/api/scholarships",
    }))
}

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe for the selected resume backend:
/// - local: best-effort write/read/delete under the storage directory
/// - cloud: HeadBucket against S3 and DescribeTable against DynamoDB
///
/// Returns JSON describing each check. HTTP 200 when all checks pass,
/// HTTP 503 when any check fails.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = HashMap::new();

    match state.store.as_ref() {
        ResumeStore::Local(store) => {
            let (ok, error) = disk_probe(store.storage_dir()).await;
            checks.insert("disk", CheckStatus { ok, error });
        }
        ResumeStore::Cloud(store) => {
            let bucket = store.check_bucket().await;
            checks.insert(
                "s3",
                CheckStatus {
                    ok: bucket.is_ok(),
                    error: bucket.err(),
                },
            );
            let table = store.check_table().await;
            checks.insert(
                "dynamodb",
                CheckStatus {
                    ok: table.is_ok(),
                    error: table.err(),
                },
            );
        }
    }

    let overall_ok = checks.values().all(|check| check.ok);

    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        backend: state.store.backend_name(),
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

/// Disk write/read/delete check (uses a temp file under the storage dir).
async fn disk_probe(base: &Path) -> (bool, Option<String>) {
    let tmp_path = base.join(format!(".readyz-{}", Uuid::new_v4()));
    match fs::write(&tmp_path, b"readyz").await {
        Ok(_) => match fs::read(&tmp_path).await {
            Ok(bytes) => {
                if bytes == b"readyz" {
                    // try to remove the temp file; ignore removal error but report if it happens
                    match fs::remove_file(&tmp_path).await {
                        Ok(_) => (true, None),
                        Err(e) => (true, Some(format!("could not remove tmp file: {}", e))),
                    }
                } else {
                    // content mismatch
                    let _ = fs::remove_file(&tmp_path).await; // best-effort cleanup
                    (false, Some("file content mismatch".to_string()))
                }
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp_path).await; // best-effort cleanup
                (false, Some(format!("could not read tmp file: {}", e)))
            }
        },
        Err(e) => (false, Some(format!("could not write tmp file: {}", e))),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    backend: &'static str,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
