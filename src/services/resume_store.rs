//! src/services/resume_store.rs
//!
//! The resume storage abstraction: one contract, two backends. The cloud
//! backend persists blobs to S3 and records to DynamoDB; the local backend
//! persists blobs to disk and records to a JSON sidecar. Both normalize
//! their results into the same [`ResumeRecord`] shape, so callers never
//! know which one served them.

use crate::config::AppConfig;
use crate::models::resume::{ResumeMeta, ResumeRecord, StoredResume, normalize_meta};
use crate::services::cloud_store::CloudResumeStore;
use crate::services::local_store::LocalResumeStore;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::stream::BoxStream;
use std::io;
use thiserror::Error;
use uuid::Uuid;

/// Normalized readable handle to stored resume content. The HTTP layer
/// frames it as an attachment download.
pub type ResumeStream = BoxStream<'static, io::Result<Bytes>>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied input violates an upload rule; always caller-fixable.
    #[error("{0}")]
    Validation(String),
    /// No record or blob for the request. Deliberately covers key mismatch
    /// too, so probing cannot distinguish "wrong key" from "truly absent".
    #[error("{0}")]
    NotFound(String),
    /// The backing object store, table, or disk failed unexpectedly.
    #[error("{0}")]
    StorageAccess(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The contract implemented identically by the cloud and local backends.
#[async_trait]
pub trait ResumeBackend: Send + Sync {
    /// Persist `content` under a freshly generated storage key, then
    /// persist/overwrite the student's metadata record. A repeat save for
    /// the same student replaces the record wholesale; the previously
    /// stored blob is left in place.
    async fn save_resume(
        &self,
        student_id: &str,
        filename: &str,
        content: Bytes,
        meta: Option<ResumeMeta>,
    ) -> StoreResult<ResumeRecord>;

    /// Fetch the student's normalized record.
    async fn get_resume(&self, student_id: &str) -> StoreResult<ResumeRecord>;

    /// Open the stored blob for streaming. The reconstructed key from
    /// `(student_id, stored_filename)` must equal the record's stored key.
    async fn get_resume_stream(
        &self,
        student_id: &str,
        stored_filename: &str,
    ) -> StoreResult<ResumeStream>;
}

/// The backend actually serving requests, decided once at startup.
///
/// Cloud wins when its configuration is present and its clients construct;
/// anything else falls back to local disk. There is no re-check later: a
/// cloud that becomes available after startup is picked up on restart.
pub enum ResumeStore {
    Cloud(CloudResumeStore),
    Local(LocalResumeStore),
}

impl ResumeStore {
    /// Select and construct the backend for this process.
    pub async fn select(cfg: &AppConfig) -> StoreResult<Self> {
        match CloudResumeStore::connect(cfg).await {
            Ok(cloud) => Ok(Self::Cloud(cloud)),
            Err(reason) => {
                tracing::warn!(
                    "cloud resume store unavailable ({reason}); falling back to local storage"
                );
                Ok(Self::Local(LocalResumeStore::open(&cfg.local_storage_dir)?))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Cloud(_) => "cloud",
            Self::Local(_) => "local",
        }
    }
}

#[async_trait]
impl ResumeBackend for ResumeStore {
    async fn save_resume(
        &self,
        student_id: &str,
        filename: &str,
        content: Bytes,
        meta: Option<ResumeMeta>,
    ) -> StoreResult<ResumeRecord> {
        match self {
            Self::Cloud(store) => store.save_resume(student_id, filename, content, meta).await,
            Self::Local(store) => store.save_resume(student_id, filename, content, meta).await,
        }
    }

    async fn get_resume(&self, student_id: &str) -> StoreResult<ResumeRecord> {
        match self {
            Self::Cloud(store) => store.get_resume(student_id).await,
            Self::Local(store) => store.get_resume(student_id).await,
        }
    }

    async fn get_resume_stream(
        &self,
        student_id: &str,
        stored_filename: &str,
    ) -> StoreResult<ResumeStream> {
        match self {
            Self::Cloud(store) => store.get_resume_stream(student_id, stored_filename).await,
            Self::Local(store) => store.get_resume_stream(student_id, stored_filename).await,
        }
    }
}

/// Backend-internal blob location for a student's stored file.
pub(crate) fn storage_key(student_id: &str, stored_filename: &str) -> String {
    format!("{student_id}/{stored_filename}")
}

/// Public download path embedding the stored filename.
pub(crate) fn download_url(student_id: &str, stored_filename: &str) -> String {
    format!("/api/resume-files/{student_id}/{stored_filename}")
}

/// Reject anything that is not a PDF by filename, case-insensitively.
pub(crate) fn ensure_pdf_filename(filename: &str) -> StoreResult<()> {
    if filename.to_ascii_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(StoreError::Validation(
            "Only PDF uploads are allowed.".into(),
        ))
    }
}

/// Build a fresh internal record for a save. Every save gets a new
/// `resumeId` and therefore a new stored filename, including overwrites.
pub(crate) fn new_stored_resume(
    student_id: &str,
    file_name: &str,
    meta: Option<ResumeMeta>,
) -> StoredResume {
    let resume_id = Uuid::new_v4().simple().to_string();
    let stored_filename = format!("{resume_id}.pdf");
    StoredResume {
        student_id: student_id.to_string(),
        resume_id,
        file_name: file_name.to_string(),
        url: download_url(student_id, &stored_filename),
        storage_key: storage_key(student_id, &stored_filename),
        uploaded_at: Utc::now(),
        meta: normalize_meta(meta),
    }
}
