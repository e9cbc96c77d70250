//! src/services/local_store.rs
//!
//! Disk-backed resume store used whenever the cloud backend is not
//! available. Blobs live under one subdirectory per student; all records
//! live in a single in-memory map that is rewritten wholesale to a JSON
//! sidecar on every mutation and reloaded at startup.

use crate::models::resume::{ResumeMeta, ResumeRecord, StoredResume};
use crate::services::resume_store::{
    ResumeBackend, ResumeStream, StoreError, StoreResult, ensure_pdf_filename, new_stored_resume,
    storage_key,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

const METADATA_FILE: &str = "metadata.json";

pub struct LocalResumeStore {
    storage_dir: PathBuf,
    metadata_path: PathBuf,
    /// All mutations are serialized behind this lock: the map update and
    /// the full sidecar rewrite must not interleave across requests.
    records: Mutex<HashMap<String, StoredResume>>,
}

impl LocalResumeStore {
    /// Open the store rooted at `storage_dir`, creating the directory and
    /// loading any existing sidecar. A missing or unreadable sidecar
    /// starts the store empty rather than failing.
    pub fn open(storage_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let storage_dir = storage_dir.into();
        std::fs::create_dir_all(&storage_dir).map_err(|err| {
            error!(
                "failed to create resume storage directory {}: {err}",
                storage_dir.display()
            );
            StoreError::StorageAccess("Failed to access resume store.".into())
        })?;

        let metadata_path = storage_dir.join(METADATA_FILE);
        let records = match std::fs::read_to_string(&metadata_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(err) => {
                    warn!(
                        "resume metadata file {} is not valid JSON ({err}); starting empty",
                        metadata_path.display()
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            storage_dir,
            metadata_path,
            records: Mutex::new(records),
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn blob_path(&self, student_id: &str, stored_filename: &str) -> PathBuf {
        self.storage_dir.join(student_id).join(stored_filename)
    }

    /// Rewrite the whole sidecar from the given map.
    async fn persist(&self, records: &HashMap<String, StoredResume>) -> StoreResult<()> {
        let body = serde_json::to_vec_pretty(records).map_err(|err| {
            error!("failed to serialize resume metadata: {err}");
            StoreError::StorageAccess("Failed to store resume metadata.".into())
        })?;
        fs::write(&self.metadata_path, body).await.map_err(|err| {
            error!(
                "failed to write resume metadata file {}: {err}",
                self.metadata_path.display()
            );
            StoreError::StorageAccess("Failed to store resume metadata.".into())
        })
    }
}

/// Student ids become directory names here, so refuse anything that could
/// escape the storage root or confuse the filesystem.
fn ensure_student_id_safe(student_id: &str) -> StoreResult<()> {
    if student_id.is_empty()
        || student_id.contains("..")
        || student_id.contains('/')
        || student_id.contains('\\')
        || student_id.bytes().any(|b| b.is_ascii_control())
    {
        return Err(StoreError::Validation("Invalid student id.".into()));
    }
    Ok(())
}

#[async_trait]
impl ResumeBackend for LocalResumeStore {
    async fn save_resume(
        &self,
        student_id: &str,
        filename: &str,
        content: Bytes,
        meta: Option<ResumeMeta>,
    ) -> StoreResult<ResumeRecord> {
        ensure_pdf_filename(filename)?;
        ensure_student_id_safe(student_id)?;

        let item = new_stored_resume(student_id, filename, meta);
        let stored_filename = item.stored_file_name();

        let mut records = self.records.lock().await;

        let student_dir = self.storage_dir.join(student_id);
        fs::create_dir_all(&student_dir).await.map_err(|err| {
            error!(
                "failed to create student directory {}: {err}",
                student_dir.display()
            );
            StoreError::StorageAccess("Failed to upload resume to storage.".into())
        })?;
        fs::write(student_dir.join(&stored_filename), &content)
            .await
            .map_err(|err| {
                error!("failed to write resume blob for {student_id}: {err}");
                StoreError::StorageAccess("Failed to upload resume to storage.".into())
            })?;

        records.insert(student_id.to_string(), item.clone());
        self.persist(&records).await?;

        Ok(item.to_record())
    }

    async fn get_resume(&self, student_id: &str) -> StoreResult<ResumeRecord> {
        let records = self.records.lock().await;
        records
            .get(student_id)
            .map(StoredResume::to_record)
            .ok_or_else(|| StoreError::NotFound("Resume not found for this student.".into()))
    }

    async fn get_resume_stream(
        &self,
        student_id: &str,
        stored_filename: &str,
    ) -> StoreResult<ResumeStream> {
        let item = {
            let records = self.records.lock().await;
            records.get(student_id).cloned()
        }
        .ok_or_else(|| StoreError::NotFound("Resume not found for this student.".into()))?;

        if item.storage_key != storage_key(student_id, stored_filename) {
            return Err(StoreError::NotFound("Resume file not found.".into()));
        }

        let path = self.blob_path(student_id, stored_filename);
        let file = File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StoreError::NotFound("Resume file not found.".into())
            } else {
                error!("failed to open resume blob {}: {err}", path.display());
                StoreError::StorageAccess("Failed to access resume store.".into())
            }
        })?;

        Ok(ReaderStream::new(file).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn collect(mut stream: ResumeStream) -> Vec<u8> {
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk.unwrap());
        }
        buf
    }

    fn upload_meta() -> ResumeMeta {
        let mut meta = ResumeMeta::new();
        meta.insert("source".into(), json!("upload"));
        meta
    }

    #[tokio::test]
    async fn save_then_get_returns_the_same_record() {
        let dir = TempDir::new().unwrap();
        let store = LocalResumeStore::open(dir.path()).unwrap();

        let saved = store
            .save_resume(
                "20240001",
                "김철수 이력서.pdf",
                Bytes::from_static(b"%PDF-1.4 content"),
                Some(upload_meta()),
            )
            .await
            .unwrap();

        let fetched = store.get_resume("20240001").await.unwrap();
        assert_eq!(fetched.resume_id, saved.resume_id);
        assert_eq!(fetched.file_name, "김철수 이력서.pdf");
        assert_eq!(fetched.meta, Some(upload_meta()));
        assert_eq!(
            fetched.url,
            format!("/api/resume-files/20240001/{}.pdf", fetched.resume_id)
        );
    }

    #[tokio::test]
    async fn second_save_replaces_the_record_with_a_new_id() {
        let dir = TempDir::new().unwrap();
        let store = LocalResumeStore::open(dir.path()).unwrap();

        let first = store
            .save_resume("stu", "v1.pdf", Bytes::from_static(b"one"), None)
            .await
            .unwrap();
        let second = store
            .save_resume("stu", "v2.pdf", Bytes::from_static(b"two"), None)
            .await
            .unwrap();

        assert_ne!(first.resume_id, second.resume_id);

        let fetched = store.get_resume("stu").await.unwrap();
        assert_eq!(fetched.resume_id, second.resume_id);
        assert_eq!(fetched.file_name, "v2.pdf");

        // The first blob is intentionally left behind; only the record moves.
        let old_blob = dir.path().join("stu").join(format!("{}.pdf", first.resume_id));
        assert!(old_blob.exists());
    }

    #[tokio::test]
    async fn non_pdf_filenames_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = LocalResumeStore::open(dir.path()).unwrap();

        let err = store
            .save_resume("stu", "report.docx", Bytes::from_static(b"x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.get_resume("stu").await.is_err());
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalResumeStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.get_resume("unknown-student").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stream_returns_saved_bytes_and_rejects_forged_names() {
        let dir = TempDir::new().unwrap();
        let store = LocalResumeStore::open(dir.path()).unwrap();

        let content = b"%PDF-1.4 streaming body";
        let saved = store
            .save_resume("stu", "cv.pdf", Bytes::from_static(content), None)
            .await
            .unwrap();
        let stored_filename = format!("{}.pdf", saved.resume_id);

        let stream = store
            .get_resume_stream("stu", &stored_filename)
            .await
            .unwrap();
        assert_eq!(collect(stream).await, content);

        // Same student, different filename: must look absent.
        assert!(matches!(
            store.get_resume_stream("stu", "forged.pdf").await,
            Err(StoreError::NotFound(_))
        ));

        // Unknown student entirely.
        assert!(matches!(
            store.get_resume_stream("ghost", &stored_filename).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn records_survive_a_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        let saved = {
            let store = LocalResumeStore::open(dir.path()).unwrap();
            store
                .save_resume("stu", "cv.pdf", Bytes::from_static(b"abc"), Some(upload_meta()))
                .await
                .unwrap()
        };

        let reopened = LocalResumeStore::open(dir.path()).unwrap();
        let fetched = reopened.get_resume("stu").await.unwrap();
        assert_eq!(fetched.resume_id, saved.resume_id);
        assert_eq!(fetched.file_name, "cv.pdf");
        assert_eq!(fetched.meta, Some(upload_meta()));

        let stream = reopened
            .get_resume_stream("stu", &format!("{}.pdf", saved.resume_id))
            .await
            .unwrap();
        assert_eq!(collect(stream).await, b"abc");
    }

    #[tokio::test]
    async fn corrupt_sidecar_starts_the_store_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE), b"{not json").unwrap();

        let store = LocalResumeStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.get_resume("stu").await,
            Err(StoreError::NotFound(_))
        ));

        // And the store is usable again after the bad load.
        store
            .save_resume("stu", "cv.pdf", Bytes::from_static(b"x"), None)
            .await
            .unwrap();
        assert!(store.get_resume("stu").await.is_ok());
    }

    #[tokio::test]
    async fn empty_meta_is_omitted_from_the_record() {
        let dir = TempDir::new().unwrap();
        let store = LocalResumeStore::open(dir.path()).unwrap();

        let saved = store
            .save_resume("stu", "cv.pdf", Bytes::from_static(b"x"), Some(ResumeMeta::new()))
            .await
            .unwrap();
        assert!(saved.meta.is_none());

        let value = serde_json::to_value(store.get_resume("stu").await.unwrap()).unwrap();
        assert!(!value.as_object().unwrap().contains_key("meta"));
    }

    #[tokio::test]
    async fn traversal_student_ids_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = LocalResumeStore::open(dir.path()).unwrap();

        for bad in ["..", "a/b", "a\\b", ""] {
            let err = store
                .save_resume(bad, "cv.pdf", Bytes::from_static(b"x"), None)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)), "id {bad:?}");
        }
    }

    #[tokio::test]
    async fn sidecar_is_pretty_printed_and_keyed_by_student() {
        let dir = TempDir::new().unwrap();
        let store = LocalResumeStore::open(dir.path()).unwrap();
        store
            .save_resume("stu", "cv.pdf", Bytes::from_static(b"x"), None)
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join(METADATA_FILE)).unwrap();
        assert!(content.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let row = &value["stu"];
        assert_eq!(row["studentId"], "stu");
        assert_eq!(row["fileName"], "cv.pdf");
        assert!(row["storageKey"].as_str().unwrap().starts_with("stu/"));
        assert!(row.get("meta").is_none());
    }
}
