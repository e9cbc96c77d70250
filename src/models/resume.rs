//! Resume records as stored by the backends and as returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form attributes attached to a resume by the caller (upload source
/// tag, form-entered fields). Opaque to storage, passed through unchanged.
pub type ResumeMeta = serde_json::Map<String, serde_json::Value>;

/// The normalized resume shape returned by every backend.
///
/// `url` is derived from the student id and the server-generated stored
/// filename; it is never client-supplied.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    /// Opaque unique identifier, generated at save time.
    pub resume_id: String,

    /// Original client-supplied filename, preserved verbatim for display.
    pub file_name: String,

    /// Download path embedding the stored filename.
    pub url: String,

    /// Caller-supplied attributes; omitted from the JSON when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResumeMeta>,
}

/// Internal per-student record, a superset of [`ResumeRecord`].
///
/// One record per student: a new save fully replaces the previous one.
/// This is also the row shape of the local backend's metadata sidecar.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StoredResume {
    /// Partition key.
    pub student_id: String,

    pub resume_id: String,

    pub file_name: String,

    pub url: String,

    /// Backend-internal location, always `"{studentId}/{storedFileName}"`.
    pub storage_key: String,

    /// Set once at save time.
    pub uploaded_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResumeMeta>,
}

impl StoredResume {
    /// Server-generated blob filename, `"{resumeId}.pdf"`.
    pub fn stored_file_name(&self) -> String {
        format!("{}.pdf", self.resume_id)
    }

    /// Project the record down to the externally-visible shape.
    pub fn to_record(&self) -> ResumeRecord {
        ResumeRecord {
            resume_id: self.resume_id.clone(),
            file_name: self.file_name.clone(),
            url: self.url.clone(),
            meta: self.meta.clone(),
        }
    }
}

/// Collapse an empty meta map to `None` so records never carry an empty
/// object.
pub fn normalize_meta(meta: Option<ResumeMeta>) -> Option<ResumeMeta> {
    meta.filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(meta: Option<ResumeMeta>) -> StoredResume {
        StoredResume {
            student_id: "s-1".into(),
            resume_id: "abc123".into(),
            file_name: "cv.pdf".into(),
            url: "/api/resume-files/s-1/abc123.pdf".into(),
            storage_key: "s-1/abc123.pdf".into(),
            uploaded_at: Utc::now(),
            meta,
        }
    }

    #[test]
    fn empty_meta_is_normalized_away() {
        assert!(normalize_meta(None).is_none());
        assert!(normalize_meta(Some(ResumeMeta::new())).is_none());

        let mut meta = ResumeMeta::new();
        meta.insert("source".into(), json!("upload"));
        assert!(normalize_meta(Some(meta)).is_some());
    }

    #[test]
    fn record_json_omits_absent_meta() {
        let record = sample(None).to_record();
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("meta"));
        assert_eq!(object["resumeId"], json!("abc123"));
        assert_eq!(object["fileName"], json!("cv.pdf"));
        assert_eq!(object["url"], json!("/api/resume-files/s-1/abc123.pdf"));
    }

    #[test]
    fn record_json_carries_meta_when_present() {
        let mut meta = ResumeMeta::new();
        meta.insert("source".into(), json!("write"));
        let record = sample(Some(meta)).to_record();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["meta"]["source"], json!("write"));
    }

    #[test]
    fn stored_file_name_is_derived_from_resume_id() {
        assert_eq!(sample(None).stored_file_name(), "abc123.pdf");
    }

    #[test]
    fn sidecar_row_round_trips_through_json() {
        let mut meta = ResumeMeta::new();
        meta.insert("grade".into(), json!("3학년"));
        let row = sample(Some(meta));

        let text = serde_json::to_string_pretty(&row).unwrap();
        let back: StoredResume = serde_json::from_str(&text).unwrap();
        assert_eq!(back.student_id, row.student_id);
        assert_eq!(back.storage_key, row.storage_key);
        assert_eq!(back.uploaded_at, row.uploaded_at);
        assert_eq!(back.meta, row.meta);
    }
}
