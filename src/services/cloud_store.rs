//! src/services/cloud_store.rs
//!
//! Cloud resume store: blobs in S3, one metadata item per student in
//! DynamoDB. Construction only checks configuration; credentials and
//! connectivity problems surface on first use and at the readiness probe.

use crate::config::AppConfig;
use crate::models::resume::{ResumeMeta, ResumeRecord, StoredResume, normalize_meta};
use crate::services::resume_store::{
    ResumeBackend, ResumeStream, StoreError, StoreResult, ensure_pdf_filename, new_stored_resume,
    storage_key,
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum CloudSetupError {
    #[error("RESUME_BUCKET_NAME is not set")]
    BucketNotConfigured,
}

pub struct CloudResumeStore {
    s3: aws_sdk_s3::Client,
    dynamodb: aws_sdk_dynamodb::Client,
    bucket_name: String,
    table_name: String,
}

impl CloudResumeStore {
    /// Build clients from the ambient AWS environment. Fails only when no
    /// bucket is configured; a misconfigured table or credentials are a
    /// runtime error, not a selection error.
    pub async fn connect(cfg: &AppConfig) -> Result<Self, CloudSetupError> {
        let bucket_name = cfg
            .resume_bucket
            .clone()
            .ok_or(CloudSetupError::BucketNotConfigured)?;

        let aws_cfg = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Ok(Self {
            s3: aws_sdk_s3::Client::new(&aws_cfg),
            dynamodb: aws_sdk_dynamodb::Client::new(&aws_cfg),
            bucket_name,
            table_name: cfg.resume_table.clone(),
        })
    }

    async fn fetch_item(&self, student_id: &str) -> StoreResult<Option<StoredResume>> {
        let output = self
            .dynamodb
            .get_item()
            .table_name(&self.table_name)
            .key("studentId", AttributeValue::S(student_id.to_string()))
            .send()
            .await
            .map_err(|err| {
                error!("failed to read resume metadata for {student_id}: {err}");
                StoreError::StorageAccess("Failed to access resume store.".into())
            })?;
        output.item.map(stored_resume_from_item).transpose()
    }

    /// Readiness probe for the blob side.
    pub async fn check_bucket(&self) -> Result<(), String> {
        self.s3
            .head_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| format!("bucket {} not reachable: {err}", self.bucket_name))
    }

    /// Readiness probe for the metadata side.
    pub async fn check_table(&self) -> Result<(), String> {
        self.dynamodb
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| format!("table {} not reachable: {err}", self.table_name))
    }
}

#[async_trait]
impl ResumeBackend for CloudResumeStore {
    async fn save_resume(
        &self,
        student_id: &str,
        filename: &str,
        content: Bytes,
        meta: Option<ResumeMeta>,
    ) -> StoreResult<ResumeRecord> {
        ensure_pdf_filename(filename)?;
        let item = new_stored_resume(student_id, filename, meta);

        self.s3
            .put_object()
            .bucket(&self.bucket_name)
            .key(&item.storage_key)
            .content_type("application/pdf")
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|err| {
                error!("failed to upload resume blob {}: {err}", item.storage_key);
                StoreError::StorageAccess("Failed to upload resume to storage.".into())
            })?;

        self.dynamodb
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(stored_resume_to_item(&item)))
            .send()
            .await
            .map_err(|err| {
                error!("failed to store resume metadata for {student_id}: {err}");
                StoreError::StorageAccess("Failed to store resume metadata.".into())
            })?;

        Ok(item.to_record())
    }

    async fn get_resume(&self, student_id: &str) -> StoreResult<ResumeRecord> {
        self.fetch_item(student_id)
            .await?
            .map(|item| item.to_record())
            .ok_or_else(|| StoreError::NotFound("Resume not found for this student.".into()))
    }

    async fn get_resume_stream(
        &self,
        student_id: &str,
        stored_filename: &str,
    ) -> StoreResult<ResumeStream> {
        let item = self
            .fetch_item(student_id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Resume not found for this student.".into()))?;

        if item.storage_key != storage_key(student_id, stored_filename) {
            return Err(StoreError::NotFound("Resume file not found.".into()));
        }

        let object = self
            .s3
            .get_object()
            .bucket(&self.bucket_name)
            .key(&item.storage_key)
            .send()
            .await
            .map_err(|err| {
                warn!("resume blob {} missing or unreadable: {err}", item.storage_key);
                StoreError::NotFound("Resume file not found.".into())
            })?;

        Ok(ReaderStream::new(object.body.into_async_read()).boxed())
    }
}

fn stored_resume_to_item(item: &StoredResume) -> HashMap<String, AttributeValue> {
    let mut attrs = HashMap::from([
        (
            "studentId".to_string(),
            AttributeValue::S(item.student_id.clone()),
        ),
        (
            "resumeId".to_string(),
            AttributeValue::S(item.resume_id.clone()),
        ),
        (
            "fileName".to_string(),
            AttributeValue::S(item.file_name.clone()),
        ),
        ("url".to_string(), AttributeValue::S(item.url.clone())),
        (
            "storageKey".to_string(),
            AttributeValue::S(item.storage_key.clone()),
        ),
        (
            "uploadedAt".to_string(),
            AttributeValue::S(item.uploaded_at.to_rfc3339()),
        ),
    ]);
    if let Some(meta) = &item.meta {
        let map = meta
            .iter()
            .map(|(key, value)| (key.clone(), json_to_attr(value)))
            .collect();
        attrs.insert("meta".to_string(), AttributeValue::M(map));
    }
    attrs
}

fn malformed(field: &str) -> StoreError {
    error!("resume metadata item has a missing or malformed `{field}` attribute");
    StoreError::StorageAccess("Failed to access resume store.".into())
}

fn take_string(attrs: &mut HashMap<String, AttributeValue>, name: &str) -> StoreResult<String> {
    match attrs.remove(name) {
        Some(AttributeValue::S(value)) => Ok(value),
        _ => Err(malformed(name)),
    }
}

fn stored_resume_from_item(mut attrs: HashMap<String, AttributeValue>) -> StoreResult<StoredResume> {
    let uploaded_at = DateTime::parse_from_rfc3339(&take_string(&mut attrs, "uploadedAt")?)
        .map_err(|_| malformed("uploadedAt"))?
        .with_timezone(&Utc);
    let meta = match attrs.remove("meta") {
        Some(AttributeValue::M(map)) => normalize_meta(Some(
            map.iter()
                .map(|(key, value)| (key.clone(), attr_to_json(value)))
                .collect(),
        )),
        _ => None,
    };
    Ok(StoredResume {
        student_id: take_string(&mut attrs, "studentId")?,
        resume_id: take_string(&mut attrs, "resumeId")?,
        file_name: take_string(&mut attrs, "fileName")?,
        url: take_string(&mut attrs, "url")?,
        storage_key: take_string(&mut attrs, "storageKey")?,
        uploaded_at,
        meta,
    })
}

fn json_to_attr(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attr).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(key, value)| (key.clone(), json_to_attr(value)))
                .collect(),
        ),
    }
}

fn attr_to_json(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::S(text) => Value::String(text.clone()),
        AttributeValue::N(number) => number
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| number.parse::<f64>().map(Value::from))
            .unwrap_or_else(|_| Value::String(number.clone())),
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(items.iter().map(attr_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), attr_to_json(value)))
                .collect(),
        ),
        other => Value::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> StoredResume {
        let mut meta = ResumeMeta::new();
        meta.insert("source".into(), json!("upload"));
        meta.insert("pages".into(), json!(3));
        meta.insert("score".into(), json!(87.5));
        meta.insert("reviewed".into(), json!(false));
        meta.insert("tags".into(), json!(["backend", "junior"]));
        meta.insert("extra".into(), json!({"lang": "ko", "draft": null}));
        new_stored_resume("20240001", "이력서.pdf", Some(meta))
    }

    #[test]
    fn item_conversion_round_trips() {
        let original = sample_item();
        let restored = stored_resume_from_item(stored_resume_to_item(&original)).unwrap();
        assert_eq!(
            serde_json::to_value(&restored).unwrap(),
            serde_json::to_value(&original).unwrap()
        );
    }

    #[test]
    fn item_keys_follow_the_table_schema() {
        let attrs = stored_resume_to_item(&sample_item());
        for key in ["studentId", "resumeId", "fileName", "url", "storageKey", "uploadedAt", "meta"] {
            assert!(attrs.contains_key(key), "missing attribute {key}");
        }
        assert!(matches!(attrs.get("uploadedAt"), Some(AttributeValue::S(_))));
        assert!(matches!(attrs.get("meta"), Some(AttributeValue::M(_))));
    }

    #[test]
    fn missing_required_attribute_is_a_storage_error() {
        let mut attrs = stored_resume_to_item(&sample_item());
        attrs.remove("fileName");
        assert!(matches!(
            stored_resume_from_item(attrs),
            Err(StoreError::StorageAccess(_))
        ));
    }

    #[test]
    fn malformed_timestamp_is_a_storage_error() {
        let mut attrs = stored_resume_to_item(&sample_item());
        attrs.insert(
            "uploadedAt".to_string(),
            AttributeValue::S("yesterday".to_string()),
        );
        assert!(matches!(
            stored_resume_from_item(attrs),
            Err(StoreError::StorageAccess(_))
        ));
    }

    #[test]
    fn empty_meta_map_loads_as_none() {
        let mut attrs = stored_resume_to_item(&new_stored_resume("stu", "cv.pdf", None));
        attrs.insert("meta".to_string(), AttributeValue::M(HashMap::new()));
        let restored = stored_resume_from_item(attrs).unwrap();
        assert!(restored.meta.is_none());
    }

    #[test]
    fn numbers_come_back_as_integers_when_they_fit() {
        assert_eq!(attr_to_json(&AttributeValue::N("42".into())), json!(42));
        assert_eq!(attr_to_json(&AttributeValue::N("3.5".into())), json!(3.5));
        assert_eq!(
            attr_to_json(&AttributeValue::N("not-a-number".into())),
            json!("not-a-number")
        );
    }

    #[test]
    fn json_scalars_map_onto_matching_attribute_kinds() {
        assert!(matches!(json_to_attr(&json!(null)), AttributeValue::Null(true)));
        assert!(matches!(json_to_attr(&json!(true)), AttributeValue::Bool(true)));
        assert!(matches!(json_to_attr(&json!("x")), AttributeValue::S(_)));
        assert!(matches!(json_to_attr(&json!(7)), AttributeValue::N(_)));
        assert!(matches!(json_to_attr(&json!([1, 2])), AttributeValue::L(_)));
    }
}
