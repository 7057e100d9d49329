use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::JobStatus;

/// One tracked compression request. This is also the persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionJob {
    pub id: Uuid,
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_url: Option<String>,

    // "zip", "gzip", "brotli", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    // "fast", "balanced", "max"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_json: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed_size_bytes: Option<u64>,

    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Create input. Identity, ownership and creation time are never taken from here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewJob {
    pub input_file_name: Option<String>,
    pub input_file_url: Option<String>,
    pub output_file_name: Option<String>,
    pub output_file_url: Option<String>,
    pub algorithm: Option<String>,
    pub level: Option<String>,
    pub settings_json: Option<String>,
    pub original_size_bytes: Option<u64>,
    pub compressed_size_bytes: Option<u64>,
    pub status: Option<JobStatus>,
    pub error_message: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompressionJob {
    pub fn new(user_id: String, input: NewJob) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            input_file_name: input.input_file_name,
            input_file_url: input.input_file_url,
            output_file_name: input.output_file_name,
            output_file_url: input.output_file_url,
            algorithm: input.algorithm,
            level: input.level,
            settings_json: input.settings_json,
            original_size_bytes: input.original_size_bytes,
            compressed_size_bytes: input.compressed_size_bytes,
            status: input.status.unwrap_or_default(),
            error_message: input.error_message,
            created_at: Utc::now(),
            completed_at: input.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_defaults_to_queued() {
        let started = Utc::now();
        let job = CompressionJob::new("user-1".to_string(), NewJob::default());

        assert_eq!(job.user_id, "user-1");
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.created_at >= started);
        assert!(job.algorithm.is_none());
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn create_input_ignores_identity_fields() {
        let input: NewJob = serde_json::from_str(
            r#"{"id":"x","userId":"mallory","createdAt":"2001-01-01T00:00:00Z","algorithm":"brotli"}"#,
        )
        .unwrap();
        let job = CompressionJob::new("alice".to_string(), input);

        assert_eq!(job.user_id, "alice");
        assert_eq!(job.algorithm.as_deref(), Some("brotli"));
        assert_ne!(job.created_at.to_rfc3339(), "2001-01-01T00:00:00+00:00");
    }

    #[test]
    fn serializes_camel_case_and_omits_absent_fields() {
        let job = CompressionJob::new(
            "user-1".to_string(),
            NewJob {
                original_size_bytes: Some(2048),
                ..Default::default()
            },
        );
        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(value["userId"], "user-1");
        assert_eq!(value["originalSizeBytes"], 2048);
        assert_eq!(value["status"], "queued");
        assert!(value.get("outputFileUrl").is_none());
        assert!(value.get("createdAt").is_some());
    }
}
