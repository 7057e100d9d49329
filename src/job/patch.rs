use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::{status::JobStatus, CompressionJob};

/// A patch field that tells "not sent" apart from "sent with a value".
///
/// A key missing from the request body deserializes to `Missing` (via
/// `#[serde(default)]`); an explicit `null` is rejected because clearing a
/// field is not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    #[default]
    Missing,
    Present(T),
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Missing => None,
        }
    }
}

impl<T: Clone> Field<T> {
    fn overwrite(&self, target: &mut Option<T>) {
        if let Field::Present(value) = self {
            *target = Some(value.clone());
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Present(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Field::Present)
    }
}

/// The mutable subset of a job. `id`, `userId` and `createdAt` are not here on purpose.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobPatch {
    pub output_file_name: Field<String>,
    pub output_file_url: Field<String>,
    pub algorithm: Field<String>,
    pub level: Field<String>,
    pub settings_json: Field<String>,
    pub original_size_bytes: Field<u64>,
    pub compressed_size_bytes: Field<u64>,
    pub status: Field<JobStatus>,
    pub error_message: Field<String>,
    pub completed_at: Field<DateTime<Utc>>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        !(self.output_file_name.is_present()
            || self.output_file_url.is_present()
            || self.algorithm.is_present()
            || self.level.is_present()
            || self.settings_json.is_present()
            || self.original_size_bytes.is_present()
            || self.compressed_size_bytes.is_present()
            || self.status.is_present()
            || self.error_message.is_present()
            || self.completed_at.is_present())
    }

    pub fn apply_to(&self, job: &mut CompressionJob) {
        self.output_file_name.overwrite(&mut job.output_file_name);
        self.output_file_url.overwrite(&mut job.output_file_url);
        self.algorithm.overwrite(&mut job.algorithm);
        self.level.overwrite(&mut job.level);
        self.settings_json.overwrite(&mut job.settings_json);
        self.original_size_bytes
            .overwrite(&mut job.original_size_bytes);
        self.compressed_size_bytes
            .overwrite(&mut job.compressed_size_bytes);
        if let Field::Present(status) = self.status {
            job.status = status;
        }
        self.error_message.overwrite(&mut job.error_message);
        self.completed_at.overwrite(&mut job.completed_at);
    }
}
