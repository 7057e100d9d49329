use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use async_trait::async_trait;
use log::{error, info};
use tokio::{fs, sync::Mutex};
use uuid::Uuid;

use super::{JobStore, StoreError};
use crate::job::{CompressionJob, JobPatch, TransitionPolicy};

#[derive(Default)]
struct Jobs {
    by_id: HashMap<Uuid, CompressionJob>,
    // insertion order, used for listing and snapshots
    order: Vec<Uuid>,
}

impl Jobs {
    fn ordered(&self) -> Vec<&CompressionJob> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }
}

/// Mutex-guarded job map, optionally mirrored to a JSON snapshot file.
pub struct MemoryJobStore {
    jobs: Mutex<Jobs>,
    snapshot: Option<PathBuf>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Jobs::default()),
            snapshot: None,
        }
    }

    /// Loads jobs from `path` if it exists and writes every change back to it.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let mut jobs = Jobs::default();

        match fs::read(&path).await {
            Ok(bytes) => {
                let records: Vec<CompressionJob> = serde_json::from_slice(&bytes)
                    .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
                for job in records {
                    if jobs.by_id.insert(job.id, job.clone()).is_some() {
                        anyhow::bail!("duplicate job {} in snapshot {}", job.id, path.display());
                    }
                    jobs.order.push(job.id);
                }
                info!("loaded {} jobs from {}", jobs.order.len(), path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no snapshot at {}, starting empty", path.display());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        }

        Ok(Self {
            jobs: Mutex::new(jobs),
            snapshot: Some(path),
        })
    }

    async fn persist(&self, jobs: &Jobs) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        write_snapshot(path, jobs).await.map_err(|e| {
            error!("failed to write snapshot {}: {:#}", path.display(), e);
            StoreError::Internal(e)
        })
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_snapshot(path: &Path, jobs: &Jobs) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(&jobs.ordered())?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: CompressionJob) -> Result<CompressionJob, StoreError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.by_id.contains_key(&job.id) {
            return Err(StoreError::Conflict(job.id));
        }
        jobs.by_id.insert(job.id, job.clone());
        jobs.order.push(job.id);

        if let Err(e) = self.persist(&jobs).await {
            jobs.by_id.remove(&job.id);
            jobs.order.pop();
            return Err(e);
        }
        Ok(job)
    }

    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<CompressionJob>, StoreError> {
        let jobs = self.jobs.lock().await;
        Ok(jobs
            .by_id
            .get(&id)
            .filter(|job| job.user_id == user_id)
            .cloned())
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: &JobPatch,
        policy: TransitionPolicy,
    ) -> Result<CompressionJob, StoreError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.by_id.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(&next) = patch.status.as_present() {
            if !policy.allows(job.status, next) {
                return Err(StoreError::InvalidTransition {
                    from: job.status,
                    to: next,
                });
            }
        }
        let previous = job.clone();
        patch.apply_to(job);
        let updated = job.clone();

        if let Err(e) = self.persist(&jobs).await {
            jobs.by_id.insert(id, previous);
            return Err(e);
        }
        Ok(updated)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CompressionJob>, StoreError> {
        let jobs = self.jobs.lock().await;
        Ok(jobs
            .ordered()
            .into_iter()
            .filter(|job| job.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobStatus, NewJob};

    fn job_for(user: &str) -> CompressionJob {
        CompressionJob::new(user.to_string(), NewJob::default())
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = MemoryJobStore::new();
        let job = store.insert(job_for("alice")).await.unwrap();

        let err = store.insert(job.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(id) if id == job.id));
    }

    #[tokio::test]
    async fn find_is_scoped_to_owner() {
        let store = MemoryJobStore::new();
        let job = store.insert(job_for("alice")).await.unwrap();

        assert_eq!(
            store.find_by_id_and_user(job.id, "alice").await.unwrap(),
            Some(job.clone())
        );
        assert_eq!(store.find_by_id_and_user(job.id, "bob").await.unwrap(), None);
        assert_eq!(
            store
                .find_by_id_and_user(Uuid::new_v4(), "alice")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn update_merges_and_reports_missing_ids() {
        let store = MemoryJobStore::new();
        let job = store.insert(job_for("alice")).await.unwrap();

        let patch = JobPatch {
            status: JobStatus::Processing.into(),
            ..Default::default()
        };
        let updated = store
            .update_by_id(job.id, &patch, TransitionPolicy::Permissive)
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::Processing);
        assert_eq!(updated.created_at, job.created_at);

        let missing = Uuid::new_v4();
        let err = store
            .update_by_id(missing, &patch, TransitionPolicy::Permissive)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn list_keeps_insertion_order_per_user() {
        let store = MemoryJobStore::new();
        let first = store.insert(job_for("alice")).await.unwrap();
        store.insert(job_for("bob")).await.unwrap();
        let second = store.insert(job_for("alice")).await.unwrap();

        let ids: Vec<Uuid> = store
            .list_by_user("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|job| job.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(store.list_by_user("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn strict_transition_is_checked_under_the_lock() {
        let store = MemoryJobStore::new();
        let job = store.insert(job_for("alice")).await.unwrap();

        let to_completed = JobPatch {
            status: JobStatus::Completed.into(),
            ..Default::default()
        };
        let err = store
            .update_by_id(job.id, &to_completed, TransitionPolicy::Strict)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition {
                from: JobStatus::Queued,
                to: JobStatus::Completed
            }
        ));

        let found = store.find_by_id_and_user(job.id, "alice").await.unwrap();
        assert_eq!(found.map(|job| job.status), Some(JobStatus::Queued));
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");

        let store = MemoryJobStore::open(&path).await.unwrap();
        let job = store.insert(job_for("alice")).await.unwrap();
        let patch = JobPatch {
            compressed_size_bytes: 512.into(),
            ..Default::default()
        };
        store
            .update_by_id(job.id, &patch, TransitionPolicy::Permissive)
            .await
            .unwrap();
        drop(store);

        let reopened = MemoryJobStore::open(&path).await.unwrap();
        let jobs = reopened.list_by_user("alice").await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, job.id);
        assert_eq!(jobs[0].compressed_size_bytes, Some(512));
    }

    #[tokio::test]
    async fn failed_snapshot_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        // parent directory does not exist, so every write fails
        let path = dir.path().join("missing").join("jobs.json");

        let store = MemoryJobStore::open(&path).await.unwrap();
        let err = store.insert(job_for("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)));
        assert!(store.list_by_user("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_snapshot_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, b"not json").unwrap();

        assert!(MemoryJobStore::open(&path).await.is_err());
    }
}
