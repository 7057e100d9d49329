pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::job::{CompressionJob, JobPatch, JobStatus, TransitionPolicy};

pub use memory::MemoryJobStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    Conflict(Uuid),
    #[error("job {0} not found")]
    NotFound(Uuid),
    #[error("cannot move a job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("storage failure: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Keyed storage for compression jobs.
///
/// Ownership is enforced by `find_by_id_and_user`; `update_by_id` is keyed by
/// id alone and must only be called after that lookup succeeded.
///
/// `update_by_id` checks a status change against `policy` atomically with the
/// write, so concurrent updates cannot slip an illegal transition through.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: CompressionJob) -> Result<CompressionJob, StoreError>;

    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<CompressionJob>, StoreError>;

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: &JobPatch,
        policy: TransitionPolicy,
    ) -> Result<CompressionJob, StoreError>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CompressionJob>, StoreError>;
}
