use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    job::{CompressionJob, JobPatch, NewJob, TransitionPolicy},
    store::{JobStore, StoreError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
}

/// Per-call context. The caller's identity is resolved outside the service.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<UserIdentity>,
}

#[cfg(test)]
impl RequestContext {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn for_user(id: impl Into<String>) -> Self {
        Self {
            user: Some(UserIdentity { id: id.into() }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("You must be signed in to perform this action.")]
    Unauthorized,
    #[error("{0}")]
    InvalidInput(String),
    // same message whether the job is missing or owned by someone else
    #[error("Compression job not found.")]
    NotFound,
    #[error("Compression job already exists.")]
    Conflict,
    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => ServiceError::Conflict,
            StoreError::NotFound(_) => ServiceError::NotFound,
            StoreError::InvalidTransition { from, to } => {
                ServiceError::InvalidInput(format!("Cannot move a job from {} to {}.", from, to))
            }
            StoreError::Internal(e) => ServiceError::Internal(e),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateJob {
    pub id: String,
    pub patch: JobPatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobList {
    pub items: Vec<CompressionJob>,
    pub total: usize,
}

pub fn require_user(context: &RequestContext) -> Result<&UserIdentity, ServiceError> {
    context.user.as_ref().ok_or(ServiceError::Unauthorized)
}

/// The only code path allowed to mutate the job store.
#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn JobStore>,
    policy: TransitionPolicy,
}

impl JobService {
    pub fn new(store: Arc<dyn JobStore>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(
        &self,
        input: NewJob,
        context: &RequestContext,
    ) -> Result<CompressionJob, ServiceError> {
        let user = require_user(context)?;
        let job = self
            .store
            .insert(CompressionJob::new(user.id.clone(), input))
            .await?;
        info!("created job {} for {} ({})", job.id, user.id, job.status);
        Ok(job)
    }

    pub async fn update(
        &self,
        input: UpdateJob,
        context: &RequestContext,
    ) -> Result<CompressionJob, ServiceError> {
        if input.id.is_empty() {
            return Err(ServiceError::InvalidInput("id must not be empty.".to_string()));
        }
        if input.patch.is_empty() {
            return Err(ServiceError::InvalidInput(
                "At least one field must be provided to update.".to_string(),
            ));
        }
        let user = require_user(context)?;
        let id = Uuid::parse_str(&input.id).map_err(|_| ServiceError::NotFound)?;

        if self.store.find_by_id_and_user(id, &user.id).await?.is_none() {
            warn!("job {} not found for {}", id, user.id);
            return Err(ServiceError::NotFound);
        }

        let job = self
            .store
            .update_by_id(id, &input.patch, self.policy)
            .await?;
        info!("updated job {} ({})", job.id, job.status);
        if job.status.is_terminal() && job.completed_at.is_none() {
            warn!("job {} is {} without a completedAt", job.id, job.status);
        }
        Ok(job)
    }

    pub async fn list(&self, context: &RequestContext) -> Result<JobList, ServiceError> {
        let user = require_user(context)?;
        let items = self.store.list_by_user(&user.id).await?;
        Ok(JobList {
            total: items.len(),
            items,
        })
    }

    pub async fn get(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> Result<CompressionJob, ServiceError> {
        let user = require_user(context)?;
        let id = Uuid::parse_str(id).map_err(|_| ServiceError::NotFound)?;
        self.store
            .find_by_id_and_user(id, &user.id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}
