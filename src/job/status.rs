use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs are not expected to be processed any further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// How `update` treats a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any status may follow any other.
    #[default]
    Permissive,
    /// Only queued -> processing -> {completed, failed}, plus queued -> failed.
    Strict,
}

impl TransitionPolicy {
    pub fn allows(&self, from: JobStatus, to: JobStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => {
                from == to
                    || matches!(
                        (from, to),
                        (JobStatus::Queued, JobStatus::Processing)
                            | (JobStatus::Queued, JobStatus::Failed)
                            | (JobStatus::Processing, JobStatus::Completed)
                            | (JobStatus::Processing, JobStatus::Failed)
                    )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn status_uses_lowercase_wire_names() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(JobStatus::from_str("failed").unwrap(), JobStatus::Failed);
        assert_eq!(JobStatus::Completed.to_string(), "completed");
        assert!(serde_json::from_str::<JobStatus>("\"archived\"").is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn permissive_allows_everything() {
        let policy = TransitionPolicy::Permissive;
        assert!(policy.allows(JobStatus::Completed, JobStatus::Queued));
        assert!(policy.allows(JobStatus::Failed, JobStatus::Processing));
    }

    #[test]
    fn strict_follows_the_lifecycle() {
        let policy = TransitionPolicy::Strict;
        assert!(policy.allows(JobStatus::Queued, JobStatus::Processing));
        assert!(policy.allows(JobStatus::Processing, JobStatus::Completed));
        assert!(policy.allows(JobStatus::Processing, JobStatus::Failed));
        assert!(policy.allows(JobStatus::Queued, JobStatus::Failed));
        assert!(policy.allows(JobStatus::Completed, JobStatus::Completed));

        assert!(!policy.allows(JobStatus::Queued, JobStatus::Completed));
        assert!(!policy.allows(JobStatus::Completed, JobStatus::Processing));
        assert!(!policy.allows(JobStatus::Failed, JobStatus::Queued));
    }
}
