use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PrismResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Low,
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub job_type: String,
    pub status: JobStatus,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy)]
pub struct JobOptions {
    pub priority: JobPriority,
    pub retries: u32,
    pub timeout_ms: u64,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            priority: JobPriority::Normal,
            retries: 3,
            timeout_ms: 120_000,
        }
    }
}

/// Queue for deferred transformation execution.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn enqueue(&self, job_type: &str, payload: Value, options: JobOptions)
        -> PrismResult<Job>;
}
