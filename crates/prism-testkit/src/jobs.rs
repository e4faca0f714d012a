//! Recording job runner.

use std::sync::Mutex;

use async_trait::async_trait;
use prism_core::errors::PrismResult;
use prism_core::traits::{Job, JobOptions, JobRunner, JobStatus};
use serde_json::Value;

/// Job runner that records enqueued jobs without running them.
#[derive(Default)]
pub struct MockJobRunner {
    jobs: Mutex<Vec<(Job, JobOptions)>>,
}

impl MockJobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued(&self) -> Vec<(Job, JobOptions)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobRunner for MockJobRunner {
    async fn enqueue(
        &self,
        job_type: &str,
        payload: Value,
        options: JobOptions,
    ) -> PrismResult<Job> {
        let job = Job {
            id: uuid::Uuid::new_v4().to_string(),
            job_type: job_type.to_string(),
            status: JobStatus::Pending,
            payload,
        };
        self.jobs.lock().unwrap().push((job.clone(), options));
        Ok(job)
    }
}
