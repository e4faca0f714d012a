/// Errors raised while executing transformations.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("transformation not found: {id}")]
    TransformationNotFound { id: String },

    #[error("daily transformation limit ({limit}) reached for tenant {tenant}")]
    TenantQuotaExceeded { tenant: String, limit: u32 },

    #[error("job runner not configured for async execution")]
    JobRunnerNotConfigured,

    #[error("model invocation failed: {message}")]
    ModelInvocation { message: String },

    #[error("repository error: {message}")]
    Repository { message: String },
}
