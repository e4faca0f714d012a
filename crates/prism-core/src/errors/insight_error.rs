/// Errors raised by the insight lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("insight not found: {id}")]
    InsightNotFound { id: String },

    #[error("insight {id} does not belong to tenant {tenant}")]
    TenantMismatch { id: String, tenant: String },
}
