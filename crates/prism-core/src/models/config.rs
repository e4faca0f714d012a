use serde::{Deserialize, Serialize};

use super::tenant::TenantId;

/// Per-tenant quota and behavior settings.
///
/// `daily_used` is read before each execution to gate quota. The check is a
/// plain read-then-compare in this core; the increment is owned by the
/// storage layer (see `TransformationConfigRepository::increment_daily_usage`),
/// which is where atomic check-and-increment belongs if hard quotas are
/// required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConfig {
    pub tenant_id: TenantId,
    pub daily_limit: u32,
    pub daily_used: u32,
    pub max_concurrent: u32,
    pub auto_generate_insights: bool,
}

impl TransformationConfig {
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            daily_limit: 1000,
            daily_used: 0,
            max_concurrent: 5,
            auto_generate_insights: true,
        }
    }

    pub fn is_over_limit(&self) -> bool {
        self.daily_used >= self.daily_limit
    }

    pub fn remaining_today(&self) -> u32 {
        self.daily_limit.saturating_sub(self.daily_used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_boundary_counts_as_over() {
        let mut config = TransformationConfig::for_tenant(TenantId::from("t1"));
        config.daily_limit = 10;
        config.daily_used = 9;
        assert!(!config.is_over_limit());
        config.daily_used = 10;
        assert!(config.is_over_limit());
        assert_eq!(config.remaining_today(), 0);
    }
}
