use serde::{Deserialize, Serialize};

/// Request quota of a provider plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum UsageLimit {
    Limited(u64),
    Unlimited,
}

/// Read-only snapshot of a provider's quota consumption.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageData {
    pub used: u64,
    pub limit: UsageLimit,
    /// `used / limit`, clamped to `[0, 1]`; always `0` for unlimited plans.
    pub utilization: f64,
    pub plan: String,
}

impl UsageData {
    pub fn new(used: u64, limit: UsageLimit, plan: impl Into<String>) -> Self {
        let utilization = match limit {
            UsageLimit::Limited(0) => 1.0,
            UsageLimit::Limited(max) => (used as f64 / max as f64).clamp(0.0, 1.0),
            UsageLimit::Unlimited => 0.0,
        };

        Self {
            used,
            limit,
            utilization,
            plan: plan.into(),
        }
    }

    /// Snapshot for a provider that cannot report consumption: nothing used yet.
    pub fn unmetered(limit: UsageLimit, plan: impl Into<String>) -> Self {
        Self::new(0, limit, plan)
    }

    pub fn remaining(&self) -> Option<u64> {
        match self.limit {
            UsageLimit::Limited(max) => Some(max.saturating_sub(self.used)),
            UsageLimit::Unlimited => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization_is_ratio() {
        let usage = UsageData::new(125, UsageLimit::Limited(500), "free");
        assert_eq!(usage.utilization, 0.25);
        assert_eq!(usage.remaining(), Some(375));
    }

    #[test]
    fn test_utilization_clamped_when_over_quota() {
        let usage = UsageData::new(30, UsageLimit::Limited(25), "demo");
        assert_eq!(usage.utilization, 1.0);
        assert_eq!(usage.remaining(), Some(0));
    }

    #[test]
    fn test_unlimited_usage() {
        let usage = UsageData::unmetered(UsageLimit::Unlimited, "free");
        assert_eq!(usage.used, 0);
        assert_eq!(usage.utilization, 0.0);
        assert_eq!(usage.remaining(), None);
    }

    #[test]
    fn test_usage_limit_serialization() {
        let json = serde_json::to_value(UsageLimit::Limited(25)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "limited", "value": 25}));
        let json = serde_json::to_value(UsageLimit::Unlimited).unwrap();
        assert_eq!(json, serde_json::json!({"type": "unlimited"}));
    }
}
