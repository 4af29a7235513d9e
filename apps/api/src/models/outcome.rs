use serde::Serialize;
use uuid::Uuid;

use crate::models::tier::{CostClass, TierKind};

/// Performance/cost descriptor of a served result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingStats {
    pub tier: TierKind,
    pub model_used: String,
    pub cost_tier: CostClass,
    /// Wall-clock time of the attempt that produced the result.
    pub latency_ms: u64,
    /// Whole invocation, including a failed fast attempt.
    pub total_latency_ms: u64,
}

/// Terminal result of one pipeline invocation. Exactly one of `data` / `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome<T> {
    /// Correlates the outcome with the invocation's log lines.
    pub request_id: Uuid,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProcessingStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> AnalysisOutcome<T> {
    pub fn success(request_id: Uuid, data: T, stats: ProcessingStats) -> Self {
        Self {
            request_id,
            data: Some(data),
            stats: Some(stats),
            error: None,
        }
    }

    pub fn failure(request_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            request_id,
            data: None,
            stats: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    pub fn latency_ms(&self) -> u64 {
        self.stats.as_ref().map(|s| s.latency_ms).unwrap_or(0)
    }

    pub fn tier_used(&self) -> Option<TierKind> {
        self.stats.as_ref().map(|s| s.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_outcome_serializes_without_stats() {
        let outcome: AnalysisOutcome<String> = AnalysisOutcome::failure(Uuid::new_v4(), "nope");
        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value["data"].is_null());
        assert_eq!(value["error"], "nope");
        assert!(value.get("stats").is_none());
        assert_eq!(outcome.latency_ms(), 0);
        assert!(outcome.tier_used().is_none());
    }

    #[test]
    fn test_success_outcome_has_no_error() {
        let stats = ProcessingStats {
            tier: TierKind::Robust,
            model_used: "pro".to_string(),
            cost_tier: CostClass::High,
            latency_ms: 40,
            total_latency_ms: 75,
        };
        let outcome = AnalysisOutcome::success(Uuid::new_v4(), 7u32, stats);
        assert!(outcome.is_success());
        assert!(outcome.error.is_none());
        assert_eq!(outcome.tier_used(), Some(TierKind::Robust));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["stats"]["tier"], "robust");
        assert_eq!(value["stats"]["cost_tier"], "High");
    }
}
