//! Notification sink — fire-and-forget webhook events after a served parse.
//!
//! Only counts and pipeline metadata leave the process. Delivery failures are
//! logged and never reach the caller.

use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::outcome::AnalysisOutcome;
use crate::models::resume::ParsedFormData;
use crate::models::tier::TierKind;

pub const PARSE_COMPLETED: &str = "resume.parse.completed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotifyEvent {
    pub event: &'static str,
    pub request_id: Uuid,
    pub detected_language: String,
    pub experience_count: usize,
    pub education_count: usize,
    pub certification_count: usize,
    pub has_job_match: bool,
    pub tier: Option<TierKind>,
    pub latency_ms: u64,
    pub timestamp: String,
}

impl NotifyEvent {
    /// None for failed outcomes; only served parses are reported.
    pub fn parse_completed(outcome: &AnalysisOutcome<ParsedFormData>) -> Option<Self> {
        let data = outcome.data.as_ref()?;
        Some(Self {
            event: PARSE_COMPLETED,
            request_id: outcome.request_id,
            detected_language: data.detected_language.as_str().to_string(),
            experience_count: data.experience.len(),
            education_count: data.education.len(),
            certification_count: data.certifications.len(),
            has_job_match: data.job_match.is_some(),
            tier: outcome.tier_used(),
            latency_ms: outcome.latency_ms(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// Posts events to a configured URL. Disabled (a no-op) when no URL is set.
#[derive(Clone, Default)]
pub struct WebhookNotifier {
    http: Client,
    url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Sends on a detached task and returns immediately.
    pub fn notify(&self, event: NotifyEvent) {
        let Some(url) = self.url.clone() else {
            return;
        };
        let http = self.http.clone();
        tokio::spawn(async move {
            let request_id = event.request_id;
            let result = http
                .post(&url)
                .json(&event)
                .send()
                .await
                .and_then(|response| response.error_for_status());
            match result {
                Ok(_) => debug!(%request_id, "Notification delivered: {}", event.event),
                Err(e) => warn!(%request_id, "Notification delivery failed: {e}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outcome::ProcessingStats;
    use crate::models::resume::{FormExperience, JobMatch};
    use crate::models::tier::CostClass;

    fn served_outcome() -> AnalysisOutcome<ParsedFormData> {
        let data = ParsedFormData {
            experience: vec![FormExperience::default(), FormExperience::default()],
            job_match: Some(JobMatch::default()),
            ..Default::default()
        };
        AnalysisOutcome::success(
            Uuid::new_v4(),
            data,
            ProcessingStats {
                tier: TierKind::Fast,
                model_used: "flash".to_string(),
                cost_tier: CostClass::Low,
                latency_ms: 1200,
                total_latency_ms: 1200,
            },
        )
    }

    #[test]
    fn test_event_carries_counts_not_content() {
        let outcome = served_outcome();
        let event = NotifyEvent::parse_completed(&outcome).unwrap();

        assert_eq!(event.event, PARSE_COMPLETED);
        assert_eq!(event.request_id, outcome.request_id);
        assert_eq!(event.experience_count, 2);
        assert!(event.has_job_match);
        assert_eq!(event.tier, Some(TierKind::Fast));
        assert_eq!(event.latency_ms, 1200);

        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("basicInfo").is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&event.timestamp).is_ok());
    }

    #[test]
    fn test_failed_outcome_produces_no_event() {
        let outcome: AnalysisOutcome<ParsedFormData> = AnalysisOutcome::failure(Uuid::new_v4(), "failed");
        assert!(NotifyEvent::parse_completed(&outcome).is_none());
    }

    #[tokio::test]
    async fn test_disabled_notifier_is_a_noop() {
        let notifier = WebhookNotifier::new(None);
        assert!(!notifier.is_enabled());
        notifier.notify(NotifyEvent::parse_completed(&served_outcome()).unwrap());
    }
}
