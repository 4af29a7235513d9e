//! Scripted in-memory generator for pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationCall, LlmError, TextGenerator};
use crate::models::tier::{ModelTier, TierKind};

pub enum Step {
    Reply(String),
    Fail(LlmError),
    /// Replies after sleeping; used with a paused clock.
    Slow(Duration, String),
    /// Never resolves.
    Hang,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub tier: TierKind,
    pub model: String,
    pub call: GenerationCall,
}

/// Plays back one `Step` per `generate` call, in order, and records what was asked.
pub struct ScriptedGenerator {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedCall>>,
    configured: bool,
}

impl ScriptedGenerator {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Step::Reply(r.to_string())).collect())
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tiers_called(&self) -> Vec<TierKind> {
        self.calls().iter().map(|c| c.tier).collect()
    }
}

pub fn transport_failure() -> Step {
    Step::Fail(LlmError::Api {
        status: 503,
        message: "upstream overloaded: backend pool exhausted at 10.0.3.7".to_string(),
    })
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, tier: &ModelTier, call: &GenerationCall) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            tier: tier.kind,
            model: tier.model.clone(),
            call: call.clone(),
        });
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Step::Hang) => std::future::pending().await,
            None => Err(LlmError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }
}
