//! Hybrid Orchestrator — explicit state machine over the tier ladder.
//!
//! Idle → Attempt(fast) → Validate(fast) → { Success | Attempt(robust) }
//!      → Validate(robust) → { Success | TerminalFailure }
//!
//! Rules:
//! - The fast tier is always tried first. Tiers run sequentially, never raced.
//! - Any fast-tier failure (transport, empty text, parse, incomplete, timeout)
//!   escalates to the next rung. There is no same-tier retry.
//! - A failure on the last rung is terminal.
//! - A missing credential is terminal before any call is made.
//! - Every attempt is bounded by the per-attempt deadline AND by what is left
//!   of the pipeline deadline that spans all rungs.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::generation::decoder::{decode, ParseError};
use crate::llm_client::{GenerationCall, LlmError, TextGenerator};
use crate::models::tier::{ModelTier, TierKind, TierLadder};
use crate::schema::Shape;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Incomplete result, missing: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),

    #[error("Generation service is not configured")]
    Configuration,

    #[error("Attempt timed out after {0}ms")]
    Timeout(u64),

    #[error("Pipeline deadline exhausted before the attempt could start")]
    DeadlineExhausted,
}

impl PipelineError {
    /// Whether a failure on a non-final rung moves on to the next rung.
    pub fn escalates(&self) -> bool {
        !matches!(
            self,
            PipelineError::Configuration | PipelineError::DeadlineExhausted
        )
    }
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => PipelineError::Configuration,
            other => PipelineError::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub per_attempt: Duration,
    pub total: Duration,
}

/// Observable FSM phases, recorded in order for every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Attempt(TierKind),
    Validate(TierKind),
    Success,
    TerminalFailure,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Attempt(TierKind::Fast) => write!(f, "AttemptFast"),
            Phase::Attempt(TierKind::Robust) => write!(f, "AttemptRobust"),
            Phase::Validate(TierKind::Fast) => write!(f, "ValidateFast"),
            Phase::Validate(TierKind::Robust) => write!(f, "ValidateRobust"),
            Phase::Success => write!(f, "Success"),
            Phase::TerminalFailure => write!(f, "TerminalFailure"),
        }
    }
}

/// An accepted result.
#[derive(Debug, Clone)]
pub struct Served {
    /// Decoded and shape-normalized.
    pub value: Value,
    pub tier: ModelTier,
    /// Wall-clock time of the serving attempt.
    pub latency: Duration,
}

#[derive(Debug)]
pub struct Orchestration {
    pub result: Result<Served, PipelineError>,
    pub trace: Vec<Phase>,
    pub total_latency: Duration,
}

enum State {
    Idle,
    Attempt {
        rung: usize,
    },
    Validate {
        rung: usize,
        raw: String,
        latency: Duration,
    },
    Escalate {
        rung: usize,
        cause: PipelineError,
    },
    Success(Served),
    Failed(PipelineError),
}

pub struct Orchestrator<'a> {
    generator: &'a dyn TextGenerator,
    ladder: &'a TierLadder,
    deadlines: Deadlines,
}

impl<'a> Orchestrator<'a> {
    pub fn new(generator: &'a dyn TextGenerator, ladder: &'a TierLadder, deadlines: Deadlines) -> Self {
        Self {
            generator,
            ladder,
            deadlines,
        }
    }

    /// Drives one call through the ladder until it is served or terminally failed.
    pub async fn run(&self, call: &GenerationCall, shape: &Shape, request_id: Uuid) -> Orchestration {
        let rungs = self.ladder.rungs();
        let started = Instant::now();
        let deadline = started + self.deadlines.total;
        let mut trace = Vec::new();
        let mut state = State::Idle;

        loop {
            state = match state {
                State::Idle => {
                    trace.push(Phase::Idle);
                    if self.generator.is_configured() && !rungs.is_empty() {
                        State::Attempt { rung: 0 }
                    } else {
                        State::Failed(PipelineError::Configuration)
                    }
                }

                State::Attempt { rung } => {
                    let tier = &rungs[rung];
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        State::Failed(PipelineError::DeadlineExhausted)
                    } else {
                        trace.push(Phase::Attempt(tier.kind));
                        debug!(%request_id, shape = shape.kind.as_str(), model = %tier.model, "{}", Phase::Attempt(tier.kind));

                        let budget = self.deadlines.per_attempt.min(remaining);
                        let attempt_started = Instant::now();
                        match timeout(budget, self.generator.generate(tier, call)).await {
                            Ok(Ok(raw)) => State::Validate {
                                rung,
                                raw,
                                latency: attempt_started.elapsed(),
                            },
                            Ok(Err(err)) => State::Escalate {
                                rung,
                                cause: err.into(),
                            },
                            Err(_) => State::Escalate {
                                rung,
                                cause: PipelineError::Timeout(budget.as_millis() as u64),
                            },
                        }
                    }
                }

                State::Validate { rung, raw, latency } => {
                    let tier = &rungs[rung];
                    trace.push(Phase::Validate(tier.kind));
                    match validate(&raw, shape) {
                        Ok(value) => State::Success(Served {
                            value,
                            tier: tier.clone(),
                            latency,
                        }),
                        Err(cause) => State::Escalate { rung, cause },
                    }
                }

                State::Escalate { rung, cause } => {
                    let next = rung + 1;
                    if cause.escalates() && next < rungs.len() {
                        warn!(
                            %request_id,
                            "{} tier failed: {cause}. Switching to {} tier ({})",
                            tier_label(rungs[rung].kind),
                            tier_label(rungs[next].kind),
                            rungs[next].model
                        );
                        State::Attempt { rung: next }
                    } else {
                        State::Failed(cause)
                    }
                }

                State::Success(served) => {
                    trace.push(Phase::Success);
                    let total_latency = started.elapsed();
                    info!(
                        %request_id,
                        shape = shape.kind.as_str(),
                        "Served by {} tier ({}) in {}ms (total {}ms)",
                        tier_label(served.tier.kind),
                        served.tier.model,
                        served.latency.as_millis(),
                        total_latency.as_millis()
                    );
                    return Orchestration {
                        result: Ok(served),
                        trace,
                        total_latency,
                    };
                }

                State::Failed(cause) => {
                    trace.push(Phase::TerminalFailure);
                    let total_latency = started.elapsed();
                    error!(
                        %request_id,
                        shape = shape.kind.as_str(),
                        "Generation failed terminally after {}ms: {cause}",
                        total_latency.as_millis()
                    );
                    return Orchestration {
                        result: Err(cause),
                        trace,
                        total_latency,
                    };
                }
            };
        }
    }
}

/// Empty-text check, decode, normalization against the shape, then the completeness predicate.
pub fn validate(raw: &str, shape: &Shape) -> Result<Value, PipelineError> {
    if raw.trim().is_empty() {
        return Err(PipelineError::EmptyResponse);
    }
    let decoded = decode(raw)?;
    let value = shape.normalize(&decoded);
    let missing = shape.missing(&value);
    if !missing.is_empty() {
        return Err(PipelineError::Incomplete(missing));
    }
    Ok(value)
}

fn tier_label(kind: TierKind) -> &'static str {
    match kind {
        TierKind::Fast => "Fast",
        TierKind::Robust => "Robust",
    }
}
