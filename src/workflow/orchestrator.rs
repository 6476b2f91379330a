//! Workflow Orchestrator: retry-wrapped planning, concurrent per-file refinement,
//! ordered result assembly.
//!
//! Planning runs sequentially through [`PlanningState`]. Once a plan is accepted (or
//! defaulted), one Refinement Loop per planned change runs concurrently on the
//! current task. Results land in slots indexed by plan position, so output order never
//! depends on completion order. A stop signal (cancellation token or wall-clock
//! timeout) drops the in-flight loops, records them as cancelled failures, and
//! returns the files already complete with `WorkflowResult::cancelled` set.

use crate::config::MemoflowConfig;
use crate::error::{GenerationError, WorkflowError};
use crate::model::{ModelCall, ProviderModelCall};
use crate::workflow::evaluator::QualityEvaluator;
use crate::workflow::normalize::NormalizerMode;
use crate::workflow::planner::PlanGenerator;
use crate::workflow::prompt::{load_format_guide, PromptContext, DEFAULT_FORMAT_GUIDE};
use crate::workflow::refine::RefinementLoop;
use crate::workflow::types::{ChangeType, GeneratedFile, Message, Note, Plan, WorkflowResult};
use crate::workflow::writer::ContentGenerator;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Planning attempts before falling back to the default plan.
pub const MAX_PLAN_ATTEMPTS: usize = 3;

#[derive(Debug)]
enum PlanningState {
    /// About to make planning call number `attempt` (1-based)
    Planning {
        attempt: usize,
        unreachable_only: bool,
        last_error: Option<GenerationError>,
    },
    Planned {
        plan: Plan,
        attempt: usize,
    },
    Defaulted,
    Unreachable {
        attempts: usize,
        error: GenerationError,
    },
}

/// Where the refined plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PlanSource {
    Planned { attempt: usize },
    Defaulted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub cause: String,
}

/// Full account of one run. `result` is what callers persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowReport {
    pub result: WorkflowResult,
    /// Change type of each file in `result.files`, same order
    pub change_types: Vec<ChangeType>,
    /// `None` when the run was stopped before a plan was accepted
    pub plan_source: Option<PlanSource>,
    /// Dropped files in plan order, including those cut off by a stop
    pub failures: Vec<FileFailure>,
}

pub struct Orchestrator {
    planner: PlanGenerator,
    writer: ContentGenerator,
    evaluator: QualityEvaluator,
    normalizer: NormalizerMode,
    format_guide: String,
    timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ModelCall>) -> Self {
        Self {
            planner: PlanGenerator::new(Arc::clone(&model)),
            writer: ContentGenerator::new(Arc::clone(&model)),
            evaluator: QualityEvaluator::new(model),
            normalizer: NormalizerMode::default(),
            format_guide: DEFAULT_FORMAT_GUIDE.to_string(),
            timeout: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: NormalizerMode) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_format_guide(mut self, format_guide: impl Into<String>) -> Self {
        self.format_guide = format_guide.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Provider-backed orchestrator with the configured guide, normalizer, and timeout.
    pub fn from_config(config: &MemoflowConfig) -> Result<Self, WorkflowError> {
        let model = ProviderModelCall::from_config(config)?;
        let format_guide = load_format_guide(config.workflow.format_guide.as_deref())?;
        Ok(Self::new(Arc::new(model))
            .with_normalizer(config.workflow.normalizer)
            .with_format_guide(format_guide)
            .with_timeout(Some(config.timeout())))
    }

    /// Planning only: the accepted or defaulted plan.
    pub async fn plan(
        &self,
        transcript: &[Message],
        notes: &[Note],
    ) -> Result<(Plan, PlanSource), WorkflowError> {
        let context = PromptContext::new(transcript, notes, &self.format_guide);
        self.plan_with_retries(&context).await
    }

    pub async fn run(
        &self,
        transcript: &[Message],
        notes: &[Note],
        cancel: CancellationToken,
    ) -> Result<WorkflowResult, WorkflowError> {
        Ok(self.run_with_report(transcript, notes, cancel).await?.result)
    }

    pub async fn run_with_report(
        &self,
        transcript: &[Message],
        notes: &[Note],
        cancel: CancellationToken,
    ) -> Result<WorkflowReport, WorkflowError> {
        let context = PromptContext::new(transcript, notes, &self.format_guide);
        let stop = stop_signal(cancel, self.timeout);
        tokio::pin!(stop);

        let (plan, plan_source) = tokio::select! {
            biased;
            _ = &mut stop => {
                warn!("Workflow stopped during planning");
                return Ok(WorkflowReport {
                    result: WorkflowResult {
                        files: Vec::new(),
                        cancelled: true,
                    },
                    change_types: Vec::new(),
                    plan_source: None,
                    failures: Vec::new(),
                });
            }
            planned = self.plan_with_retries(&context) => planned?,
        };

        let refinement = RefinementLoop::new(&self.writer, &self.evaluator, self.normalizer);
        let mut slots: Vec<Option<Result<String, GenerationError>>> =
            (0..plan.changes.len()).map(|_| None).collect();
        let mut cancelled = false;

        let mut pending = FuturesUnordered::new();
        for (index, change) in plan.changes.iter().enumerate() {
            let refinement = &refinement;
            let context = &context;
            let plan = &plan;
            pending.push(async move { (index, refinement.run(context, plan, change).await) });
        }

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => {
                    cancelled = true;
                    warn!(in_flight = pending.len(), "Workflow stopped; returning completed files");
                    break;
                }
                next = pending.next() => match next {
                    Some((index, Ok(outcome))) => {
                        let change = &plan.changes[index];
                        info!(
                            path = %change.path,
                            rounds = outcome.exit.rounds(),
                            "File complete"
                        );
                        slots[index] = Some(Ok(outcome.content));
                    }
                    Some((index, Err(error))) => {
                        warn!(path = %plan.changes[index].path, error = %error, "File dropped");
                        slots[index] = Some(Err(error));
                    }
                    None => break,
                },
            }
        }
        drop(pending);

        let mut files = Vec::new();
        let mut change_types = Vec::new();
        let mut failures = Vec::new();
        for (slot, change) in slots.into_iter().zip(&plan.changes) {
            // Only a stop leaves a slot unfilled.
            match slot.unwrap_or(Err(GenerationError::Cancelled)) {
                Ok(content) => {
                    files.push(GeneratedFile::new(change.path.clone(), content));
                    change_types.push(change.change_type);
                }
                Err(error) => failures.push(FileFailure {
                    path: change.path.clone(),
                    cause: error.to_string(),
                }),
            }
        }

        info!(
            files = files.len(),
            failures = failures.len(),
            cancelled,
            "Workflow finished"
        );
        Ok(WorkflowReport {
            result: WorkflowResult { files, cancelled },
            change_types,
            plan_source: Some(plan_source),
            failures,
        })
    }

    async fn plan_with_retries(
        &self,
        context: &PromptContext,
    ) -> Result<(Plan, PlanSource), WorkflowError> {
        let mut state = PlanningState::Planning {
            attempt: 1,
            unreachable_only: true,
            last_error: None,
        };

        loop {
            state = match state {
                PlanningState::Planning {
                    attempt,
                    unreachable_only,
                    last_error,
                } if attempt > MAX_PLAN_ATTEMPTS => match last_error {
                    Some(error) if unreachable_only => PlanningState::Unreachable {
                        attempts: MAX_PLAN_ATTEMPTS,
                        error,
                    },
                    _ => PlanningState::Defaulted,
                },
                PlanningState::Planning {
                    attempt,
                    unreachable_only,
                    ..
                } => match self.planner.generate_plan(context).await {
                    Ok(plan) if !plan.is_empty() => PlanningState::Planned { plan, attempt },
                    Ok(_) => {
                        info!(attempt, "Planner returned no changes");
                        PlanningState::Planning {
                            attempt: attempt + 1,
                            unreachable_only: false,
                            last_error: None,
                        }
                    }
                    Err(error) => {
                        warn!(attempt, error = %error, "Planning attempt failed");
                        PlanningState::Planning {
                            attempt: attempt + 1,
                            unreachable_only: unreachable_only && error.is_unreachable(),
                            last_error: Some(error),
                        }
                    }
                },
                PlanningState::Planned { plan, attempt } => {
                    info!(attempt, changes = plan.changes.len(), "Plan accepted");
                    return Ok((plan, PlanSource::Planned { attempt }));
                }
                PlanningState::Defaulted => {
                    warn!(
                        attempts = MAX_PLAN_ATTEMPTS,
                        "No usable plan; using fallback change"
                    );
                    return Ok((Plan::fallback(), PlanSource::Defaulted));
                }
                PlanningState::Unreachable { attempts, error } => {
                    return Err(WorkflowError::ProviderUnreachable {
                        attempts,
                        source: error,
                    });
                }
            };
        }
    }
}

/// Resolves when the token is cancelled or the timeout elapses.
fn stop_signal(cancel: CancellationToken, timeout: Option<Duration>) -> impl Future<Output = ()> {
    async move {
        match timeout {
            Some(limit) => {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(limit) => info!(?limit, "Workflow timeout elapsed"),
                }
            }
            None => cancel.cancelled().await,
        }
    }
}
