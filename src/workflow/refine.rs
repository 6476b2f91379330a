//! Refinement Loop: bounded generate → evaluate → revise cycle for one planned file,
//! followed by exactly one normalization pass.
//!
//! The loop is driven by [`Round`], a small state machine: the caller asks it for the
//! next [`Step`], performs the model call, and feeds the result back. The cap and the
//! convergence predicate live entirely in `Round`, so they can be tested without a model.

use crate::error::GenerationError;
use crate::workflow::evaluator::QualityEvaluator;
use crate::workflow::normalize::{strip_wrapping_fence, NormalizerMode};
use crate::workflow::prompt::PromptContext;
use crate::workflow::types::{Plan, PlannedChange, QualityVerdict};
use crate::workflow::writer::{ContentGenerator, Revision};
use tracing::{debug, info, info_span, Instrument};

/// Maximum quality-feedback rounds per file.
pub const MAX_ITERATIONS: usize = 3;

/// How the feedback rounds ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// A verdict met every rubric predicate in round `rounds`
    Converged { rounds: usize },
    /// `rounds` evaluations ran without convergence
    Exhausted { rounds: usize },
}

impl Exit {
    pub fn rounds(self) -> usize {
        match self {
            Exit::Converged { rounds } | Exit::Exhausted { rounds } => rounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Evaluate,
    Revise { feedback: Vec<String> },
    Finished(Exit),
}

/// One round of the loop: 1-based index, the current document, and its verdict once known.
#[derive(Debug, Clone)]
pub struct Round {
    index: usize,
    current: String,
    verdict: Option<QualityVerdict>,
}

impl Round {
    /// First round, holding the initial generation.
    pub fn start(initial: String) -> Self {
        Self {
            index: 1,
            current: initial,
            verdict: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn verdict(&self) -> Option<&QualityVerdict> {
        self.verdict.as_ref()
    }

    pub fn next_step(&self) -> Step {
        match &self.verdict {
            None if self.index > MAX_ITERATIONS => Step::Finished(Exit::Exhausted {
                rounds: MAX_ITERATIONS,
            }),
            None => Step::Evaluate,
            Some(verdict) if verdict.converged() => Step::Finished(Exit::Converged {
                rounds: self.index,
            }),
            Some(verdict) => Step::Revise {
                feedback: verdict.feedback(),
            },
        }
    }

    pub fn record(&mut self, verdict: QualityVerdict) {
        self.verdict = Some(verdict);
    }

    /// Replace the document with its revision and move to the next round.
    pub fn advance(&mut self, revised: String) {
        self.current = revised;
        self.verdict = None;
        self.index += 1;
    }

    pub fn into_content(self) -> String {
        self.current
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementOutcome {
    pub content: String,
    pub exit: Exit,
}

/// Runs the loop for one planned change. Borrowed per file; owns no state across files.
pub struct RefinementLoop<'a> {
    writer: &'a ContentGenerator,
    evaluator: &'a QualityEvaluator,
    normalizer: NormalizerMode,
}

impl<'a> RefinementLoop<'a> {
    pub fn new(
        writer: &'a ContentGenerator,
        evaluator: &'a QualityEvaluator,
        normalizer: NormalizerMode,
    ) -> Self {
        Self {
            writer,
            evaluator,
            normalizer,
        }
    }

    /// Any generation error aborts this file only.
    pub async fn run(
        &self,
        context: &PromptContext,
        plan: &Plan,
        change: &PlannedChange,
    ) -> Result<RefinementOutcome, GenerationError> {
        let span = info_span!("refine", path = %change.path, change = change.change_type.as_str());
        self.refine(context, plan, change).instrument(span).await
    }

    async fn refine(
        &self,
        context: &PromptContext,
        plan: &Plan,
        change: &PlannedChange,
    ) -> Result<RefinementOutcome, GenerationError> {
        let initial = self.writer.generate(context, plan, change, None).await?;
        let mut round = Round::start(initial);

        let exit = loop {
            match round.next_step() {
                Step::Evaluate => {
                    let verdict = self
                        .evaluator
                        .evaluate(context, change, round.current())
                        .await?;
                    info!(
                        round = round.index(),
                        score = verdict.score,
                        structure_valid = verdict.structure_valid,
                        content_clear = verdict.content_clear,
                        purpose_served = verdict.purpose_served,
                        "Round evaluated"
                    );
                    round.record(verdict);
                }
                Step::Revise { feedback } => {
                    let revised = self
                        .writer
                        .generate(
                            context,
                            plan,
                            change,
                            Some(Revision {
                                prior: round.current(),
                                feedback: &feedback,
                            }),
                        )
                        .await?;
                    round.advance(revised);
                }
                Step::Finished(exit) => break exit,
            }
        };

        match exit {
            Exit::Converged { rounds } => info!(rounds, "Converged"),
            Exit::Exhausted { rounds } => info!(rounds, "Round budget exhausted"),
        }

        let current = round.into_content();
        let content = match self.normalizer {
            NormalizerMode::Model => self.writer.normalize(context, &current).await?,
            NormalizerMode::Deterministic => strip_wrapping_fence(&current),
        };
        debug!(mode = ?self.normalizer, bytes = content.len(), "Normalized");

        Ok(RefinementOutcome { content, exit })
    }
}
