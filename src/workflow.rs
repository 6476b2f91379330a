//! Agent workflow
//!
//! Turns one transcript snapshot plus the current note collection into a set of
//! generated note documents: plan with bounded retries, refine each planned file
//! concurrently, normalize once, assemble in plan order.

pub mod evaluator;
pub mod normalize;
pub mod orchestrator;
pub mod planner;
pub mod prompt;
pub mod refine;
pub mod types;
pub mod writer;

pub use evaluator::{QualityEvaluator, VERDICT_SCHEMA};
pub use normalize::{strip_wrapping_fence, NormalizerMode};
pub use orchestrator::{
    FileFailure, Orchestrator, PlanSource, WorkflowReport, MAX_PLAN_ATTEMPTS,
};
pub use planner::{PlanGenerator, PLAN_SCHEMA};
pub use prompt::{load_format_guide, PromptContext, DEFAULT_FORMAT_GUIDE};
pub use refine::{Exit, RefinementLoop, RefinementOutcome, Round, Step, MAX_ITERATIONS};
pub use types::{
    ChangeType, Complexity, GeneratedFile, Message, Note, Plan, PlannedChange, QualityVerdict,
    Role, WorkflowResult, QUALITY_THRESHOLD,
};
pub use writer::{ContentGenerator, Revision};
