//! Content Generator: writes, revises, and normalizes one note document.
//!
//! Every call returns a complete document. Failures propagate unchanged; the
//! refinement loop owns the iteration budget.

use crate::error::GenerationError;
use crate::model::{ModelCall, TextRequest};
use crate::workflow::prompt::PromptContext;
use crate::workflow::types::{ChangeType, Plan, PlannedChange};
use std::fmt::Write as _;
use std::sync::Arc;

/// Prior content plus the evaluator's feedback on it.
#[derive(Debug, Clone, Copy)]
pub struct Revision<'a> {
    pub prior: &'a str,
    pub feedback: &'a [String],
}

pub struct ContentGenerator {
    model: Arc<dyn ModelCall>,
}

impl ContentGenerator {
    pub fn new(model: Arc<dyn ModelCall>) -> Self {
        Self { model }
    }

    /// Initial generation when `revision` is `None`; full-document revision otherwise.
    pub async fn generate(
        &self,
        context: &PromptContext,
        plan: &Plan,
        change: &PlannedChange,
        revision: Option<Revision<'_>>,
    ) -> Result<String, GenerationError> {
        let prompt = match revision {
            None => initial_prompt(context, plan, change),
            Some(revision) => revision_prompt(change, revision),
        };
        self.model
            .text(TextRequest {
                system: Arc::clone(&context.system),
                prompt,
            })
            .await
    }

    /// Restricted pass: fix syntax and strip wrapping artifacts, nothing else.
    pub async fn normalize(
        &self,
        context: &PromptContext,
        content: &str,
    ) -> Result<String, GenerationError> {
        let prompt = format!(
            "Normalize the document below. Your only tasks:\n\
             - remove any wrapping around the whole document (code fences, quotes, preambles, sign-offs);\n\
             - make it comply strictly with the document format.\n\
             Do not add, remove, or reword content. Return the document only.\n\n\
             ## Document\n\n{}",
            content
        );
        self.model
            .text(TextRequest {
                system: Arc::clone(&context.system),
                prompt,
            })
            .await
    }
}

fn initial_prompt(context: &PromptContext, plan: &Plan, change: &PlannedChange) -> String {
    let mut prompt = format!(
        "Write the full content of {} ({}).\n\nPurpose: {}\n",
        change.path,
        describe_change(change.change_type),
        change.purpose
    );

    let siblings: Vec<&PlannedChange> = plan
        .changes
        .iter()
        .filter(|other| other.path != change.path)
        .collect();
    if !siblings.is_empty() {
        prompt.push_str("\nOther notes changed in the same pass (do not duplicate their content):\n");
        for sibling in siblings {
            let _ = writeln!(
                prompt,
                "- {} [{}]: {}",
                sibling.path,
                sibling.change_type.as_str(),
                sibling.purpose
            );
        }
    }

    let _ = write!(
        prompt,
        "\nConversation context:\n{}\n\nReturn the document only.",
        context.transcript()
    );
    prompt
}

fn revision_prompt(change: &PlannedChange, revision: Revision<'_>) -> String {
    let mut prompt = format!(
        "Improve the content of {} based on the feedback below. \
         Return the complete revised document, not a diff.\n\nPurpose: {}\n\nFeedback:\n",
        change.path, change.purpose
    );
    if revision.feedback.is_empty() {
        prompt.push_str("- Raise overall quality and format compliance.\n");
    }
    for item in revision.feedback {
        let _ = writeln!(prompt, "- {}", item);
    }
    let _ = write!(prompt, "\nCurrent content:\n{}", revision.prior);
    prompt
}

fn describe_change(change_type: ChangeType) -> &'static str {
    match change_type {
        ChangeType::Create => "a new note",
        ChangeType::Modify => "an update to an existing note; keep what is still accurate",
        ChangeType::Delete => {
            "a note being deleted; write a short record of what it held and why it is going away"
        }
    }
}
