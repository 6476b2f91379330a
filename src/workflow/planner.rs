//! Plan Generator: proposes file operations from the conversation and current notes.
//!
//! One call, one plan. Empty plans are valid output here; retrying them is the
//! orchestrator's job.

use crate::error::GenerationError;
use crate::model::{decode, ModelCall, Schema, StructuredRequest};
use crate::workflow::prompt::PromptContext;
use crate::workflow::types::Plan;
use std::sync::Arc;
use tracing::debug;

pub static PLAN_SCHEMA: Schema = Schema {
    name: "plan",
    skeleton: r#"{
  "files": [
    {
      "purpose": "<what this note change accomplishes>",
      "filePath": "<note path, e.g. shopping-list.md>",
      "changeType": "create | modify | delete"
    }
  ],
  "estimatedComplexity": "low | medium | high"
}"#,
};

pub struct PlanGenerator {
    model: Arc<dyn ModelCall>,
}

impl PlanGenerator {
    pub fn new(model: Arc<dyn ModelCall>) -> Self {
        Self { model }
    }

    pub async fn generate_plan(&self, context: &PromptContext) -> Result<Plan, GenerationError> {
        let prompt = format!(
            "Analyze this conversation and plan which notes to create, modify, or delete.\n\n\
             ## Messages\n\n{}\n\n\
             ## Current notes\n\n{}\n\n\
             Return a plan with at least one file whenever the conversation contains anything worth keeping. \
             Use the path of an existing note to modify or delete it.",
            context.transcript(),
            context.notes(),
        );

        let value = self
            .model
            .structured(StructuredRequest {
                system: Arc::clone(&context.system),
                prompt,
                schema: &PLAN_SCHEMA,
            })
            .await?;
        let mut plan: Plan = decode(&PLAN_SCHEMA, value)?;

        for change in &mut plan.changes {
            change.path = change.path.trim().to_string();
            if change.path.is_empty() {
                return Err(GenerationError::schema(
                    PLAN_SCHEMA.name,
                    "planned change has an empty filePath",
                ));
            }
        }

        debug!(
            changes = plan.changes.len(),
            complexity = ?plan.estimated_complexity,
            "Plan generated"
        );
        Ok(plan)
    }
}
