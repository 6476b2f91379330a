//! Quality Evaluator: scores a candidate document against its planned purpose.

use crate::error::GenerationError;
use crate::model::{decode, ModelCall, Schema, StructuredRequest};
use crate::workflow::prompt::PromptContext;
use crate::workflow::types::{PlannedChange, QualityVerdict};
use std::sync::Arc;
use tracing::debug;

pub static VERDICT_SCHEMA: Schema = Schema {
    name: "quality_verdict",
    skeleton: r#"{
  "qualityScore": 0.0,
  "structureValid": true,
  "contentClear": true,
  "purposeServed": true,
  "specificIssues": ["<problem found in the document>"],
  "improvementSuggestions": ["<concrete change that would fix it>"]
}"#,
};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

pub struct QualityEvaluator {
    model: Arc<dyn ModelCall>,
}

impl QualityEvaluator {
    pub fn new(model: Arc<dyn ModelCall>) -> Self {
        Self { model }
    }

    pub async fn evaluate(
        &self,
        context: &PromptContext,
        change: &PlannedChange,
        document: &str,
    ) -> Result<QualityVerdict, GenerationError> {
        let prompt = format!(
            "Evaluate the document planned for {} ({}).\n\n\
             Purpose: {}\n\n\
             Score it from 0 to 10 on format compliance, clarity, and whether it serves \
             the purpose. Set structureValid only if it follows the document format exactly. \
             List concrete issues and suggestions; leave them empty if there are none.\n\n\
             ## Document\n\n{}",
            change.path,
            change.change_type.as_str(),
            change.purpose,
            document
        );

        let value = self
            .model
            .structured(StructuredRequest {
                system: Arc::clone(&context.system),
                prompt,
                schema: &VERDICT_SCHEMA,
            })
            .await?;
        let mut verdict: QualityVerdict = decode(&VERDICT_SCHEMA, value)?;

        if !verdict.score.is_finite() {
            return Err(GenerationError::schema(
                VERDICT_SCHEMA.name,
                "qualityScore is not a finite number",
            ));
        }
        verdict.score = verdict.score.clamp(MIN_SCORE, MAX_SCORE);

        debug!(
            path = %change.path,
            score = verdict.score,
            converged = verdict.converged(),
            "Document evaluated"
        );
        Ok(verdict)
    }
}
