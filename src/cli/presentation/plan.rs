use crate::error::ApiError;
use crate::workflow::{Plan, PlanSource};
use serde_json::json;

pub fn format_plan_json(plan: &Plan, source: PlanSource) -> Result<String, ApiError> {
    let out = json!({ "plan_source": source, "plan": plan });
    serde_json::to_string_pretty(&out)
        .map_err(|e| ApiError::InvalidInput(format!("Failed to encode plan: {}", e)))
}
