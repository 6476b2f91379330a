//! Run presentation: workflow report as a table plus documents, or the JSON envelope.

use crate::error::ApiError;
use crate::workflow::{PlanSource, WorkflowReport, WorkflowResult};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// `{response, cancelled, memos: [{id, name, content}]}`; `id` is the file path.
pub fn format_run_json(result: &WorkflowResult) -> Result<String, ApiError> {
    let memos: Vec<_> = result
        .files
        .iter()
        .map(|file| {
            json!({
                "id": file.path,
                "name": file.name,
                "content": file.content,
            })
        })
        .collect();
    let out = json!({
        "response": result.summary(),
        "cancelled": result.cancelled,
        "memos": memos,
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| ApiError::InvalidInput(format!("Failed to encode result: {}", e)))
}

pub fn format_run_text(report: &WorkflowReport) -> String {
    let mut output = format!("{}\n", report.result.summary().bold());

    match report.plan_source {
        Some(PlanSource::Planned { attempt }) => {
            output.push_str(&format!("Plan accepted on attempt {}\n", attempt));
        }
        Some(PlanSource::Defaulted) => {
            output.push_str(&format!(
                "{}\n",
                "Planner produced no changes; used the fallback note".yellow()
            ));
        }
        None => {}
    }
    if report.result.cancelled {
        output.push_str(&format!(
            "{}\n",
            "Run stopped early; only completed files are shown".yellow()
        ));
    }

    if !report.result.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["#", "Path", "Change", "Lines"]);
        for (index, (file, change)) in report
            .result
            .files
            .iter()
            .zip(&report.change_types)
            .enumerate()
        {
            table.add_row(vec![
                (index + 1).to_string(),
                file.path.clone(),
                change.as_str().to_string(),
                file.content.lines().count().to_string(),
            ]);
        }
        output.push_str(&format!("\n{}\n", table));
    }

    if !report.failures.is_empty() {
        output.push_str(&format!("\n{}\n", "Failed:".red().bold()));
        for failure in &report.failures {
            output.push_str(&format!("  - {}: {}\n", failure.path, failure.cause));
        }
    }

    for file in &report.result.files {
        output.push_str(&format!("\n{}\n{}\n", format!("== {} ==", file.path).underline(), file.content));
    }

    output
}
