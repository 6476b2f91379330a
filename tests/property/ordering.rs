//! Property-based tests for result ordering and failure isolation across concurrent loops

use async_trait::async_trait;
use memoflow::error::{ApiError, GenerationError};
use memoflow::model::{ModelCall, StructuredRequest, TextRequest};
use memoflow::workflow::Orchestrator;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One planned file per entry: (delay in ms, fails).
struct Fanout {
    files: Vec<(u64, bool)>,
}

impl Fanout {
    fn path(index: usize) -> String {
        format!("note-{}.md", index)
    }

    fn lookup(&self) -> HashMap<String, (u64, bool)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| (Self::path(i), *file))
            .collect()
    }
}

#[async_trait]
impl ModelCall for Fanout {
    async fn structured(&self, request: StructuredRequest) -> Result<Value, GenerationError> {
        if request.schema.name == "plan" {
            let files: Vec<Value> = (0..self.files.len())
                .map(|i| json!({"purpose": "p", "filePath": Self::path(i), "changeType": "create"}))
                .collect();
            return Ok(json!({"files": files, "estimatedComplexity": "low"}));
        }
        Ok(json!({
            "qualityScore": 10,
            "structureValid": true,
            "contentClear": true,
            "purposeServed": true
        }))
    }

    async fn text(&self, request: TextRequest) -> Result<String, GenerationError> {
        let Some(rest) = request.prompt.strip_prefix("Write the full content of ") else {
            return Ok(request.prompt);
        };
        let path = rest.split(' ').next().unwrap_or_default().to_string();
        let (delay, fails) = self.lookup().get(&path).copied().unwrap_or((0, false));
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if fails {
            return Err(ApiError::ProviderRequestFailed(path).into());
        }
        Ok(format!("# {}", path))
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn files_keep_plan_order_minus_failures(
        files in proptest::collection::vec((0u64..200, proptest::bool::weighted(0.3)), 1..6)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        let model = Arc::new(Fanout { files: files.clone() });
        let orchestrator = Orchestrator::new(model);

        let report = runtime
            .block_on(orchestrator.run_with_report(&[], &[], CancellationToken::new()))
            .unwrap();

        let expected: Vec<String> = files
            .iter()
            .enumerate()
            .filter(|(_, (_, fails))| !fails)
            .map(|(i, _)| Fanout::path(i))
            .collect();
        let actual: Vec<String> = report.result.files.iter().map(|f| f.path.clone()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(
            report.failures.len(),
            files.iter().filter(|(_, fails)| *fails).count()
        );
    }
}
