//! 概念流程图生成任务
//!
//! 理论文本缺失时不会报错：空文本替换为默认占位文本，
//! 占位文本输入下进入降级模式，只尝试一次。

use crate::error::GenerationOutcome;
use crate::models::placeholder::{is_placeholder, THEORY_NOT_GENERATED};
use crate::models::{FlowchartPayload, FlowchartRequest};
use crate::services::prompt_task::{require, PromptTask, RetryPolicy};

pub struct FlowchartTask;

impl PromptTask for FlowchartTask {
    type Input = FlowchartRequest;
    type Output = FlowchartPayload;

    const NAME: &'static str = "flowchart";
    const OUTPUT_SCHEMA: &'static str =
        r#"{"flowchart": string /* text-based flowchart, most critical concepts first */}"#;

    fn prepare(&self, mut input: FlowchartRequest) -> GenerationOutcome<FlowchartRequest> {
        require(Self::NAME, "topic", &input.topic)?;
        if input.theory.trim().is_empty() {
            input.theory = THEORY_NOT_GENERATED.to_string();
        }
        Ok(input)
    }

    fn render(&self, input: &FlowchartRequest) -> String {
        format!(
            r#"You are an expert computer science educator. Produce a text-based flowchart that shows how the core concepts in the background theory below relate to each other.

Rank concepts by how important and how often repeated they are in the text, and chain them like a linked list from the most to the least critical.

Only use concepts that appear in the given theory. Do not introduce anything new.

Topic: {}
Background Theory:
{}

Flowchart:"#,
            input.topic, input.theory
        )
    }

    fn retry_policy(&self, input: &FlowchartRequest, default: RetryPolicy) -> RetryPolicy {
        if is_placeholder(&input.theory) {
            RetryPolicy::single_attempt()
        } else {
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::placeholder::missing_theory;

    #[test]
    fn test_empty_theory_gets_default_placeholder() {
        let input = FlowchartTask
            .prepare(FlowchartRequest::new("Big O Notation", ""))
            .unwrap();
        assert_eq!(input.theory, THEORY_NOT_GENERATED);
    }

    #[test]
    fn test_placeholder_theory_is_single_attempt() {
        let default = RetryPolicy::new(3, Duration::ZERO);
        let degraded = FlowchartRequest::new("Big O Notation", missing_theory("timeout"));
        let normal = FlowchartRequest::new("Big O Notation", "Big O describes growth.");

        assert_eq!(FlowchartTask.retry_policy(&degraded, default).max_attempts, 1);
        assert_eq!(FlowchartTask.retry_policy(&normal, default).max_attempts, 3);
    }

    #[test]
    fn test_render_includes_full_theory() {
        let theory = "Paragraph one.\n\nParagraph two with `code`.";
        let prompt = FlowchartTask.render(&FlowchartRequest::new("Big O Notation", theory));
        assert!(prompt.contains(theory));
    }
}
