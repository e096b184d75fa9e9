//! 仿样卷出题任务
//!
//! 结构、分值分布和题目风格来自样卷，内容只能来自流程图

use crate::error::GenerationOutcome;
use crate::models::{PaperRequest, QuestionPaperPayload};
use crate::services::prompt_task::{require, PromptTask};

pub struct PaperTask;

impl PromptTask for PaperTask {
    type Input = PaperRequest;
    type Output = QuestionPaperPayload;

    const NAME: &'static str = "paper";
    const OUTPUT_SCHEMA: &'static str = r#"{"questions": [
  {"questionText": string, "marks": number}
]}"#;

    fn prepare(&self, input: PaperRequest) -> GenerationOutcome<PaperRequest> {
        require(Self::NAME, "topic", &input.topic)?;
        require(Self::NAME, "flowchart", &input.flowchart)?;
        require(Self::NAME, "samplePaper", &input.sample_paper)?;
        Ok(input)
    }

    fn render(&self, input: &PaperRequest) -> String {
        format!(
            r#"You are a computer science professor who specialises in writing exam papers. Write a new question paper for the topic below, using the flowchart for content and the sample paper for style.

Follow these steps:
1. Study the sample paper: its structure, the kinds of questions, the mark distribution (for example 2.5, 5 and 10 marks) and how questions are phrased.
2. Take content ONLY from the concepts and relationships in the flowchart.
3. Write new questions that copy the sample paper's marking scheme, structure and style. Decide which flowchart concepts suit which mark value based on the sample paper's patterns.

Never copy a question from the sample paper. The paper must be entirely new.

Topic: {}

Flowchart (Content Source):
{}

Sample Paper (Style and Structure Reference):
{}

Generated Question Paper:"#,
            input.topic, input.flowchart, input.sample_paper
        )
    }
}
