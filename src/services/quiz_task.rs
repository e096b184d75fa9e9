//! 渐进难度测验生成任务

use crate::error::GenerationOutcome;
use crate::models::placeholder::FLOWCHART_NOT_GENERATED;
use crate::models::{QuizPayload, QuizRequest};
use crate::services::prompt_task::{require, PromptTask};

pub struct QuizTask;

impl PromptTask for QuizTask {
    type Input = QuizRequest;
    type Output = QuizPayload;

    const NAME: &'static str = "quiz";
    const OUTPUT_SCHEMA: &'static str = r#"{"quiz": [
  {
    "question": string,
    "options": [string, ...] /* at least 4 */,
    "correctAnswerIndex": integer /* index into options */,
    "difficulty": "easy" | "medium" | "hard" | "coding",
    "explanation": string
  }
] /* exactly 15 items */}"#;

    fn prepare(&self, mut input: QuizRequest) -> GenerationOutcome<QuizRequest> {
        require(Self::NAME, "topic", &input.topic)?;
        if input.flowchart.trim().is_empty() {
            input.flowchart = FLOWCHART_NOT_GENERATED.to_string();
        }
        Ok(input)
    }

    fn render(&self, input: &QuizRequest) -> String {
        format!(
            r#"You are an expert computer science educator. Write a 15-question quiz for the topic below, based ONLY on the given flowchart.

Structure:
- Questions 1-10 go from easy to medium to hard, testing foundational understanding first and then the concepts and relationships in the flowchart in increasing depth. Never put an easier question after a harder one.
- Questions 11-15 are real coding challenges that check whether the student can implement and apply what the flowchart covers.

Every question needs:
- question: the question text.
- options: at least 4 answer options.
- correctAnswerIndex: the index of the correct option.
- difficulty: "easy", "medium" or "hard" for questions 1-10, "coding" for questions 11-15.
- explanation: a detailed explanation of the correct answer.

Topic: {}
Flowchart to base the quiz on:
{}

Cover the key concepts of the flowchart and keep the questions clear and engaging. Output the quiz as a JSON object."#,
            input.topic, input.flowchart
        )
    }
}
