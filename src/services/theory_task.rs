//! 背景理论生成任务

use crate::error::GenerationOutcome;
use crate::models::{TheoryPayload, TheoryRequest};
use crate::services::prompt_task::{require, PromptTask};

pub struct TheoryTask;

impl PromptTask for TheoryTask {
    type Input = TheoryRequest;
    type Output = TheoryPayload;

    const NAME: &'static str = "theory";
    const OUTPUT_SCHEMA: &'static str =
        r#"{"theory": string /* detailed, multi-paragraph background theory */}"#;

    fn prepare(&self, input: TheoryRequest) -> GenerationOutcome<TheoryRequest> {
        require(Self::NAME, "topic", &input.topic)?;
        Ok(input)
    }

    fn render(&self, input: &TheoryRequest) -> String {
        format!(
            r#"You are an expert computer science educator. Write a comprehensive, detailed, multi-paragraph background theory for the topic below.

The theory must give a student who is new to the subject a solid foundation: break complex concepts into understandable parts and explain the core ideas clearly.

Topic: {}

Theory:"#,
            input.topic
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;

    #[test]
    fn test_render_interpolates_topic_verbatim() {
        let prompt = TheoryTask.render(&TheoryRequest::new("Big O <Notation> & \"friends\""));
        assert!(prompt.contains("Topic: Big O <Notation> & \"friends\""));
    }

    #[test]
    fn test_empty_topic_rejected() {
        let err = TheoryTask.prepare(TheoryRequest::new("   ")).unwrap_err();
        assert_eq!(err, GenerationError::input_precondition("theory", "topic"));
    }
}
