//! 展示给用户的阶段错误文本

use crate::error::GenerationError;
use crate::models::Stage;

/// 展示用的阶段错误文本，例如 `Error generating theory: ...`
pub fn format_stage_error(stage: Stage, err: &GenerationError) -> String {
    format!("Error generating {}: {}", stage.display_name(), err.detail())
}

/// 自动链全部失败时展示的唯一顶层错误
pub fn blocking_error(topic: &str, err: &GenerationError) -> String {
    format!(
        "Could not generate any learning content for \"{}\": {}",
        topic,
        err.detail()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stage_error() {
        let err = GenerationError::schema_validation("quiz", "expected 15 questions, got 3");
        assert_eq!(
            format_stage_error(Stage::Quiz, &err),
            "Error generating quiz: response failed validation: expected 15 questions, got 3"
        );
    }

    #[test]
    fn test_blocking_error_names_topic() {
        let err = GenerationError::transport("theory", "503");
        assert_eq!(
            blocking_error("Big O", &err),
            "Could not generate any learning content for \"Big O\": generation service unavailable: 503"
        );
    }
}
