//! 错误类型
//!
//! 生成任务只会产生三类错误：
//! - `InputPrecondition`：调用方传入的依赖缺失，不重试
//! - `Transport`：服务不可用 / 超时，可重试
//! - `SchemaValidation`：模型返回内容不符合输出结构，可重试

/// 生成任务错误
///
/// 需要 `Clone`：失败结果会被放进会话快照中反复发布
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// 调用方传入的必填字段为空
    #[error("{task}: required input `{field}` is missing")]
    InputPrecondition {
        task: &'static str,
        field: &'static str,
    },

    /// 生成服务不可达、返回错误或超时
    #[error("{task}: generation service unavailable: {message}")]
    Transport { task: &'static str, message: String },

    /// 模型返回内容无法解析或不满足输出结构
    #[error("{task}: response failed validation: {message}")]
    SchemaValidation { task: &'static str, message: String },
}

impl GenerationError {
    pub fn input_precondition(task: &'static str, field: &'static str) -> Self {
        GenerationError::InputPrecondition { task, field }
    }

    pub fn transport(task: &'static str, message: impl Into<String>) -> Self {
        GenerationError::Transport {
            task,
            message: message.into(),
        }
    }

    pub fn schema_validation(task: &'static str, message: impl Into<String>) -> Self {
        GenerationError::SchemaValidation {
            task,
            message: message.into(),
        }
    }

    /// 是否属于可重试的瞬时错误
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerationError::InputPrecondition { .. })
    }

    /// 不带任务名前缀的错误描述（用于展示给用户）
    pub fn detail(&self) -> String {
        match self {
            GenerationError::InputPrecondition { field, .. } => {
                format!("required input `{field}` is missing")
            }
            GenerationError::Transport { message, .. } => {
                format!("generation service unavailable: {message}")
            }
            GenerationError::SchemaValidation { message, .. } => {
                format!("response failed validation: {message}")
            }
        }
    }

    /// 错误分类名称（用于日志和 HTTP 响应）
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InputPrecondition { .. } => "input_precondition",
            GenerationError::Transport { .. } => "transport",
            GenerationError::SchemaValidation { .. } => "schema_validation",
        }
    }
}

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    TomlParseFailed { path: String, message: String },
}

/// 生成任务结果类型
pub type GenerationOutcome<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_precondition_is_not_retryable() {
        assert!(!GenerationError::input_precondition("theory", "topic").is_retryable());
        assert!(GenerationError::transport("theory", "503").is_retryable());
        assert!(GenerationError::schema_validation("quiz", "bad json").is_retryable());
    }

    #[test]
    fn test_display_names_task_and_field() {
        let err = GenerationError::input_precondition("paper", "samplePaper");
        assert_eq!(err.to_string(), "paper: required input `samplePaper` is missing");
        assert_eq!(err.kind(), "input_precondition");
    }
}
