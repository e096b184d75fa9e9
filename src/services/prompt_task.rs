//! Prompt Task 抽象
//!
//! 一个 Prompt Task = 输入校验 + 模板渲染 + 输出结构 + 重试策略。
//! 具体的执行（调用、超时、重试）由 `TaskExecutor` 统一处理。

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::GenerationOutcome;
use crate::models::Validate;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（含第一次），至少为 1
    pub max_attempts: u32,
    /// 两次尝试之间的等待
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// 只尝试一次，不重试
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }
}

/// 单个提示词任务
pub trait PromptTask: Send + Sync {
    type Input: Send + Sync;
    type Output: DeserializeOwned + Validate + Send;

    /// 任务名称
    const NAME: &'static str;

    /// 输出结构描述（会随请求一起发送给模型）
    const OUTPUT_SCHEMA: &'static str;

    /// 校验输入并为可选字段填充默认值
    ///
    /// 返回 `InputPrecondition` 时不会发起任何网络调用
    fn prepare(&self, input: Self::Input) -> GenerationOutcome<Self::Input>;

    /// 把输入渲染成提示词（原样插入，不做转义）
    fn render(&self, input: &Self::Input) -> String;

    /// 本次调用使用的重试策略，默认使用全局策略
    fn retry_policy(&self, _input: &Self::Input, default: RetryPolicy) -> RetryPolicy {
        default
    }
}

/// 必填字段校验
pub(crate) fn require(
    task: &'static str,
    field: &'static str,
    value: &str,
) -> GenerationOutcome<()> {
    if value.trim().is_empty() {
        return Err(crate::error::GenerationError::input_precondition(task, field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_minimum_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::single_attempt().max_attempts, 1);
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("theory", "topic", "  ").is_err());
        assert!(require("theory", "topic", "Big O").is_ok());
    }
}
