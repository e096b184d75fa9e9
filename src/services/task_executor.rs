//! 任务执行器
//!
//! 统一负责：输入校验 → 渲染 → 调用生成服务（带超时）→ 解析校验 → 重试。
//! 调用方只能看到最终的成功或最终的失败，看不到中间的尝试。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::clients::{CompletionRequest, GenerationClient};
use crate::config::Config;
use crate::error::{GenerationError, GenerationOutcome};
use crate::services::prompt_task::{PromptTask, RetryPolicy};
use crate::services::response_parser::parse_response;

/// 任务执行器
///
/// 不持有任何会话状态，可以在多个会话之间共享
#[derive(Clone)]
pub struct TaskExecutor {
    client: Arc<dyn GenerationClient>,
    policy: RetryPolicy,
    timeout: Duration,
}

impl TaskExecutor {
    pub fn new(client: Arc<dyn GenerationClient>, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            client,
            policy,
            timeout,
        }
    }

    pub fn from_config(client: Arc<dyn GenerationClient>, config: &Config) -> Self {
        Self::new(client, RetryPolicy::from_config(config), config.request_timeout())
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// 执行一个提示词任务
    pub async fn execute<T: PromptTask>(
        &self,
        task: &T,
        input: T::Input,
    ) -> GenerationOutcome<T::Output> {
        let input = task.prepare(input).map_err(|e| {
            warn!("[{}] 输入校验失败，不发起调用: {}", T::NAME, e);
            e
        })?;

        let policy = task.retry_policy(&input, self.policy);
        let request = CompletionRequest {
            task: T::NAME,
            rendered_prompt: task.render(&input),
            output_schema: T::OUTPUT_SCHEMA,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("[{}] 第 {}/{} 次尝试", T::NAME, attempt, policy.max_attempts);

            match self.attempt::<T>(&request).await {
                Ok(output) => {
                    debug!("[{}] ✓ 第 {} 次尝试成功", T::NAME, attempt);
                    return Ok(output);
                }
                Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                    warn!(
                        "[{}] ⚠️ 第 {}/{} 次尝试失败，准备重试: {}",
                        T::NAME,
                        attempt,
                        policy.max_attempts,
                        e
                    );
                    if !policy.delay.is_zero() {
                        tokio::time::sleep(policy.delay).await;
                    }
                }
                Err(e) => {
                    error!("[{}] ❌ 已尝试 {} 次，放弃: {}", T::NAME, attempt, e);
                    return Err(e);
                }
            }
        }
    }

    /// 单次尝试：调用 + 超时 + 解析
    async fn attempt<T: PromptTask>(&self, request: &CompletionRequest) -> GenerationOutcome<T::Output> {
        let raw = tokio::time::timeout(self.timeout, self.client.complete(request))
            .await
            .map_err(|_| {
                GenerationError::transport(
                    T::NAME,
                    format!("timed out after {}s", self.timeout.as_secs_f32()),
                )
            })??;

        parse_response::<T::Output>(T::NAME, &raw)
    }
}
