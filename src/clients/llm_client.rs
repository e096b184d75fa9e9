//! 生成服务客户端
//!
//! `GenerationClient` 是流水线与外部文本生成服务之间唯一的接缝：
//! 输入渲染好的提示词和输出结构描述，返回模型的原始文本。
//! 解析和校验由上层的任务执行器负责。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{GenerationError, GenerationOutcome};

/// 一次生成请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// 任务名称（用于日志和错误分类）
    pub task: &'static str,
    /// 已经完成变量替换的提示词
    pub rendered_prompt: String,
    /// 期望的输出结构描述
    pub output_schema: &'static str,
}

/// 文本生成服务
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// 提交提示词并返回模型的原始响应文本
    async fn complete(&self, request: &CompletionRequest) -> GenerationOutcome<String>;
}

/// 基于 OpenAI 兼容接口的生成客户端
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    /// 构建系统消息：身份设定 + 输出结构约束
    fn system_message(output_schema: &str) -> String {
        format!(
            "You are an expert computer science educator.\n\
             Respond with a single JSON object and nothing else. \
             The object must match this structure:\n{output_schema}"
        )
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> GenerationOutcome<String> {
        let task = request.task;
        debug!("调用 LLM API，任务: {}, 模型: {}", task, self.model_name);
        debug!("提示词长度: {} 字符", request.rendered_prompt.len());

        let build_failed = |e: async_openai::error::OpenAIError| {
            GenerationError::transport(task, format!("failed to build request: {e}"))
        };

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(Self::system_message(request.output_schema))
            .build()
            .map_err(build_failed)?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.rendered_prompt.as_str())
            .build()
            .map_err(build_failed)?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(build_failed)?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败 ({}): {}", task, e);
            GenerationError::transport(task, e.to_string())
        })?;

        debug!("LLM API 调用成功 ({})", task);

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::schema_validation(task, "model returned no content"))?;

        Ok(content.trim().to_string())
    }
}
