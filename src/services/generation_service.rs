//! 生成服务 - 业务能力层
//!
//! 对外提供四个生成操作，只负责"生成"能力，不关心阶段顺序和会话状态

use std::sync::Arc;

use tracing::{error, info};

use crate::clients::{GenerationClient, OpenAiClient};
use crate::config::Config;
use crate::error::GenerationOutcome;
use crate::models::{
    FlowchartPayload, FlowchartRequest, PaperRequest, QuestionPaperPayload, QuizPayload,
    QuizRequest, TheoryPayload, TheoryRequest,
};
use crate::services::task_executor::TaskExecutor;
use crate::services::{FlowchartTask, PaperTask, QuizTask, TheoryTask};
use crate::utils::truncate_text;

/// 生成服务
///
/// 职责：
/// - 把调用方的参数组装成任务输入
/// - 交给 `TaskExecutor` 执行（校验 / 重试 / 解析）
/// - 不保存任何结果
#[derive(Clone)]
pub struct GenerationService {
    executor: TaskExecutor,
}

impl GenerationService {
    /// 使用 OpenAI 兼容客户端创建
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(OpenAiClient::new(config)), config)
    }

    /// 使用指定的生成客户端创建
    pub fn new(client: Arc<dyn GenerationClient>, config: &Config) -> Self {
        Self {
            executor: TaskExecutor::from_config(client, config),
        }
    }

    pub fn with_executor(executor: TaskExecutor) -> Self {
        Self { executor }
    }

    /// 生成背景理论
    ///
    /// `topic` 为空时返回 `InputPrecondition`
    pub async fn generate_theory(&self, topic: &str) -> GenerationOutcome<TheoryPayload> {
        info!("📖 生成背景理论: {}", truncate_text(topic, 60));
        self.executor
            .execute(&TheoryTask, TheoryRequest::new(topic))
            .await
    }

    /// 生成概念流程图
    ///
    /// `theory` 可以是占位文本，此时不会因为缺少理论而报错
    pub async fn generate_flowchart(
        &self,
        topic: &str,
        theory: &str,
    ) -> GenerationOutcome<FlowchartPayload> {
        info!("🔀 生成概念流程图: {}", truncate_text(topic, 60));
        self.executor
            .execute(&FlowchartTask, FlowchartRequest::new(topic, theory))
            .await
    }

    /// 生成测验，失败时返回错误
    ///
    /// 流水线内部使用，用来区分"失败"和"空测验"
    pub async fn try_generate_quiz(
        &self,
        topic: &str,
        flowchart: &str,
    ) -> GenerationOutcome<QuizPayload> {
        info!("📝 生成测验: {}", truncate_text(topic, 60));
        self.executor
            .execute(&QuizTask, QuizRequest::new(topic, flowchart))
            .await
    }

    /// 生成测验，永远不会失败
    ///
    /// 任何无法恢复的错误都会变成空测验 `{quiz: []}`，保证页面可以渲染
    pub async fn generate_quiz(&self, topic: &str, flowchart: &str) -> QuizPayload {
        match self.try_generate_quiz(topic, flowchart).await {
            Ok(quiz) => quiz,
            Err(e) => {
                error!("测验生成失败，返回空测验: {}", e);
                QuizPayload::empty()
            }
        }
    }

    /// 仿照样卷生成试卷
    ///
    /// `flowchart` 或 `sample_paper` 为空时直接返回 `InputPrecondition`，不发起调用
    pub async fn generate_question_paper(
        &self,
        topic: &str,
        flowchart: &str,
        sample_paper: &str,
    ) -> GenerationOutcome<QuestionPaperPayload> {
        info!("📄 生成试卷: {}", truncate_text(topic, 60));
        self.executor
            .execute(&PaperTask, PaperRequest::new(topic, flowchart, sample_paper))
            .await
    }
}
