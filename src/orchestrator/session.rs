//! 学习会话 - 编排层
//!
//! ## 职责
//!
//! 一个主题对应一个会话，会话负责：
//! 1. **依赖顺序**：theory → flowchart → quiz，上游结果显式传给下游
//! 2. **失败隔离**：上游失败时下游拿到占位文本继续运行，不会被阻塞
//! 3. **单阶段重试**：复用已缓存的上游结果，默认不触发下游
//! 4. **过期丢弃**：同一阶段被重新运行后，旧调用的结果不会覆盖新状态
//! 5. **快照发布**：每次状态变化通过 `watch` 通道发布不可变快照
//!
//! 试卷阶段只能手动触发，且只有在流程图成功之后才可用。

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::error::{GenerationError, GenerationOutcome};
use crate::models::placeholder::{
    missing_flowchart, missing_theory, FLOWCHART_NOT_GENERATED, THEORY_NOT_GENERATED,
};
use crate::models::{
    FlowchartPayload, GenerationResult, QuestionPaperPayload, QuizPayload, Stage, TheoryPayload,
};
use crate::orchestrator::aggregator::{BundleStatus, PipelineBundle};
use crate::services::GenerationService;
use crate::utils::logging::log_pipeline_complete;
use crate::workflow::{SessionSnapshot, SessionState, StageStatus};

/// 重试范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryScope {
    /// 只重新运行该阶段
    StageOnly,
    /// 重新运行该阶段以及它之后的自动阶段
    Chain,
}

/// 流程图阶段的输入：理论文本，或描述失败原因的占位文本
pub fn theory_input(theory: &GenerationResult<TheoryPayload>) -> String {
    match theory {
        GenerationResult::Succeeded(payload) => payload.theory.clone(),
        GenerationResult::Failed(err) => missing_theory(&err.detail()),
    }
}

/// 测验 / 试卷阶段的输入：流程图文本，或描述失败原因的占位文本
pub fn flowchart_input(flowchart: &GenerationResult<FlowchartPayload>) -> String {
    match flowchart {
        GenerationResult::Succeeded(payload) => payload.flowchart.clone(),
        GenerationResult::Failed(err) => missing_flowchart(&err.detail()),
    }
}

/// 学习会话
pub struct LearningSession {
    topic: String,
    service: GenerationService,
    state: Mutex<SessionState>,
    snapshots: watch::Sender<SessionSnapshot>,
    started: AtomicBool,
}

impl LearningSession {
    pub fn new(topic: impl Into<String>, service: GenerationService) -> Self {
        let topic = topic.into();
        let state = SessionState::default();
        let (snapshots, _) = watch::channel(SessionSnapshot::capture(&topic, &state));

        Self {
            topic,
            service,
            state: Mutex::new(state),
            snapshots,
            started: AtomicBool::new(false),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// 当前最新快照
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// 订阅快照变化
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// 第一次访问时运行自动链，之后直接返回当前快照
    pub async fn ensure_started(&self) -> SessionSnapshot {
        if !self.started.swap(true, Ordering::SeqCst) {
            self.run_all().await;
        }
        self.snapshot()
    }

    /// 运行完整的自动链：theory → flowchart → quiz
    pub async fn run_all(&self) -> PipelineBundle {
        self.started.store(true, Ordering::SeqCst);
        info!("🚀 [{}] 开始生成学习内容", self.topic);

        let theory = self.execute_theory().await;
        let flowchart = self.execute_flowchart(theory_input(&theory)).await;
        let quiz = self.execute_quiz(flowchart_input(&flowchart)).await;

        let bundle = PipelineBundle::assemble(theory, flowchart, quiz);
        match bundle.status(&self.topic) {
            BundleStatus::Blocked { message } => error!("❌ {}", message),
            BundleStatus::Usable { errors } => {
                for e in errors {
                    warn!("⚠️ [{}] {}", self.topic, e.message);
                }
            }
        }
        log_pipeline_complete(&self.topic, bundle.succeeded_count(), Stage::AUTOMATIC.len());
        bundle
    }

    /// 重新运行单个阶段
    ///
    /// 上游使用已缓存的结果（上游正在运行时先等待其完成）。
    /// `RetryScope::Chain` 时继续运行后续的自动阶段。
    pub async fn retry(
        &self,
        stage: Stage,
        scope: RetryScope,
    ) -> GenerationOutcome<SessionSnapshot> {
        info!("🔁 [{}] 重试阶段 {} ({:?})", self.topic, stage, scope);
        self.started.store(true, Ordering::SeqCst);

        let mut next = Some(stage);
        while let Some(current) = next {
            self.rerun(current).await?;
            next = match scope {
                RetryScope::Chain => current.downstream().filter(|s| s.is_automatic()),
                RetryScope::StageOnly => None,
            };
        }

        Ok(self.snapshot())
    }

    /// 用槽位中已完成的上游输出重新运行一个阶段
    ///
    /// 只有前置条件错误会返回 `Err`，生成失败记录在快照里
    async fn rerun(&self, stage: Stage) -> GenerationOutcome<()> {
        match stage {
            Stage::Theory => {
                self.execute_theory().await;
            }
            Stage::Flowchart => {
                let theory = self.upstream_input(stage).await;
                self.execute_flowchart(theory).await;
            }
            Stage::Quiz => {
                let flowchart = self.upstream_input(stage).await;
                self.execute_quiz(flowchart).await;
            }
            Stage::Paper => {
                let sample = self
                    .state
                    .lock()
                    .await
                    .sample_paper
                    .clone()
                    .ok_or_else(|| GenerationError::input_precondition("paper", "samplePaper"))?;
                if let Err(e @ GenerationError::InputPrecondition { .. }) =
                    self.generate_paper(&sample).await
                {
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// 手动生成试卷
    ///
    /// 样卷为空，或者流程图还没有成功时，直接返回 `InputPrecondition`，不发起调用
    pub async fn generate_paper(
        &self,
        sample_paper: &str,
    ) -> GenerationOutcome<QuestionPaperPayload> {
        if sample_paper.trim().is_empty() {
            return Err(GenerationError::input_precondition("paper", "samplePaper"));
        }

        let flowchart = self
            .when_settled(Stage::Flowchart, |state| {
                state.flowchart.value().map(|f| f.flowchart.clone())
            })
            .await
            .ok_or_else(|| {
                warn!("[{}] 流程图尚未生成成功，无法生成试卷", self.topic);
                GenerationError::input_precondition("paper", "flowchart")
            })?;

        self.state.lock().await.sample_paper = Some(sample_paper.to_string());

        self.execute_paper(flowchart, sample_paper.to_string())
            .await
            .into_outcome()
    }

    // ========== 单阶段执行 ==========

    async fn execute_theory(&self) -> GenerationResult<TheoryPayload> {
        let generation = self.begin(Stage::Theory, |s| s.theory.begin()).await;
        let result = GenerationResult::from(self.service.generate_theory(&self.topic).await);
        let accepted = self
            .complete(Stage::Theory, |s| s.theory.finish(generation, result.clone()))
            .await;
        self.current_result(Stage::Theory, accepted, result, |s| s.theory.result())
            .await
    }

    async fn execute_flowchart(&self, theory: String) -> GenerationResult<FlowchartPayload> {
        let generation = self.begin(Stage::Flowchart, |s| s.flowchart.begin()).await;
        let result =
            GenerationResult::from(self.service.generate_flowchart(&self.topic, &theory).await);
        let accepted = self
            .complete(Stage::Flowchart, |s| {
                s.flowchart.finish(generation, result.clone())
            })
            .await;
        self.current_result(Stage::Flowchart, accepted, result, |s| s.flowchart.result())
            .await
    }

    async fn execute_quiz(&self, flowchart: String) -> GenerationResult<QuizPayload> {
        let generation = self.begin(Stage::Quiz, |s| s.quiz.begin()).await;
        let result =
            GenerationResult::from(self.service.try_generate_quiz(&self.topic, &flowchart).await);
        let accepted = self
            .complete(Stage::Quiz, |s| s.quiz.finish(generation, result.clone()))
            .await;
        self.current_result(Stage::Quiz, accepted, result, |s| s.quiz.result())
            .await
    }

    async fn execute_paper(
        &self,
        flowchart: String,
        sample_paper: String,
    ) -> GenerationResult<QuestionPaperPayload> {
        let generation = self.begin(Stage::Paper, |s| s.paper.begin()).await;
        let result = GenerationResult::from(
            self.service
                .generate_question_paper(&self.topic, &flowchart, &sample_paper)
                .await,
        );
        let accepted = self
            .complete(Stage::Paper, |s| s.paper.finish(generation, result.clone()))
            .await;
        self.current_result(Stage::Paper, accepted, result, |s| s.paper.result())
            .await
    }

    // ========== 状态辅助方法 ==========

    async fn begin(&self, stage: Stage, start: impl FnOnce(&mut SessionState) -> u64) -> u64 {
        let mut state = self.state.lock().await;
        let generation = start(&mut state);
        state.active_stage = Some(stage);
        self.publish(&state);
        debug!("[{}] 阶段 {} 开始 (第 {} 代)", self.topic, stage, generation);
        generation
    }

    /// 写回结果，返回是否被接受（`false` 表示已被更新的运行取代）
    async fn complete(
        &self,
        stage: Stage,
        finish: impl FnOnce(&mut SessionState) -> bool,
    ) -> bool {
        let mut state = self.state.lock().await;
        let accepted = finish(&mut state);
        if accepted {
            self.publish(&state);
            debug!("[{}] 阶段 {} 完成: {:?}", self.topic, stage, state.status(stage));
        } else {
            debug!("[{}] 阶段 {} 已被新的运行取代，丢弃旧结果", self.topic, stage);
        }
        accepted
    }

    /// 下游应当使用的结果
    ///
    /// 本次结果被接受时直接返回；被取代时等待最新一次运行结束，返回槽位里的结果
    async fn current_result<T: Clone>(
        &self,
        stage: Stage,
        accepted: bool,
        result: GenerationResult<T>,
        slot: impl Fn(&SessionState) -> Option<&GenerationResult<T>>,
    ) -> GenerationResult<T> {
        if accepted {
            return result;
        }
        self.when_settled(stage, |state| slot(state).cloned())
            .await
            .unwrap_or(result)
    }

    fn publish(&self, state: &SessionState) {
        self.snapshots
            .send_replace(SessionSnapshot::capture(&self.topic, state));
    }

    /// 等待某阶段不再处于运行中，然后在同一把锁内读取状态
    async fn when_settled<R>(&self, stage: Stage, read: impl Fn(&SessionState) -> R) -> R {
        let mut changes = self.snapshots.subscribe();
        loop {
            {
                let state = self.state.lock().await;
                if state.status(stage).is_settled() {
                    return read(&state);
                }
            }
            if changes.changed().await.is_err() {
                let state = self.state.lock().await;
                return read(&state);
            }
        }
    }

    async fn upstream_input(&self, stage: Stage) -> String {
        match stage.upstream() {
            Some(upstream) => self.cached_input(upstream).await,
            None => String::new(),
        }
    }

    /// 读取已缓存的上游输出，缺失时使用占位文本
    async fn cached_input(&self, upstream: Stage) -> String {
        self.when_settled(upstream, |state| match upstream {
            Stage::Theory => match (state.theory.status(), state.theory.result()) {
                (StageStatus::Succeeded | StageStatus::Failed, Some(result)) => theory_input(result),
                _ => THEORY_NOT_GENERATED.to_string(),
            },
            _ => match (state.flowchart.status(), state.flowchart.result()) {
                (StageStatus::Succeeded | StageStatus::Failed, Some(result)) => {
                    flowchart_input(result)
                }
                _ => FLOWCHART_NOT_GENERATED.to_string(),
            },
        })
        .await
    }
}
