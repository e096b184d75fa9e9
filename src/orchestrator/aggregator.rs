//! 部分结果汇总
//!
//! 把自动链三个阶段的结果合成一个 `PipelineBundle`，判断是否整体失败，
//! 并为每个失败阶段生成展示用的错误文本。阶段结果是原子的，不做合并。

use serde::Serialize;

use crate::models::{
    FlowchartPayload, GenerationResult, QuizPayload, Stage, TheoryPayload,
};
use crate::workflow::messages::{blocking_error, format_stage_error};

/// 自动链的汇总结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineBundle {
    pub theory: GenerationResult<TheoryPayload>,
    pub flowchart: GenerationResult<FlowchartPayload>,
    pub quiz: GenerationResult<QuizPayload>,
    /// 三个阶段全部失败
    pub all_failed: bool,
}

/// 单个阶段的展示错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageErrorMessage {
    pub stage: Stage,
    pub message: String,
}

/// 汇总后的整体状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleStatus {
    /// 至少一个阶段成功，失败阶段的错误在各自区域内展示
    Usable { errors: Vec<StageErrorMessage> },
    /// 全部失败，只展示一个阻塞性错误
    Blocked { message: String },
}

impl PipelineBundle {
    pub fn assemble(
        theory: GenerationResult<TheoryPayload>,
        flowchart: GenerationResult<FlowchartPayload>,
        quiz: GenerationResult<QuizPayload>,
    ) -> Self {
        let all_failed = theory.is_failed() && flowchart.is_failed() && quiz.is_failed();
        Self {
            theory,
            flowchart,
            quiz,
            all_failed,
        }
    }

    /// 每个失败阶段的展示错误，按阶段顺序
    pub fn errors(&self) -> Vec<StageErrorMessage> {
        let errors = [
            (Stage::Theory, self.theory.error()),
            (Stage::Flowchart, self.flowchart.error()),
            (Stage::Quiz, self.quiz.error()),
        ];
        errors
            .into_iter()
            .filter_map(|(stage, err)| {
                err.map(|e| StageErrorMessage {
                    stage,
                    message: format_stage_error(stage, e),
                })
            })
            .collect()
    }

    pub fn succeeded_count(&self) -> usize {
        [self.theory.is_ok(), self.flowchart.is_ok(), self.quiz.is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count()
    }

    pub fn status(&self, topic: &str) -> BundleStatus {
        match (self.all_failed, self.theory.error()) {
            (true, Some(err)) => BundleStatus::Blocked {
                message: blocking_error(topic, err),
            },
            _ => BundleStatus::Usable {
                errors: self.errors(),
            },
        }
    }
}
