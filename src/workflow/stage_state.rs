//! 单个阶段的状态机
//!
//! `idle → running → {succeeded, failed}`，每次开始运行都会递增逻辑代数；
//! 只有代数匹配的完成结果才会被写回，过期的结果直接丢弃。

use serde::Serialize;

use crate::models::{GenerationResult, Stage};
use crate::workflow::messages::format_stage_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl StageStatus {
    pub fn is_settled(self) -> bool {
        !matches!(self, StageStatus::Running)
    }
}

/// 阶段槽位：状态 + 原子结果 + 逻辑代数
#[derive(Debug, Clone)]
pub struct StageSlot<T> {
    status: StageStatus,
    result: Option<GenerationResult<T>>,
    generation: u64,
}

impl<T> Default for StageSlot<T> {
    fn default() -> Self {
        Self {
            status: StageStatus::Idle,
            result: None,
            generation: 0,
        }
    }
}

impl<T: Clone> StageSlot<T> {
    /// 开始一次新的运行，返回本次运行的代数
    ///
    /// 之前还在运行中的调用从此刻起被视为过期
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.status = StageStatus::Running;
        self.result = None;
        self.generation
    }

    /// 写回运行结果
    ///
    /// 返回 `false` 表示该结果已过期（期间有更新的运行开始），未写入
    pub fn finish(&mut self, generation: u64, result: GenerationResult<T>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.status = if result.is_ok() {
            StageStatus::Succeeded
        } else {
            StageStatus::Failed
        };
        self.result = Some(result);
        true
    }

    pub fn status(&self) -> StageStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self) -> Option<&GenerationResult<T>> {
        self.result.as_ref()
    }

    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().and_then(GenerationResult::value)
    }

    /// 生成对外展示的只读视图
    pub fn view(&self, stage: Stage) -> StageView<T> {
        StageView {
            status: self.status,
            error_message: self
                .result
                .as_ref()
                .and_then(GenerationResult::error)
                .map(|e| format_stage_error(stage, e)),
            result: self.result.clone(),
        }
    }
}

/// 阶段的只读视图（快照的一部分）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageView<T> {
    pub status: StageStatus,
    pub result: Option<GenerationResult<T>>,
    /// 展示给用户的错误信息（带阶段前缀）
    pub error_message: Option<String>,
}

impl<T> StageView<T> {
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().and_then(GenerationResult::value)
    }
}
