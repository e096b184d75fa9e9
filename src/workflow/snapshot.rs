//! 会话快照
//!
//! 每次阶段状态变化都会生成一个新的不可变快照，交给展示层使用。
//! `active_stage` 对应最近一次开始运行的阶段（页面据此切换标签页）。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    FlowchartPayload, QuestionPaperPayload, QuizPayload, Stage, TheoryPayload,
};
use crate::workflow::messages::blocking_error;
use crate::workflow::stage_state::{StageSlot, StageStatus, StageView};

/// 会话内部的可变状态，只在会话内部持有
#[derive(Debug, Default)]
pub struct SessionState {
    pub theory: StageSlot<TheoryPayload>,
    pub flowchart: StageSlot<FlowchartPayload>,
    pub quiz: StageSlot<QuizPayload>,
    pub paper: StageSlot<QuestionPaperPayload>,
    pub active_stage: Option<Stage>,
    pub sample_paper: Option<String>,
}

impl SessionState {
    pub fn status(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Theory => self.theory.status(),
            Stage::Flowchart => self.flowchart.status(),
            Stage::Quiz => self.quiz.status(),
            Stage::Paper => self.paper.status(),
        }
    }

    /// 自动链的三个阶段是否全部失败
    pub fn all_failed(&self) -> bool {
        Stage::AUTOMATIC
            .iter()
            .all(|stage| self.status(*stage) == StageStatus::Failed)
    }
}

/// 会话快照
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub topic: String,
    pub theory: StageView<TheoryPayload>,
    pub flowchart: StageView<FlowchartPayload>,
    pub quiz: StageView<QuizPayload>,
    pub paper: StageView<QuestionPaperPayload>,
    pub active_stage: Option<Stage>,
    /// 试卷生成只有在流程图成功后才可用
    pub paper_enabled: bool,
    pub all_failed: bool,
    /// 自动链全部失败时的唯一顶层错误
    pub blocking_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn capture(topic: &str, state: &SessionState) -> Self {
        let all_failed = state.all_failed();
        let blocking = if all_failed {
            state
                .theory
                .result()
                .and_then(|r| r.error())
                .map(|e| blocking_error(topic, e))
        } else {
            None
        };

        Self {
            topic: topic.to_string(),
            theory: state.theory.view(Stage::Theory),
            flowchart: state.flowchart.view(Stage::Flowchart),
            quiz: state.quiz.view(Stage::Quiz),
            paper: state.paper.view(Stage::Paper),
            active_stage: state.active_stage,
            paper_enabled: state.flowchart.status() == StageStatus::Succeeded,
            all_failed,
            blocking_error: blocking,
            updated_at: Utc::now(),
        }
    }

    pub fn status(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Theory => self.theory.status,
            Stage::Flowchart => self.flowchart.status,
            Stage::Quiz => self.quiz.status,
            Stage::Paper => self.paper.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::models::GenerationResult;

    fn fail<T: Clone>(slot: &mut StageSlot<T>, task: &'static str) {
        let generation = slot.begin();
        slot.finish(
            generation,
            GenerationResult::Failed(GenerationError::transport(task, "down")),
        );
    }

    #[test]
    fn test_fresh_state_is_not_all_failed() {
        let snapshot = SessionSnapshot::capture("Big O Notation", &SessionState::default());
        assert!(!snapshot.all_failed);
        assert!(!snapshot.paper_enabled);
        assert_eq!(snapshot.status(Stage::Quiz), StageStatus::Idle);
    }

    #[test]
    fn test_all_failed_sets_blocking_error() {
        let mut state = SessionState::default();
        fail(&mut state.theory, "theory");
        fail(&mut state.flowchart, "flowchart");
        fail(&mut state.quiz, "quiz");

        let snapshot = SessionSnapshot::capture("Big O Notation", &state);
        assert!(snapshot.all_failed);
        assert!(snapshot
            .blocking_error
            .as_deref()
            .unwrap()
            .contains("Big O Notation"));
    }

    #[test]
    fn test_paper_enabled_after_flowchart_success() {
        let mut state = SessionState::default();
        let generation = state.flowchart.begin();
        state.flowchart.finish(
            generation,
            GenerationResult::Succeeded(FlowchartPayload {
                flowchart: "A -> B".into(),
            }),
        );

        let snapshot = SessionSnapshot::capture("Big O Notation", &state);
        assert!(snapshot.paper_enabled);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["flowchart"]["status"], "succeeded");
        assert_eq!(json["flowchart"]["result"]["value"]["flowchart"], "A -> B");
    }
}
