//! 各生成任务的输入记录
//!
//! 字段名与提示词模板中的占位变量一一对应

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryRequest {
    pub topic: String,
}

impl TheoryRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowchartRequest {
    pub topic: String,
    /// 理论文本，可以是占位文本
    pub theory: String,
}

impl FlowchartRequest {
    pub fn new(topic: impl Into<String>, theory: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            theory: theory.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    /// 流程图文本，可以是占位文本
    pub flowchart: String,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>, flowchart: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            flowchart: flowchart.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRequest {
    pub topic: String,
    pub flowchart: String,
    pub sample_paper: String,
}

impl PaperRequest {
    pub fn new(
        topic: impl Into<String>,
        flowchart: impl Into<String>,
        sample_paper: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            flowchart: flowchart.into(),
            sample_paper: sample_paper.into(),
        }
    }
}
