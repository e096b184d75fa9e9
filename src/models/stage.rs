use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 生成流水线的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Theory,
    Flowchart,
    Quiz,
    Paper,
}

impl Stage {
    /// 自动执行链中的阶段，按依赖顺序排列
    pub const AUTOMATIC: [Stage; 3] = [Stage::Theory, Stage::Flowchart, Stage::Quiz];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Theory => "theory",
            Stage::Flowchart => "flowchart",
            Stage::Quiz => "quiz",
            Stage::Paper => "paper",
        }
    }

    /// 展示给用户的阶段名称
    pub fn display_name(self) -> &'static str {
        match self {
            Stage::Theory => "theory",
            Stage::Flowchart => "flowchart",
            Stage::Quiz => "quiz",
            Stage::Paper => "question paper",
        }
    }

    /// 直接依赖的上游阶段
    pub fn upstream(self) -> Option<Stage> {
        match self {
            Stage::Theory => None,
            Stage::Flowchart => Some(Stage::Theory),
            Stage::Quiz | Stage::Paper => Some(Stage::Flowchart),
        }
    }

    /// 自动链中的下游阶段（试卷阶段永远不会被自动触发）
    pub fn downstream(self) -> Option<Stage> {
        match self {
            Stage::Theory => Some(Stage::Flowchart),
            Stage::Flowchart => Some(Stage::Quiz),
            Stage::Quiz | Stage::Paper => None,
        }
    }

    pub fn is_automatic(self) -> bool {
        !matches!(self, Stage::Paper)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "theory" => Ok(Stage::Theory),
            "flowchart" => Ok(Stage::Flowchart),
            "quiz" => Ok(Stage::Quiz),
            "paper" => Ok(Stage::Paper),
            other => Err(format!("unknown stage: {other}")),
        }
    }
}
