//! 生成任务的输出结构
//!
//! 模型返回的 JSON 先反序列化为这些类型，再经过 `Validate` 校验；
//! 校验失败的内容不会进入流水线。

use serde::{Deserialize, Serialize};

/// 测验题目总数
pub const QUIZ_LENGTH: usize = 15;
/// 前 10 题为概念题（easy → medium → hard），其余为编程题
pub const CONCEPT_QUESTION_COUNT: usize = 10;
/// 每道测验题至少的选项数
pub const MIN_OPTIONS: usize = 4;

/// 输出结构校验
pub trait Validate {
    /// 返回 `Err(描述)` 表示结构不合法
    fn validate(&self) -> Result<(), String>;
}

/// 背景理论
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryPayload {
    pub theory: String,
}

impl Validate for TheoryPayload {
    fn validate(&self) -> Result<(), String> {
        if self.theory.trim().is_empty() {
            return Err("`theory` is empty".to_string());
        }
        Ok(())
    }
}

/// 概念流程图（文本形式，按重要程度排序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowchartPayload {
    pub flowchart: String,
}

impl Validate for FlowchartPayload {
    fn validate(&self) -> Result<(), String> {
        if self.flowchart.trim().is_empty() {
            return Err("`flowchart` is empty".to_string());
        }
        Ok(())
    }
}

/// 题目难度，顺序即难度递增顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Coding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub difficulty: Difficulty,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer_index).map(String::as_str)
    }
}

/// 测验
///
/// 要么恰好 15 道满足难度顺序的题目，要么是空测验（生成失败时的兜底）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizPayload {
    pub quiz: Vec<QuizQuestion>,
}

impl QuizPayload {
    /// 生成失败时返回的空测验
    pub fn empty() -> Self {
        Self { quiz: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.quiz.is_empty()
    }
}

impl Validate for QuizPayload {
    fn validate(&self) -> Result<(), String> {
        if self.quiz.len() != QUIZ_LENGTH {
            return Err(format!(
                "expected {} questions, got {}",
                QUIZ_LENGTH,
                self.quiz.len()
            ));
        }

        let mut previous = Difficulty::Easy;
        for (idx, q) in self.quiz.iter().enumerate() {
            let number = idx + 1;
            if q.question.trim().is_empty() {
                return Err(format!("question {number} has no text"));
            }
            if q.options.len() < MIN_OPTIONS {
                return Err(format!(
                    "question {number} has {} options, at least {MIN_OPTIONS} required",
                    q.options.len()
                ));
            }
            if q.correct_answer_index >= q.options.len() {
                return Err(format!(
                    "question {number}: correctAnswerIndex {} out of range [0, {}]",
                    q.correct_answer_index,
                    q.options.len() - 1
                ));
            }

            if idx < CONCEPT_QUESTION_COUNT {
                if q.difficulty == Difficulty::Coding {
                    return Err(format!("question {number} must not be a coding question"));
                }
                if q.difficulty < previous {
                    return Err(format!(
                        "question {number} is {:?} after a {:?} question",
                        q.difficulty, previous
                    ));
                }
                previous = q.difficulty;
            } else if q.difficulty != Difficulty::Coding {
                return Err(format!("question {number} must be a coding question"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperQuestion {
    pub question_text: String,
    pub marks: f64,
}

/// 仿照样卷生成的试卷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionPaperPayload {
    pub questions: Vec<PaperQuestion>,
}

impl QuestionPaperPayload {
    pub fn total_marks(&self) -> f64 {
        self.questions.iter().map(|q| q.marks).sum()
    }
}

impl Validate for QuestionPaperPayload {
    fn validate(&self) -> Result<(), String> {
        if self.questions.is_empty() {
            return Err("paper contains no questions".to_string());
        }
        for (idx, q) in self.questions.iter().enumerate() {
            if q.question_text.trim().is_empty() {
                return Err(format!("question {} has no text", idx + 1));
            }
            if !q.marks.is_finite() || q.marks <= 0.0 {
                return Err(format!("question {} has invalid marks {}", idx + 1, q.marks));
            }
        }
        Ok(())
    }
}
