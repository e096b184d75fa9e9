//! 集成测试公用的假生成客户端

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use topic_tutor::services::{RetryPolicy, TaskExecutor};
use topic_tutor::{
    CompletionRequest, GenerationClient, GenerationError, GenerationOutcome, GenerationService,
};

/// 一次预设响应：成功文本 / 失败 / 延迟后返回
pub enum Scripted {
    Ok(String),
    Err(&'static str),
    Slow(Duration, String),
}

#[derive(Default)]
pub struct FakeModel {
    replies: Mutex<HashMap<&'static str, VecDeque<Scripted>>>,
    prompts: Mutex<Vec<(&'static str, String)>>,
}

impl FakeModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, task: &'static str, reply: Scripted) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(task)
            .or_default()
            .push_back(reply);
        self
    }

    pub fn ok(&self, task: &'static str, body: serde_json::Value) -> &Self {
        self.reply(task, Scripted::Ok(body.to_string()))
    }

    pub fn calls(&self, task: &str) -> usize {
        self.prompts.lock().unwrap().iter().filter(|(t, _)| *t == task).count()
    }

    pub fn total_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self, task: &str) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(t, _)| *t == task)
            .map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl GenerationClient for FakeModel {
    async fn complete(&self, request: &CompletionRequest) -> GenerationOutcome<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((request.task, request.rendered_prompt.clone()));
        let next = self
            .replies
            .lock()
            .unwrap()
            .get_mut(request.task)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Ok(text)) => Ok(text),
            Some(Scripted::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Scripted::Err(message)) => Err(GenerationError::transport(request.task, message)),
            None => Err(GenerationError::transport(request.task, "503 Service Unavailable")),
        }
    }
}

pub fn service(model: Arc<FakeModel>) -> GenerationService {
    GenerationService::with_executor(TaskExecutor::new(
        model,
        RetryPolicy::new(3, Duration::ZERO),
        Duration::from_secs(5),
    ))
}

/// 一份合法的 15 题测验
pub fn quiz_json() -> serde_json::Value {
    let difficulties = ["easy", "easy", "easy", "medium", "medium", "medium", "medium", "hard", "hard", "hard"]
        .into_iter()
        .chain(std::iter::repeat("coding").take(5));

    let quiz: Vec<_> = difficulties
        .enumerate()
        .map(|(i, difficulty)| {
            json!({
                "question": format!("Question {}", i + 1),
                "options": ["O(1)", "O(n)", "O(log n)", "O(n^2)"],
                "correctAnswerIndex": 1,
                "difficulty": difficulty,
                "explanation": "Linear scan touches every element once."
            })
        })
        .collect();

    json!({ "quiz": quiz })
}
