//! 测试用的脚本化生成客户端

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::{CompletionRequest, GenerationClient};
use crate::error::{GenerationError, GenerationOutcome};

/// 预设的一次响应
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }

    pub fn fail(s: impl Into<String>) -> Self {
        Reply::Fail(s.into())
    }

    pub fn delayed(delay: Duration, reply: Reply) -> Self {
        Reply::Delayed(delay, Box::new(reply))
    }
}

/// 按任务名称排队返回预设响应，并记录所有请求
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, task: &'static str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(task)
            .or_default()
            .push_back(reply);
    }

    pub fn call_count(&self, task: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.task == task).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self, task: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.task == task)
            .map(|c| c.rendered_prompt.clone())
            .collect()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> GenerationOutcome<String> {
        self.calls.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(request.task)
            .and_then(VecDeque::pop_front);

        let mut reply = match reply {
            Some(reply) => reply,
            None => return Err(GenerationError::transport(request.task, "no scripted reply")),
        };
        loop {
            match reply {
                Reply::Text(text) => return Ok(text),
                Reply::Fail(message) => return Err(GenerationError::transport(request.task, message)),
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
