//! 会话注册表
//!
//! 每个主题对应一个独立的 `LearningSession`，只保存在内存中，进程退出即丢失。
//! 创建新会话前会清理空闲超时的会话；超过容量上限时淘汰最久未访问的会话。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::info;

use crate::config::Config;
use crate::orchestrator::session::LearningSession;
use crate::services::GenerationService;

const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_CAPACITY: usize = 256;

struct SessionEntry {
    session: Arc<LearningSession>,
    last_access: Instant,
}

pub struct SessionRegistry {
    service: GenerationService,
    idle_ttl: Duration,
    capacity: usize,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(service: GenerationService) -> Self {
        Self::with_limits(service, DEFAULT_IDLE_TTL, DEFAULT_CAPACITY)
    }

    pub fn from_config(service: GenerationService, config: &Config) -> Self {
        Self::with_limits(service, config.session_ttl(), config.max_sessions)
    }

    /// # 参数
    /// - `idle_ttl`: 空闲超过该时长的会话会被清理
    /// - `capacity`: 会话数量上限（至少为 1）
    pub fn with_limits(service: GenerationService, idle_ttl: Duration, capacity: usize) -> Self {
        Self {
            service,
            idle_ttl,
            capacity: capacity.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// 获取主题对应的会话，不存在时创建
    ///
    /// # 参数
    /// - `topic`: 主题（首尾空白会被去掉）
    pub async fn get_or_create(&self, topic: &str) -> Arc<LearningSession> {
        let topic = topic.trim();
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        if let Some(entry) = sessions.get_mut(topic) {
            entry.last_access = now;
            return entry.session.clone();
        }

        self.evict(&mut sessions, now);

        info!("🆕 创建学习会话: {}", topic);
        let session = Arc::new(LearningSession::new(topic, self.service.clone()));
        sessions.insert(
            topic.to_string(),
            SessionEntry {
                session: session.clone(),
                last_access: now,
            },
        );
        session
    }

    pub async fn get(&self, topic: &str) -> Option<Arc<LearningSession>> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(topic.trim()).map(|entry| {
            entry.last_access = Instant::now();
            entry.session.clone()
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// 清理空闲会话，并为即将插入的新会话腾出位置
    fn evict(&self, sessions: &mut HashMap<String, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_access) < self.idle_ttl);

        while sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(topic, _)| topic.clone());
            match oldest {
                Some(topic) => {
                    sessions.remove(&topic);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("🧹 清理了 {} 个学习会话，剩余 {} 个", evicted, sessions.len());
        }
    }
}
