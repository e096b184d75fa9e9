use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
///
/// 优先级：环境变量 > `TUTOR_CONFIG` 指向的 TOML 文件 > 默认值
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 生成任务配置 ---
    /// 每个生成任务的最大尝试次数（含第一次）
    pub max_attempts: u32,
    /// 单次调用超时（秒）
    pub request_timeout_secs: u64,
    /// 两次尝试之间的等待（毫秒）
    pub retry_delay_ms: u64,
    // --- 服务配置 ---
    /// HTTP 监听地址
    pub server_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 会话配置 ---
    /// 会话空闲多久后被清理（秒）
    pub session_ttl_secs: u64,
    /// 同时保留的会话上限
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 4096,
            max_attempts: 3,
            request_timeout_secs: 60,
            retry_delay_ms: 500,
            server_addr: "127.0.0.1:9002".to_string(),
            verbose_logging: false,
            session_ttl_secs: 3600,
            max_sessions: 256,
        }
    }
}

impl Config {
    /// 从环境变量加载，`TUTOR_CONFIG` 存在时先读取该 TOML 文件
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("TUTOR_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 只从环境变量加载（未设置或无法解析的变量使用默认值）
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { message, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: String::new(),
            message: e.to_string(),
        })?;
        Ok(config.normalized())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            llm_api_key: env_or("LLM_API_KEY", self.llm_api_key),
            llm_api_base_url: env_or("LLM_API_BASE_URL", self.llm_api_base_url),
            llm_model_name: env_or("LLM_MODEL_NAME", self.llm_model_name),
            llm_temperature: env_parse_or("LLM_TEMPERATURE", self.llm_temperature),
            llm_max_tokens: env_parse_or("LLM_MAX_TOKENS", self.llm_max_tokens),
            max_attempts: env_parse_or("MAX_ATTEMPTS", self.max_attempts),
            request_timeout_secs: env_parse_or("REQUEST_TIMEOUT_SECS", self.request_timeout_secs),
            retry_delay_ms: env_parse_or("RETRY_DELAY_MS", self.retry_delay_ms),
            server_addr: env_or("SERVER_ADDR", self.server_addr),
            verbose_logging: env_parse_or("VERBOSE_LOGGING", self.verbose_logging),
            session_ttl_secs: env_parse_or("SESSION_TTL_SECS", self.session_ttl_secs),
            max_sessions: env_parse_or("MAX_SESSIONS", self.max_sessions),
        }
        .normalized()
    }

    fn normalized(mut self) -> Self {
        if self.max_attempts == 0 {
            self.max_attempts = 1;
        }
        if self.max_sessions == 0 {
            self.max_sessions = 1;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

fn env_or(name: &str, fallback: String) -> String {
    std::env::var(name).unwrap_or(fallback)
}

fn env_parse_or<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}
