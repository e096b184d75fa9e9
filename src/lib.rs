//! # Topic Tutor
//!
//! 输入一个主题，依次生成背景理论、概念流程图和测验；可以按样卷手动生成试卷
//!
//! ## 架构设计
//!
//! ### ① 生成服务边界（Clients）
//! - `clients/` - `GenerationClient` trait，以及 OpenAI 兼容实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 四个提示词任务 + 响应解析 + 带重试的任务执行器
//! - `GenerationService` - 对外的四个生成操作
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 阶段状态机与不可变快照
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session` - 自动链、重试、过期丢弃、试卷前置条件
//! - `orchestrator/aggregator` - 部分结果汇总
//!
//! ### ⑤ 入口（Server）
//! - `server` - HTTP 路由
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CompletionRequest, GenerationClient, OpenAiClient};
pub use config::Config;
pub use error::{ConfigError, GenerationError, GenerationOutcome};
pub use models::{GenerationResult, Stage};
pub use orchestrator::{LearningSession, PipelineBundle, RetryScope, SessionRegistry};
pub use server::{create_router, AppState};
pub use services::GenerationService;
pub use workflow::{SessionSnapshot, StageStatus};
