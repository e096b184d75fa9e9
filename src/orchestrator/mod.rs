//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `session` - 学习会话
//! - 按 theory → flowchart → quiz 的顺序运行自动链
//! - 单阶段重试、过期结果丢弃、试卷阶段的前置条件
//! - 通过 `watch` 通道发布快照
//!
//! ### `aggregator` - 部分结果汇总
//! - 合并三个阶段的结果，判断是否全部失败
//! - 生成失败阶段的展示错误
//!
//! ### `registry` - 会话注册表
//! - 主题 → 会话，仅存在内存中
//!
//! ## 层次关系
//!
//! ```text
//! server (HTTP 入口)
//!     ↓
//! registry → session (处理一个主题)
//!     ↓
//! workflow::SessionState (阶段状态机 + 快照)
//!     ↓
//! services::GenerationService (能力层：四个生成操作)
//!     ↓
//! clients::GenerationClient (生成服务边界)
//! ```

pub mod aggregator;
pub mod registry;
pub mod session;

pub use aggregator::{BundleStatus, PipelineBundle, StageErrorMessage};
pub use registry::SessionRegistry;
pub use session::{LearningSession, RetryScope};
