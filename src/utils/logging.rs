/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则根据 `verbose_logging` 选择 debug / info
pub fn init(config: &Config) {
    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("topic_tutor={default_level},tower_http=info")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 主题学习生成服务");
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!(
        "🔁 每个任务最多尝试 {} 次，单次超时 {} 秒",
        config.max_attempts, config.request_timeout_secs
    );
    info!("🌐 监听地址: {}", config.server_addr);
    info!("{}", "=".repeat(60));
}

/// 记录一次完整流水线的结果
///
/// # 参数
/// - `topic`: 主题
/// - `succeeded`: 成功的阶段数量
/// - `total`: 阶段总数
pub fn log_pipeline_complete(topic: &str, succeeded: usize, total: usize) {
    info!("{}", "─".repeat(60));
    info!(
        "✓ [{}] 流水线完成: 成功 {}/{} 个阶段 ({})",
        truncate_text(topic, 40),
        succeeded,
        total,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
