use anyhow::{Context, Result};
use topic_tutor::utils::logging;
use topic_tutor::{create_router, AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(&config);
    logging::log_startup(&config);

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.server_addr))?;
    info!("🌐 服务已启动: http://{}", config.server_addr);

    axum::serve(listener, create_router(AppState::new(&config))).await?;

    Ok(())
}
