use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};

/// 启动浏览器
///
/// 根据配置决定是否无头模式，返回浏览器和后台事件处理任务
pub async fn launch_browser(config: &Config) -> AppResult<(Browser, JoinHandle<()>)> {
    info!(
        "🚀 启动浏览器 ({})...",
        if config.headless { "无头模式" } else { "有界面模式" }
    );

    let mut builder = BrowserConfig::builder();
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = &config.chrome_executable {
        debug!("使用浏览器可执行文件: {}", executable);
        builder = builder.chrome_executable(Path::new(executable));
    }

    let browser_config = builder
        .args(vec![
            "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage", // 防止共享内存不足
            "--disable-gpu",
        ])
        .build()
        .map_err(|message| {
            error!("配置浏览器失败: {}", message);
            AppError::Browser(BrowserError::ConfigurationFailed { message })
        })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::browser_launch_failed(e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    Ok((browser, handler_task))
}
