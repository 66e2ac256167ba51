use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::browser::{connect_to_browser, launch_browser};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ChromePage, SessionFactory};

/// Chromium 会话池
///
/// 唯一持有 Browser 的类型。每个会话对应一个新标签页，用完即关
pub struct ChromeSessions {
    browser: Browser,
    handler: JoinHandle<()>,
    screenshot_dir: PathBuf,
    /// 连接的是外部浏览器时，退出时不关闭它
    attached: bool,
}

impl ChromeSessions {
    /// 根据配置启动或连接浏览器
    pub async fn start(config: &Config) -> AppResult<Self> {
        let (browser, handler, attached) = match config.browser_debug_port {
            Some(port) => {
                let (browser, handler) = connect_to_browser(port).await?;
                (browser, handler, true)
            }
            None => {
                let (browser, handler) = launch_browser(config).await?;
                (browser, handler, false)
            }
        };

        Ok(Self {
            browser,
            handler,
            screenshot_dir: config.screenshot_dir(),
            attached,
        })
    }

    /// 创建新页面并导航
    pub async fn new_page(&self, url: &str) -> AppResult<ChromePage> {
        debug!("创建新页面: {}", url);
        let page = self.browser.new_page(url).await.map_err(|e| {
            error!("创建页面失败: {}", e);
            AppError::page_creation_failed(e)
        })?;
        Ok(ChromePage::new(page, self.screenshot_dir.clone()))
    }

    /// 关闭浏览器并停止事件处理任务
    pub async fn shutdown(mut self) {
        if !self.attached {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
        }
        self.handler.abort();
        info!("浏览器已关闭");
    }
}

#[async_trait]
impl SessionFactory for ChromeSessions {
    type Session = ChromePage;

    async fn open_session(&self) -> AppResult<ChromePage> {
        self.new_page("about:blank").await
    }

    async fn close_session(&self, session: ChromePage) {
        if let Err(e) = session.into_page().close().await {
            warn!("关闭页面失败: {}", e);
        }
    }
}
