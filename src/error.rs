use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 页面交互错误
    #[error("交互错误: {0}")]
    Interaction(#[from] InteractionError),
    /// 报告写入错误
    #[error("报告错误: {0}")]
    Report(#[from] ReportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 调度器错误
    #[error("调度错误: {0}")]
    Scheduler(#[from] SchedulerError),
}

/// 浏览器相关错误
///
/// 这一类错误意味着根本拿不到可用的浏览器会话，属于进程级致命错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {message}")]
    ConfigurationFailed { message: String },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 页面交互错误
///
/// 前四种是瞬时错误（时序 / 竞态导致），会被重试策略重试；其余错误直接向上传播
#[derive(Debug, Clone, Error)]
pub enum InteractionError {
    /// 元素引用已失效（节点已从文档中移除）
    #[error("元素引用已失效: {detail}")]
    StaleReference { detail: String },
    /// 点击被其他元素拦截
    #[error("点击被拦截: {detail}")]
    Intercepted { detail: String },
    /// 元素不存在
    #[error("未找到元素: {locator}")]
    NotFound { locator: String },
    /// 等待超时
    #[error("等待 {locator} 超时 ({timeout_ms}ms)")]
    WaitTimeout { locator: String, timeout_ms: u64 },
    /// 导航失败
    #[error("导航到 {url} 失败: {message}")]
    Navigation { url: String, message: String },
    /// 截图失败
    #[error("截图失败 ({path}): {message}")]
    Screenshot { path: PathBuf, message: String },
    /// 其他浏览器协议错误
    #[error("浏览器协议错误: {0}")]
    Protocol(String),
}

impl InteractionError {
    /// 是否属于可重试的瞬时错误
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            InteractionError::StaleReference { .. }
                | InteractionError::Intercepted { .. }
                | InteractionError::NotFound { .. }
                | InteractionError::WaitTimeout { .. }
        )
    }

    /// 错误类型的简短名称（用于日志）
    pub fn kind(&self) -> &'static str {
        match self {
            InteractionError::StaleReference { .. } => "StaleReference",
            InteractionError::Intercepted { .. } => "Intercepted",
            InteractionError::NotFound { .. } => "NotFound",
            InteractionError::WaitTimeout { .. } => "WaitTimeout",
            InteractionError::Navigation { .. } => "Navigation",
            InteractionError::Screenshot { .. } => "Screenshot",
            InteractionError::Protocol(_) => "Protocol",
        }
    }
}

/// 报告写入错误
#[derive(Debug, Error)]
pub enum ReportError {
    /// 序列化失败
    #[error("报告序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    /// 写入文件失败
    #[error("写入报告文件失败 ({path}): {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 调度器错误
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// 每个调度器只允许运行一次
    #[error("调度器已经运行过，不能重复启动")]
    AlreadyStarted,
    /// 工作池信号量被关闭
    #[error("工作池已关闭")]
    PoolClosed,
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建浏览器启动错误
    pub fn browser_launch_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(source),
        })
    }

    /// 创建页面创建错误
    pub fn page_creation_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 页面交互结果类型
pub type InteractionResult<T> = Result<T, InteractionError>;
