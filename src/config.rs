use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 默认配置文件名（存在时自动加载）
pub const DEFAULT_CONFIG_FILE: &str = "automation.toml";

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 是否以无头模式启动浏览器
    pub headless: bool,
    /// 每个任务的最大尝试次数
    pub retry_count: u32,
    /// 两次尝试之间的固定间隔（毫秒）
    pub retry_delay_ms: u64,
    /// 默认等待超时（秒）
    pub timeout_secs: u64,
    /// AJAX 内容的等待上限（秒）
    pub ajax_timeout_secs: u64,
    /// 延迟加载按钮的等待上限（秒）
    pub load_delay_timeout_secs: u64,
    /// 失败时是否截图
    pub screenshots_enabled: bool,
    /// 截图目录
    pub screenshot_dir: String,
    /// 是否并行执行任务
    pub parallel_enabled: bool,
    /// 并行模式下的最大并发数
    pub max_workers: usize,
    /// JSON 报告文件
    pub report_file: String,
    /// 目标站点
    pub base_url: String,
    /// 文本输入任务使用的文本
    pub text_input_value: String,
    /// 浏览器调试端口（设置后连接已有浏览器，而不是新启动一个）
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 只运行该 URL 对应的任务
    pub auto_run_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            headless: false,
            retry_count: 3,
            retry_delay_ms: 500,
            timeout_secs: 10,
            ajax_timeout_secs: 20,
            load_delay_timeout_secs: 15,
            screenshots_enabled: true,
            screenshot_dir: "screenshots".to_string(),
            parallel_enabled: false,
            max_workers: 3,
            report_file: "automation_report.json".to_string(),
            base_url: "https://uitestingplayground.com".to_string(),
            text_input_value: "Automation Test".to_string(),
            browser_debug_port: None,
            chrome_executable: None,
            auto_run_url: None,
        }
    }
}

impl Config {
    /// 按 默认值 → TOML 文件 → 环境变量 的顺序加载配置
    ///
    /// `path` 为空时尝试当前目录下的 `automation.toml`，不存在则跳过
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_toml_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取配置，缺失字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 仅使用环境变量覆盖默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        Self {
            headless: env_parse("AUTOMATION_HEADLESS").unwrap_or(self.headless),
            retry_count: env_parse("RETRY_COUNT").unwrap_or(self.retry_count),
            retry_delay_ms: env_parse("RETRY_DELAY_MS").unwrap_or(self.retry_delay_ms),
            timeout_secs: env_parse("BROWSER_TIMEOUT").unwrap_or(self.timeout_secs),
            ajax_timeout_secs: env_parse("AJAX_TIMEOUT").unwrap_or(self.ajax_timeout_secs),
            load_delay_timeout_secs: env_parse("LOAD_DELAY_TIMEOUT").unwrap_or(self.load_delay_timeout_secs),
            screenshots_enabled: env_parse("SCREENSHOTS_ENABLED").unwrap_or(self.screenshots_enabled),
            screenshot_dir: std::env::var("SCREENSHOT_DIR").unwrap_or(self.screenshot_dir),
            parallel_enabled: env_parse("PARALLEL_ENABLED").unwrap_or(self.parallel_enabled),
            max_workers: env_parse("MAX_WORKERS").unwrap_or(self.max_workers),
            report_file: std::env::var("REPORT_FILENAME").unwrap_or(self.report_file),
            base_url: std::env::var("BASE_URL").unwrap_or(self.base_url),
            text_input_value: std::env::var("TEST_TEXT_INPUT").unwrap_or(self.text_input_value),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").or(self.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(self.chrome_executable),
            auto_run_url: self.auto_run_url,
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::Invalid {
                field: "max_workers",
                reason: "并发数必须大于 0".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "等待超时必须大于 0".to_string(),
            });
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "目标站点不能为空".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn ajax_timeout(&self) -> Duration {
        Duration::from_secs(self.ajax_timeout_secs)
    }

    pub fn load_delay_timeout(&self) -> Duration {
        Duration::from_secs(self.load_delay_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        PathBuf::from(&self.screenshot_dir)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_playground_script() {
        let config = Config::default();
        assert_eq!(config.retry_count, 3);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.retry_delay(), Duration::from_millis(500));
        assert!(config.screenshots_enabled);
        assert!(!config.parallel_enabled);
        assert_eq!(config.report_file, "automation_report.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            retry_count = 5
            parallel_enabled = true
            screenshot_dir = "shots"
            "#,
        )
        .unwrap();

        assert_eq!(config.retry_count, 5);
        assert!(config.parallel_enabled);
        assert_eq!(config.screenshot_dir(), PathBuf::from("shots"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.text_input_value, "Automation Test");
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = Config {
            max_workers: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "max_workers", .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Config::from_toml_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }
}
