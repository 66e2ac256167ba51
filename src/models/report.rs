use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};

use crate::config::Config;
use crate::models::outcome::{TaskOutcome, TaskStatus};

/// 本次运行使用的配置快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    pub retry_count: u32,
    pub timeout_secs: u64,
    pub parallel_enabled: bool,
    pub screenshots_enabled: bool,
    pub headless: bool,
    pub max_workers: usize,
}

impl From<&Config> for ConfigSnapshot {
    fn from(config: &Config) -> Self {
        Self {
            retry_count: config.retry_count,
            timeout_secs: config.timeout_secs,
            parallel_enabled: config.parallel_enabled,
            screenshots_enabled: config.screenshots_enabled,
            headless: config.headless,
            max_workers: config.max_workers,
        }
    }
}

/// 汇总统计
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub success_count: usize,
    pub failed_count: usize,
    /// 成功率（百分比，保留一位小数）
    pub success_rate: f64,
    pub total_duration: Duration,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[TaskOutcome], total_duration: Duration) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        let failed_count = outcomes.len() - success_count;
        Self {
            success_count,
            failed_count,
            success_rate: success_rate(success_count, outcomes.len()),
            total_duration,
        }
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }
}

/// 成功率 = 成功数 / 总数 * 100，保留一位小数；没有任务时为 0
pub fn success_rate(success: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = success as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

/// 一次运行的完整报告
#[derive(Debug, Clone)]
pub struct RunReport {
    /// 按任务声明顺序排列
    pub outcomes: Vec<TaskOutcome>,
    pub summary: RunSummary,
    pub configuration: ConfigSnapshot,
    pub timestamp: DateTime<Local>,
}

impl RunReport {
    pub fn new(
        outcomes: Vec<TaskOutcome>,
        total_duration: Duration,
        configuration: ConfigSnapshot,
    ) -> Self {
        let summary = RunSummary::from_outcomes(&outcomes, total_duration);
        Self {
            outcomes,
            summary,
            configuration,
            timestamp: Local::now(),
        }
    }

    pub fn outcome(&self, task_name: &str) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.task_name == task_name)
    }

    /// 转换为持久化的 JSON 文档
    pub fn to_document(&self) -> JsonValue {
        let mut results = Map::new();
        let mut metrics = Map::new();
        let mut artifacts = Map::new();

        for outcome in &self.outcomes {
            results.insert(outcome.task_name.clone(), json!(outcome.status.to_string()));
            metrics.insert(
                outcome.task_name.clone(),
                json!(format!("{:.2}s", outcome.duration.as_secs_f64())),
            );
            if let (TaskStatus::Failed, Some(path)) = (outcome.status, &outcome.diagnostic_artifact) {
                artifacts.insert(outcome.task_name.clone(), json!(path.display().to_string()));
            }
        }

        json!({
            "results": results,
            "performance_metrics": metrics,
            "diagnostic_artifacts": artifacts,
            "summary": {
                "total_success": self.summary.success_count,
                "total_failed": self.summary.failed_count,
                "success_rate": self.summary.success_rate,
                "execution_time": format!("{:.2} sec", self.summary.total_duration.as_secs_f64()),
            },
            "configuration": {
                "retry_count": self.configuration.retry_count,
                "timeout": self.configuration.timeout_secs,
                "parallel_enabled": self.configuration.parallel_enabled,
                "screenshots_enabled": self.configuration.screenshots_enabled,
                "headless": self.configuration.headless,
                "max_workers": self.configuration.max_workers,
            },
            "timestamp": self.timestamp.to_rfc3339(),
        })
    }

    /// 人类可读的汇总
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(60));
        let _ = writeln!(out, "EXECUTION SUMMARY");
        let _ = writeln!(out, "{}", "=".repeat(60));
        for outcome in &self.outcomes {
            let _ = writeln!(
                out,
                "{:<14} {:<8} {:>8.2}s",
                format!("{}:", outcome.task_name),
                outcome.status,
                outcome.duration.as_secs_f64()
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Total Success: {}", self.summary.success_count);
        let _ = writeln!(out, "Total Failed: {}", self.summary.failed_count);
        let _ = writeln!(out, "Success Rate: {:.1}%", self.summary.success_rate);
        let _ = write!(
            out,
            "Execution Time: {:.2} sec",
            self.summary.total_duration.as_secs_f64()
        );
        out
    }
}
