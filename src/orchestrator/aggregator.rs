//! 结果汇总器 - 编排层
//!
//! 按任务名收集结果（后写覆盖先写），结束时按声明顺序输出报告

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use crate::models::{ConfigSnapshot, RunReport, TaskKind, TaskOutcome};

/// 结果汇总器
///
/// 只由一个写入方持有；并行模式下结果通过 channel 送到这里
#[derive(Debug, Default)]
pub struct ResultAggregator {
    outcomes: HashMap<String, TaskOutcome>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个任务结果，返回被覆盖的旧结果
    pub fn record(&mut self, outcome: TaskOutcome) -> Option<TaskOutcome> {
        let previous = self.outcomes.insert(outcome.task_name.clone(), outcome);
        if let Some(prev) = &previous {
            warn!("⚠️ 任务 {} 重复上报，以最后一次为准", prev.task_name);
        }
        previous
    }

    pub fn get(&self, task_name: &str) -> Option<&TaskOutcome> {
        self.outcomes.get(task_name)
    }

    /// 生成报告
    ///
    /// 输出顺序由 `expected` 决定，与完成顺序无关；没有上报的任务记为失败
    pub fn finish(
        mut self,
        expected: &[TaskKind],
        total_duration: Duration,
        configuration: ConfigSnapshot,
    ) -> RunReport {
        let outcomes = expected
            .iter()
            .map(|kind| {
                self.outcomes.remove(kind.name()).unwrap_or_else(|| {
                    warn!("⚠️ 任务 {} 没有上报结果，记为失败", kind);
                    TaskOutcome::failed(*kind, Duration::ZERO).with_detail("没有上报结果")
                })
            })
            .collect();

        for name in self.outcomes.keys() {
            warn!("⚠️ 忽略未计划的任务结果: {}", name);
        }

        RunReport::new(outcomes, total_duration, configuration)
    }
}
