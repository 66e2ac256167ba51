//! 报告写入服务 - 业务能力层
//!
//! 只负责"把报告写到磁盘"能力

use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::error::ReportError;
use crate::models::RunReport;

/// JSON 报告写入服务
pub struct ReportWriter {
    report_path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            report_path: path.into(),
        }
    }

    /// 写入报告（覆盖已有文件），必要时创建父目录
    pub async fn write(&self, report: &RunReport) -> Result<(), ReportError> {
        let content = serde_json::to_string_pretty(&report.to_document())?;
        debug!("写入报告: {} ({} 字节)", self.report_path.display(), content.len());

        if let Some(parent) = self.report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ReportError::WriteFailed {
                    path: self.report_path.clone(),
                    source,
                })?;
        }

        tokio::fs::write(&self.report_path, content)
            .await
            .map_err(|source| ReportError::WriteFailed {
                path: self.report_path.clone(),
                source,
            })
    }
}

impl ReportWriter {
    /// 尽力写入：失败只记录日志，返回是否写入成功
    pub async fn persist(&self, report: &RunReport) -> bool {
        match self.write(report).await {
            Ok(()) => {
                info!("📄 报告已导出至 {}", self.report_path.display());
                true
            }
            Err(e) => {
                error!("⚠️ 报告导出失败: {}", e);
                false
            }
        }
    }
}
