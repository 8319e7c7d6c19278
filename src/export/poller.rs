// 导出进度轮询
//
// 每轮查询一次进度，未完成则等待固定间隔后继续，直到完成、次数耗尽或被取消。
// 单次查询失败直接返回错误，不做内部重试。

use crate::docs::DocsClient;
use crate::error::{DocsError, Result};
use crate::export::types::{ExportJob, ExportProgress, PollOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 进度回调，每次查询得到快照后调用
pub type ProgressCallback = Arc<dyn Fn(&ExportProgress) + Send + Sync>;

/// 轮询配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// 最大查询次数（至少为 1）
    pub max_attempts: u32,
    /// 两次查询之间的等待时间
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            interval: Duration::from_secs(2),
        }
    }
}

impl PollingConfig {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(DocsError::invalid("最大轮询次数必须大于 0"));
        }
        Ok(())
    }
}

/// 轮询导出进度直到完成
///
/// 查询 `max_attempts` 次仍未完成时返回 [`PollOutcome::TimedOut`]，
/// 期间共等待 `max_attempts - 1` 次。取消信号会同时中断进行中的查询和等待。
pub async fn poll_until_complete(
    client: &DocsClient,
    job: &ExportJob,
    config: &PollingConfig,
    on_progress: Option<&ProgressCallback>,
    cancel: &CancellationToken,
) -> Result<PollOutcome> {
    config.validate()?;

    let mut attempt: u32 = 0;
    let mut last_progress: Option<u32> = None;

    loop {
        attempt += 1;

        let progress = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("导出轮询已取消: operation_id={}, 第 {} 次查询", job.operation_id(), attempt);
                return Err(DocsError::Cancelled);
            }
            result = client.export_progress(job.document_id(), job.operation_id()) => result?,
        };

        if let Some(prev) = last_progress {
            if progress.progress < prev {
                warn!(
                    "导出进度回退: operation_id={}, {}% -> {}%",
                    job.operation_id(),
                    prev,
                    progress.progress
                );
            }
        }
        last_progress = Some(progress.progress);

        if let Some(callback) = on_progress {
            callback(&progress);
        }

        if progress.is_complete() {
            info!(
                "导出完成: operation_id={}, 共查询 {} 次",
                job.operation_id(),
                attempt
            );
            return Ok(PollOutcome::Completed(progress));
        }

        if attempt >= config.max_attempts {
            warn!(
                "导出轮询超时: operation_id={}, 已查询 {} 次, 最后进度 {}%，请稍后重试",
                job.operation_id(),
                attempt,
                progress.progress
            );
            return Ok(PollOutcome::TimedOut(progress));
        }

        debug!(
            "第 {}/{} 次查询进度 {}%，{:?} 后重试",
            attempt, config.max_attempts, progress.progress, config.interval
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("导出轮询已取消: operation_id={}, 等待中", job.operation_id());
                return Err(DocsError::Cancelled);
            }
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}
