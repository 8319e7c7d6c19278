// 导出编排器
//
// 按 发起导出 → 轮询进度 → 下载文件 的顺序执行完整流程，
// 任一步骤失败都原样返回错误。

use crate::docs::DocsClient;
use crate::error::{DocsError, Result};
use crate::export::poller::{poll_until_complete, PollingConfig, ProgressCallback};
use crate::export::retriever::retrieve;
use crate::export::types::{
    DownloadedFile, ExportJob, ExportOutcome, ExportProgress, ExportType, PollOutcome,
};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 导出编排器
///
/// 只读持有客户端，同一个编排器可以并发执行多个导出任务。
#[derive(Clone)]
pub struct ExportOrchestrator {
    client: Arc<DocsClient>,
    polling: PollingConfig,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for ExportOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportOrchestrator")
            .field("client", &self.client)
            .field("polling", &self.polling)
            .field("has_progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl ExportOrchestrator {
    pub fn new(client: Arc<DocsClient>) -> Self {
        Self {
            client,
            polling: PollingConfig::default(),
            progress_callback: None,
        }
    }

    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// 设置进度回调，每次查询到进度后调用
    pub fn with_progress_callback(
        mut self,
        callback: impl Fn(&ExportProgress) + Send + Sync + 'static,
    ) -> Self {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn client(&self) -> &DocsClient {
        &self.client
    }

    pub fn polling(&self) -> &PollingConfig {
        &self.polling
    }

    /// 发起导出（可取消）
    pub async fn initiate(
        &self,
        document_id: &str,
        export_type: Option<ExportType>,
        cancel: &CancellationToken,
    ) -> Result<ExportJob> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DocsError::Cancelled),
            result = self.client.export_document(document_id, export_type) => result,
        }
    }

    /// 轮询直到完成或次数耗尽
    pub async fn poll(&self, job: &ExportJob, cancel: &CancellationToken) -> Result<PollOutcome> {
        poll_until_complete(
            &self.client,
            job,
            &self.polling,
            self.progress_callback.as_ref(),
            cancel,
        )
        .await
    }

    /// 下载已完成的导出文件
    pub async fn retrieve(
        &self,
        progress: &ExportProgress,
        save_dir: Option<&Path>,
    ) -> Result<DownloadedFile> {
        let url = progress
            .download_url
            .as_deref()
            .ok_or_else(|| DocsError::invalid("导出尚未完成，没有下载链接"))?;
        retrieve(self.client.transport(), url, save_dir).await
    }

    /// 导出并下载
    ///
    /// 轮询超时返回 [`ExportOutcome::TimedOut`]，不会尝试下载。
    /// 下载阶段不响应取消。
    pub async fn export_and_download(
        &self,
        document_id: &str,
        export_type: Option<ExportType>,
        save_dir: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<ExportOutcome> {
        let job = self.initiate(document_id, export_type, cancel).await?;
        info!(
            "开始轮询导出进度: document_id={}, operation_id={}",
            job.document_id(),
            job.operation_id()
        );

        let progress = match self.poll(&job, cancel).await? {
            PollOutcome::Completed(progress) => progress,
            PollOutcome::TimedOut(progress) => {
                warn!(
                    "导出未在限定次数内完成: document_id={}, 进度 {}%",
                    document_id, progress.progress
                );
                return Ok(ExportOutcome::TimedOut(progress));
            }
        };

        let file = self.retrieve(&progress, save_dir).await?;
        info!(
            "导出下载完成: document_id={}, path={:?}",
            document_id, file.path
        );
        Ok(ExportOutcome::Downloaded(file))
    }
}
