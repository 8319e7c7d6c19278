// 文档导出模块
//
// 异步导出流程：发起导出 → 轮询进度 → 下载文件

mod initiator;
pub mod orchestrator;
pub mod poller;
pub mod retriever;
pub mod types;

pub use orchestrator::ExportOrchestrator;
pub use poller::{poll_until_complete, PollingConfig, ProgressCallback};
pub use retriever::{filename_from_content_disposition, retrieve};
pub use types::{
    DownloadedFile, ExportJob, ExportOutcome, ExportProgress, ExportType, PollOutcome,
};
