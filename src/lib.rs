// Tencent Docs Rust Library
// 腾讯文档开放平台 Rust 客户端核心库

// 认证模块（OAuth2 授权码流程）
pub mod auth;

// 配置管理模块
pub mod config;

// 文档列表、搜索、元数据
pub mod docs;

// 错误类型
pub mod error;

// 异步导出与下载
pub mod export;

// 日志系统
pub mod logging;

// HTTP 传输层
pub mod transport;

#[cfg(test)]
mod test_support;

// 导出常用类型
pub use auth::{generate_random_number, generate_random_string, Token, UserInfo};
pub use config::{AppConfig, ClientConfig, EndpointConfig};
pub use docs::{
    Document, DocumentList, DocsClient, FileMetadata, ListParams, ListType, SearchDocument,
    SearchParams, SearchResult, SearchType, SortType,
};
pub use error::{DocsError, Result};
pub use export::{
    DownloadedFile, ExportJob, ExportOrchestrator, ExportOutcome, ExportProgress, ExportType,
    PollOutcome, PollingConfig,
};
pub use transport::{RawResponse, ReqwestTransport, Transport};

// 供调用方构造取消信号
pub use tokio_util::sync::CancellationToken;
