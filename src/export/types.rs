//! 文档导出数据类型定义
//!
//! 本模块定义了异步导出流程相关的数据结构，包括：
//! - 导出格式
//! - 导出任务（文档ID + 操作ID）
//! - 进度快照
//! - 轮询结果与整体流程结果

use crate::error::{DocsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// 进度完成值
pub const PROGRESS_COMPLETE: u32 = 100;

// =====================================================
// 导出格式
// =====================================================

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Pdf,
    Docx,
    Xlsx,
    Pptx,
}

impl ExportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pptx => "pptx",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportType {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "xlsx" => Ok(Self::Xlsx),
            "pptx" => Ok(Self::Pptx),
            other => Err(DocsError::invalid(format!("不支持的导出格式: {}", other))),
        }
    }
}

// =====================================================
// 导出任务
// =====================================================

/// 导出任务
///
/// 由文档ID和服务端分配的操作ID唯一确定，创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportJob {
    document_id: String,
    operation_id: String,
}

impl ExportJob {
    /// 创建导出任务，两个ID都不能为空
    pub fn new(document_id: impl Into<String>, operation_id: impl Into<String>) -> Result<Self> {
        let document_id = document_id.into();
        let operation_id = operation_id.into();

        if document_id.is_empty() {
            return Err(DocsError::invalid("文档ID不能为空"));
        }
        if operation_id.is_empty() {
            return Err(DocsError::invalid("操作ID不能为空"));
        }

        Ok(Self {
            document_id,
            operation_id,
        })
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }
}

// =====================================================
// 进度快照
// =====================================================

/// 导出进度快照
///
/// 每次查询得到一个独立的快照，客户端不保留历史。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportProgress {
    /// 进度百分比（0-100）
    pub progress: u32,
    /// 下载链接（仅在进度为 100 时存在）
    pub download_url: Option<String>,
}

impl ExportProgress {
    /// 是否已完成
    pub fn is_complete(&self) -> bool {
        self.progress >= PROGRESS_COMPLETE
    }
}

/// 导出进度接口返回的 data 字段
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProgressData {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub progress: i64,
}

impl TryFrom<ProgressData> for ExportProgress {
    type Error = DocsError;

    fn try_from(data: ProgressData) -> Result<Self> {
        let progress = data.progress.clamp(0, PROGRESS_COMPLETE as i64) as u32;
        let download_url = Some(data.url).filter(|u| !u.is_empty());

        if progress == PROGRESS_COMPLETE && download_url.is_none() {
            return Err(DocsError::metadata("导出已完成但响应中缺少下载链接"));
        }

        Ok(Self {
            progress,
            download_url,
        })
    }
}

// =====================================================
// 流程结果
// =====================================================

/// 轮询结果
///
/// 次数耗尽不是错误，调用方需要决定稍后重试还是放弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// 进度达到 100，携带下载链接
    Completed(ExportProgress),
    /// 轮询次数耗尽，携带最后一次快照
    TimedOut(ExportProgress),
}

/// 下载到本地的文件
///
/// 文件的所有权完全交给调用方，库不负责清理。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedFile {
    /// 从 Content-Disposition 解析出的文件名
    pub file_name: String,
    /// 本地完整路径
    pub path: PathBuf,
}

/// 导出并下载的整体结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// 下载完成
    Downloaded(DownloadedFile),
    /// 导出超时，未下载
    TimedOut(ExportProgress),
}
