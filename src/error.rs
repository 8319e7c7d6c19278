//! 错误类型定义
//!
//! 所有库接口统一返回 [`DocsError`]，调用方可以根据错误种类
//! （参数错误、未认证、网络错误、接口错误、元数据错误、取消）决定是否重试整个流程。
//!
//! 注意：导出轮询次数耗尽不是错误，见 [`crate::export::PollOutcome::TimedOut`]。

use thiserror::Error;

/// 库内统一的 Result 别名
pub type Result<T> = std::result::Result<T, DocsError>;

/// 腾讯文档客户端错误
#[derive(Debug, Error)]
pub enum DocsError {
    /// 调用方传入了空的必填字段（文档ID、操作ID、下载链接等）
    #[error("参数无效: {0}")]
    InvalidArgument(String),

    /// 需要访问令牌但尚未设置
    #[error("未设置访问令牌，请先完成授权")]
    Unauthenticated,

    /// 网络失败或 HTTP 状态码非 2xx
    #[error("{}", transport_message(.status, .message))]
    Transport {
        /// HTTP 状态码（连接失败等情况下为 None）
        status: Option<u16>,
        /// 错误描述或响应体
        message: String,
    },

    /// HTTP 成功但响应包 ret != 0
    #[error("接口返回错误: {msg} (ret={ret})")]
    RemoteApi { ret: i64, msg: String },

    /// 必需的响应元数据缺失或格式错误（例如文件名）
    #[error("响应元数据错误: {0}")]
    Metadata(String),

    /// JSON 解析失败
    #[error("解析响应失败: {0}")]
    Decode(#[from] serde_json::Error),

    /// 本地文件读写失败
    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    /// 调用方取消了流程
    #[error("操作已取消")]
    Cancelled,

    /// 系统随机源不可用
    #[error("随机数生成失败: {0}")]
    Entropy(String),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP 请求失败，状态码: {}, {}", code, message),
        None => format!("HTTP 请求失败: {}", message),
    }
}

impl DocsError {
    /// 构造带状态码的传输错误
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata(message.into())
    }

    /// 远端接口返回的错误码（仅 RemoteApi 有）
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            Self::RemoteApi { ret, .. } => Some(*ret),
            _ => None,
        }
    }

    /// 整个流程稍后重试是否可能成功
    ///
    /// 连接失败和 5xx 视为可重试；4xx、参数错误、接口业务错误不可重试。
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(code), ..
            } => *code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DocsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
