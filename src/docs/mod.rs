// 文档 API 模块

pub mod client;
pub mod types;

pub use client::DocsClient;
pub use types::*;
