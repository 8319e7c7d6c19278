// 文档 API 数据类型

use crate::error::{DocsError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 文档列表单页最大条数
pub const MAX_LIST_LIMIT: u32 = 20;

/// 列表类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// 文件夹
    #[default]
    Folder,
    /// 文件
    File,
    /// 全部
    All,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
            Self::All => "all",
        }
    }
}

impl FromStr for ListType {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "folder" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            "all" => Ok(Self::All),
            other => Err(DocsError::invalid(format!("未知的列表类型: {}", other))),
        }
    }
}

/// 列表排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    /// 最近浏览
    #[default]
    Browse,
    /// 修改时间
    Time,
    /// 名称
    Name,
}

impl SortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browse => "browse",
            Self::Time => "time",
            Self::Name => "name",
        }
    }
}

impl FromStr for SortType {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "browse" => Ok(Self::Browse),
            "time" => Ok(Self::Time),
            "name" => Ok(Self::Name),
            other => Err(DocsError::invalid(format!("未知的排序方式: {}", other))),
        }
    }
}

/// 搜索类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// 标题搜索
    #[default]
    Title,
    /// 所有者搜索
    Owner,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Owner => "owner",
        }
    }
}

impl FromStr for SearchType {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "owner" => Ok(Self::Owner),
            other => Err(DocsError::invalid(format!("未知的搜索类型: {}", other))),
        }
    }
}

/// 文档/文件夹信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    #[serde(rename = "ID")]
    pub id: String,
    pub title: String,
    /// folder/doc/sheet 等
    #[serde(rename = "type")]
    pub doc_type: String,
    pub url: String,
    pub status: String,
    /// personal/external
    pub file_source: String,
    pub is_creator: bool,
    pub creator_name: String,
    pub is_owner: bool,
    pub owner_name: String,
    /// 时间戳（秒）
    pub create_time: i64,
    pub last_modify_time: i64,
    pub last_browse_time: i64,
    pub starred: bool,
    pub pinned: bool,
    pub is_collaborated: bool,
}

/// 文档列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentList {
    /// 下一页起始位置
    pub next: i64,
    pub list: Vec<Document>,
}

/// 列表参数
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub list_type: ListType,
    pub sort_type: SortType,
    /// 1: 正序 0: 倒序
    pub asc: u8,
    /// 文件夹ID，为空时表示根目录
    pub folder_id: String,
    pub start: u32,
    /// 每页数量，0 或超过 20 时按 20 处理
    pub limit: u32,
    /// 1: 所有文件 2: 仅自己拥有的
    pub is_owner: u8,
    /// 文件类型过滤（多个用 - 分隔）
    pub file_type: Option<String>,
}

/// 搜索到的文档信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchDocument {
    #[serde(rename = "ID")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub url: String,
    pub status: String,
    pub owner_name: String,
    /// enterprise/personal
    pub file_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    pub last_modify_time: i64,
    pub last_modify_name: String,
    pub create_time: i64,
}

/// 搜索结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    /// 下一次请求的偏移量
    pub next: i64,
    /// 总匹配数
    pub total: i64,
    pub has_more: bool,
    pub list: Vec<SearchDocument>,
}

/// 搜索参数
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// 搜索关键字（必填）
    pub search_key: String,
    pub search_type: SearchType,
    /// all: 所有 folder: 只返回文件夹
    pub result_type: Option<String>,
    /// 搜索范围文件夹ID，空表示所有文件
    pub folder_id: String,
    pub offset: u32,
    /// 返回条目数量（服务端默认 20，最大 50）
    pub size: u32,
    /// modify/create/browse
    pub sort_type: Option<String>,
    pub asc: u8,
    pub by_ownership: u8,
    /// 文件类型过滤，多种用 - 分隔，如 doc-sheet
    pub file_types: Option<String>,
}

/// 文件元数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileMetadata {
    #[serde(rename = "ID")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub url: String,
    /// normal/deleted 等
    pub status: String,
    pub is_creator: bool,
    pub create_time: i64,
    pub creator_name: String,
    pub is_owner: bool,
    pub owner_name: String,
    pub last_modify_time: i64,
    pub last_modify_name: String,
    #[serde(rename = "ownerID")]
    pub owner_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_from_str() {
        assert_eq!("all".parse::<ListType>().unwrap(), ListType::All);
        assert_eq!("File".parse::<ListType>().unwrap(), ListType::File);
        assert_eq!("NAME".parse::<SortType>().unwrap(), SortType::Name);
        assert_eq!("owner".parse::<SearchType>().unwrap(), SearchType::Owner);
    }

    #[test]
    fn test_enum_from_str_round_trips_as_str() {
        for t in [ListType::Folder, ListType::File, ListType::All] {
            assert_eq!(t.as_str().parse::<ListType>().unwrap(), t);
        }
        for t in [SortType::Browse, SortType::Time, SortType::Name] {
            assert_eq!(t.as_str().parse::<SortType>().unwrap(), t);
        }
        for t in [SearchType::Title, SearchType::Owner] {
            assert_eq!(t.as_str().parse::<SearchType>().unwrap(), t);
        }
    }

    #[test]
    fn test_enum_from_str_rejects_unknown() {
        assert!(matches!(
            "bogus".parse::<ListType>(),
            Err(DocsError::InvalidArgument(_))
        ));
        assert!(matches!(
            "".parse::<SortType>(),
            Err(DocsError::InvalidArgument(_))
        ));
        assert!(matches!(
            "content".parse::<SearchType>(),
            Err(DocsError::InvalidArgument(_))
        ));
    }
}
