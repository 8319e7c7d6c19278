// 腾讯文档客户端实现

use crate::auth::Token;
use crate::config::ClientConfig;
use crate::docs::types::{
    DocumentList, FileMetadata, ListParams, SearchParams, SearchResult, MAX_LIST_LIMIT,
};
use crate::error::{DocsError, Result};
use crate::transport::{decode_envelope, ReqwestTransport, Transport};
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info};

/// 腾讯文档客户端
///
/// 持有应用配置、传输层和当前凭证。凭证可以随时替换，
/// 但客户端不会在过期时自动刷新，刷新策略由调用方决定。
#[derive(Clone)]
pub struct DocsClient {
    /// 应用配置
    config: Arc<ClientConfig>,
    /// HTTP 传输层
    transport: Arc<dyn Transport>,
    /// 当前凭证
    token: Arc<RwLock<Option<Token>>>,
}

impl std::fmt::Debug for DocsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsClient")
            .field("client_id", &self.config.client_id)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl DocsClient {
    /// 创建新的客户端，使用默认的 reqwest 传输层
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        info!(
            "初始化腾讯文档客户端, client_id={}, timeout={}s",
            config.client_id, config.timeout_secs
        );
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// 使用自定义传输层创建客户端
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let token = config
            .initial_token
            .clone()
            .filter(|t| t.has_access_token());
        if token.is_some() {
            debug!("使用配置中的初始令牌");
        }

        Self {
            config: Arc::new(config),
            transport,
            token: Arc::new(RwLock::new(token)),
        }
    }

    /// 设置访问令牌
    pub fn set_token(&self, token: Token) {
        info!("更新访问令牌, user_id={}", token.user_id);
        *self.token.write() = Some(token);
    }

    /// 清除访问令牌
    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    /// 当前访问令牌
    pub fn token(&self) -> Option<Token> {
        self.token.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .as_ref()
            .map(|t| t.has_access_token())
            .unwrap_or(false)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// 当前凭证（必须带访问令牌）
    pub(crate) fn require_token(&self) -> Result<Token> {
        match self.token.read().as_ref() {
            Some(token) if token.has_access_token() => Ok(token.clone()),
            _ => Err(DocsError::Unauthenticated),
        }
    }

    /// 开放 API 的认证请求头 {Access-Token, Client-Id, Open-Id}
    pub(crate) fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.require_token()?;

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "access-token", &token.access_token)?;
        insert_header(&mut headers, "client-id", &self.config.client_id)?;
        insert_header(&mut headers, "open-id", &token.user_id)?;
        Ok(headers)
    }

    /// 拼接开放 API 地址
    ///
    /// 每个路径段单独编码，ID 中的 `/`、`?`、`#` 不会改变接口路径。
    pub(crate) fn api_url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let endpoint = &self.config.endpoints.api;
        let mut url = Url::parse(endpoint)
            .map_err(|e| DocsError::invalid(format!("无效的接口地址 {}: {}", endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| DocsError::invalid(format!("接口地址不能作为路径前缀: {}", endpoint)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    // ==================== 文档操作 ====================

    /// 获取文档列表
    ///
    /// 未指定的参数使用默认值：文件夹列表、按浏览时间排序、根目录、每页 20 条。
    pub async fn list_documents(&self, params: &ListParams) -> Result<DocumentList> {
        let headers = self.auth_headers()?;

        let limit = if params.limit == 0 || params.limit > MAX_LIST_LIMIT {
            MAX_LIST_LIMIT
        } else {
            params.limit
        };
        let folder_id = if params.folder_id.is_empty() {
            "/".to_string()
        } else {
            params.folder_id.clone()
        };

        let mut query = vec![
            ("listType", params.list_type.as_str().to_string()),
            ("sortType", params.sort_type.as_str().to_string()),
            ("asc", params.asc.to_string()),
            ("folderID", folder_id),
            ("start", params.start.to_string()),
            ("limit", limit.to_string()),
            ("isOwner", params.is_owner.to_string()),
        ];
        if let Some(file_type) = params.file_type.as_deref().filter(|s| !s.is_empty()) {
            query.push(("fileType", file_type.to_string()));
        }

        let url = self.api_url(&["drive", "v2", "filter"], &query)?;
        let value = self.transport.get_json(url.as_str(), headers).await?;
        let list: DocumentList = decode_envelope(value)?;

        debug!("获取文档列表成功: {} 条, next={}", list.list.len(), list.next);
        Ok(list)
    }

    /// 搜索文档
    pub async fn search_documents(&self, params: &SearchParams) -> Result<SearchResult> {
        if params.search_key.is_empty() {
            return Err(DocsError::invalid("搜索关键字不能为空"));
        }
        let headers = self.auth_headers()?;

        let mut query = vec![
            ("searchType", params.search_type.as_str().to_string()),
            ("searchKey", params.search_key.clone()),
            ("folderID", params.folder_id.clone()),
            ("byOwnership", params.by_ownership.to_string()),
            ("offset", params.offset.to_string()),
            ("size", params.size.to_string()),
        ];
        if let Some(result_type) = params.result_type.as_deref().filter(|s| !s.is_empty()) {
            query.push(("resultType", result_type.to_string()));
        }
        if let Some(file_types) = params.file_types.as_deref().filter(|s| !s.is_empty()) {
            query.push(("fileTypes", file_types.to_string()));
        }
        if let Some(sort_type) = params.sort_type.as_deref().filter(|s| !s.is_empty()) {
            query.push(("sortType", sort_type.to_string()));
        }
        if params.asc != 0 {
            query.push(("asc", params.asc.to_string()));
        }

        let url = self.api_url(&["drive", "v2", "search"], &query)?;
        let value = self.transport.get_json(url.as_str(), headers).await?;
        let result: SearchResult = decode_envelope(value)?;

        debug!(
            "搜索文档成功: key={}, total={}, has_more={}",
            params.search_key, result.total, result.has_more
        );
        Ok(result)
    }

    /// 获取文件元数据
    pub async fn file_metadata(&self, file_id: &str) -> Result<FileMetadata> {
        if file_id.is_empty() {
            return Err(DocsError::invalid("文件ID不能为空"));
        }
        let headers = self.auth_headers()?;

        let url = self.api_url(&["drive", "v2", "files", file_id, "metadata"], &[])?;
        let value = self.transport.get_json(url.as_str(), headers).await?;
        decode_envelope(value)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| DocsError::invalid(format!("请求头 {} 包含非法字符", name)))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
