// OAuth2 授权码流程
//
// 授权 URL 构造、授权码换取令牌、刷新令牌、获取用户信息

use crate::auth::constants::{ALL_SCOPE, STATE_LENGTH};
use crate::auth::random::generate_random_string;
use crate::auth::{Token, UserInfo};
use crate::docs::DocsClient;
use crate::error::{DocsError, Result};
use crate::logging::mask_secret;
use crate::transport::{decode_envelope, form_content_type};
use reqwest::header::HeaderMap;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, error, info};

impl DocsClient {
    /// 构造用户授权 URL
    ///
    /// 配置了固定 state 时直接使用，否则随机生成 16 位 state 用于防止 CSRF。
    pub fn auth_url(&self) -> Result<String> {
        let config = self.config();
        let state = match config.random_state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => state.to_string(),
            None => generate_random_string(STATE_LENGTH)?,
        };

        let mut url = Url::parse(&config.endpoints.auth).map_err(|e| {
            DocsError::invalid(format!("无效的授权地址 {}: {}", config.endpoints.auth, e))
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", ALL_SCOPE)
            .append_pair("state", &state);

        Ok(url.into())
    }

    /// 使用授权码换取访问令牌
    ///
    /// 如果配置了初始令牌，直接返回初始令牌，不发起请求。
    /// 返回的令牌不会自动设置到客户端，需要调用 [`DocsClient::set_token`]。
    pub async fn exchange_token(&self, code: &str) -> Result<Token> {
        let config = self.config();
        if let Some(token) = config
            .initial_token
            .as_ref()
            .filter(|t| t.has_access_token())
        {
            info!("已配置初始令牌，跳过授权码换取");
            return Ok(token.clone());
        }

        if code.is_empty() {
            return Err(DocsError::invalid("授权码不能为空"));
        }

        let form = vec![
            ("client_id".to_string(), config.client_id.clone()),
            ("client_secret".to_string(), config.client_secret.clone()),
            ("code".to_string(), code.to_string()),
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("redirect_uri".to_string(), config.redirect_uri.clone()),
        ];

        let token = self.request_token(&form).await.map_err(|e| {
            error!("授权码换取令牌失败: {}", e);
            e
        })?;
        info!(
            "授权码换取令牌成功, user_id={}, access_token={}",
            token.user_id,
            mask_secret(&token.access_token)
        );
        Ok(token)
    }

    /// 使用刷新令牌获取新的访问令牌
    ///
    /// 新令牌同样不会自动替换客户端当前的令牌。
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token> {
        if refresh_token.is_empty() {
            return Err(DocsError::invalid("刷新令牌不能为空"));
        }

        let config = self.config();
        let form = vec![
            ("client_id".to_string(), config.client_id.clone()),
            ("client_secret".to_string(), config.client_secret.clone()),
            ("refresh_token".to_string(), refresh_token.to_string()),
            ("grant_type".to_string(), "refresh_token".to_string()),
        ];

        let token = self.request_token(&form).await.map_err(|e| {
            error!("刷新令牌失败: {}", e);
            e
        })?;
        info!("刷新令牌成功, expires_in={}", token.expires_in);
        Ok(token)
    }

    /// 获取当前用户信息
    pub async fn user_info(&self) -> Result<UserInfo> {
        let token = self.require_token()?;

        let endpoint = &self.config().endpoints.user_info;
        let mut url = Url::parse(endpoint)
            .map_err(|e| DocsError::invalid(format!("无效的用户信息地址 {}: {}", endpoint, e)))?;
        url.query_pairs_mut()
            .append_pair("access_token", &token.access_token);

        let value = self.transport().get_json(url.as_str(), HeaderMap::new()).await?;
        let info: UserInfo = decode_envelope(value)?;

        debug!("获取用户信息成功: open_id={}, nick={}", info.open_id, info.nick);
        Ok(info)
    }

    async fn request_token(&self, form: &[(String, String)]) -> Result<Token> {
        let mut headers = HeaderMap::new();
        form_content_type(&mut headers);

        let value = self
            .transport()
            .post_form_json(&self.config().endpoints.token, form, headers)
            .await?;
        parse_token_response(value)
    }
}

/// 解析 Token 端点响应（不带 ret/msg/data 包装）
fn parse_token_response(value: Value) -> Result<Token> {
    let ret = value.get("ret").and_then(Value::as_i64).unwrap_or(0);
    if ret != 0 {
        let msg = value
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(DocsError::RemoteApi { ret, msg });
    }

    if let Some(err) = value.get("error").and_then(Value::as_str) {
        let description = value
            .get("error_description")
            .and_then(Value::as_str)
            .unwrap_or(err);
        return Err(DocsError::RemoteApi {
            ret: -1,
            msg: format!("{}: {}", err, description),
        });
    }

    let token: Token = serde_json::from_value(value)?;
    if !token.has_access_token() {
        return Err(DocsError::RemoteApi {
            ret: -1,
            msg: "响应中缺少 access_token".to_string(),
        });
    }
    Ok(token)
}
