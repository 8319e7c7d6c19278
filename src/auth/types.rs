// 认证模块数据类型定义

use serde::{Deserialize, Serialize};

/// 访问令牌（调用开放 API 的凭证）
///
/// 由调用方提供或通过授权码换取，客户端只读取，不会自动刷新。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 访问令牌
    #[serde(default)]
    pub access_token: String,
    /// 刷新令牌
    #[serde(default)]
    pub refresh_token: String,
    /// 有效期（秒）
    #[serde(default)]
    pub expires_in: i64,
    /// 令牌类型
    #[serde(default)]
    pub token_type: String,
    /// 用户 OpenID（请求头 Open-Id）
    #[serde(default)]
    pub user_id: String,
    /// 授权范围
    #[serde(default)]
    pub scope: String,
}

impl Token {
    /// 创建只包含访问令牌和用户ID的凭证
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// 是否携带可用的访问令牌
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// 用户信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    /// 用户唯一标识
    #[serde(rename = "openID", default)]
    pub open_id: String,
    /// 昵称
    #[serde(default)]
    pub nick: String,
    /// 头像URL
    #[serde(default)]
    pub avatar: String,
    /// 用户来源
    #[serde(default)]
    pub source: String,
    /// UnionID
    #[serde(rename = "unionID", default)]
    pub union_id: String,
}
