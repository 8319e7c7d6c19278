// 腾讯文档开放平台常量

/// OAuth 授权端点
pub const AUTH_ENDPOINT: &str = "https://docs.qq.com/oauth/v2/authorize";

/// Token 端点（授权码换取、刷新）
pub const TOKEN_ENDPOINT: &str = "https://docs.qq.com/oauth/v2/token";

/// 用户信息端点
pub const USER_INFO_ENDPOINT: &str = "https://docs.qq.com/oauth/v2/userinfo";

/// 开放 API 根地址
pub const API_ENDPOINT: &str = "https://docs.qq.com/openapi";

/// 全部权限
pub const ALL_SCOPE: &str = "all";

/// 自动生成的 CSRF state 长度
pub const STATE_LENGTH: usize = 16;
