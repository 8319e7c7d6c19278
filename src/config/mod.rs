// 配置管理模块

use crate::auth::constants::{API_ENDPOINT, AUTH_ENDPOINT, TOKEN_ENDPOINT, USER_INFO_ENDPOINT};
use crate::auth::Token;
use crate::export::PollingConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 开放平台应用配置
    pub client: ClientConfig,
    /// 导出配置
    #[serde(default)]
    pub export: ExportConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 开放平台应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// 应用 ID（请求头 Client-Id）
    pub client_id: String,
    /// 应用密钥
    pub client_secret: String,
    /// 授权回调地址
    pub redirect_uri: String,
    /// 固定的 state 参数（为空时每次随机生成）
    #[serde(default)]
    pub random_state: Option<String>,
    /// 接口请求超时（秒，默认 30），下载文件时只用作连接超时
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 已有的访问令牌（跳过授权码换取）
    #[serde(default)]
    pub initial_token: Option<Token>,
    /// 接口地址
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// 创建应用配置，其余字段使用默认值
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            random_state: None,
            timeout_secs: default_timeout_secs(),
            initial_token: None,
            endpoints: EndpointConfig::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_random_state(mut self, state: impl Into<String>) -> Self {
        self.random_state = Some(state.into());
        self
    }

    pub fn with_initial_token(mut self, token: Token) -> Self {
        self.initial_token = Some(token);
        self
    }

    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// 请求超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 接口地址配置
///
/// 默认指向腾讯文档公网地址，测试或代理场景下可以覆盖。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_auth_endpoint")]
    pub auth: String,
    #[serde(default = "default_token_endpoint")]
    pub token: String,
    #[serde(default = "default_user_info_endpoint")]
    pub user_info: String,
    /// 开放 API 根地址（不带末尾斜杠）
    #[serde(default = "default_api_endpoint")]
    pub api: String,
}

fn default_auth_endpoint() -> String {
    AUTH_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    TOKEN_ENDPOINT.to_string()
}

fn default_user_info_endpoint() -> String {
    USER_INFO_ENDPOINT.to_string()
}

fn default_api_endpoint() -> String {
    API_ENDPOINT.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            auth: default_auth_endpoint(),
            token: default_token_endpoint(),
            user_info: default_user_info_endpoint(),
            api: default_api_endpoint(),
        }
    }
}

impl EndpointConfig {
    /// 所有接口指向同一个地址（测试用 mock server）
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth: format!("{}/oauth/v2/authorize", base),
            token: format!("{}/oauth/v2/token", base),
            user_info: format!("{}/oauth/v2/userinfo", base),
            api: format!("{}/openapi", base),
        }
    }
}

/// 导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// 最大轮询次数（默认 100）
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 轮询间隔（秒，默认 2）
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// 默认保存目录（默认当前目录）
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_max_attempts() -> u32 {
    100
}

fn default_interval_secs() -> u64 {
    2
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
            download_dir: default_download_dir(),
        }
    }
}

impl ExportConfig {
    /// 转换为轮询配置
    pub fn polling(&self) -> PollingConfig {
        PollingConfig {
            max_attempts: self.max_attempts,
            interval: Duration::from_secs(self.interval_secs),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 是否写入日志文件
    #[serde(default = "default_log_enabled")]
    pub enabled: bool,
    /// 日志文件目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// 日志保留天数（默认 7 天）
    #[serde(default = "default_log_retention_days")]
    pub retention_days: u32,
    /// 日志级别（默认 info，可被 RUST_LOG 覆盖）
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_enabled() -> bool {
    false
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_log_enabled(),
            log_dir: default_log_dir(),
            retention_days: default_log_retention_days(),
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;

        if config.client.client_id.is_empty() {
            anyhow::bail!("配置文件中 client.client_id 不能为空");
        }
        if config.export.max_attempts == 0 {
            anyhow::bail!("配置文件中 export.max_attempts 必须大于 0");
        }

        Ok(config)
    }

    /// 保存配置到文件
    pub async fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        // 确保父目录存在
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        fs::write(path, content)
            .await
            .context("Failed to write config file")?;

        Ok(())
    }
}
