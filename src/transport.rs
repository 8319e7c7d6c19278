// HTTP 传输层
//
// 客户端的所有网络请求都通过 Transport trait 发出，
// 默认实现基于 reqwest，测试中可以替换为脚本化的实现。

use crate::error::{DocsError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// 响应体字节流
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// 原始 HTTP 响应（用于文件下载）
pub struct RawResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 响应头
    pub headers: HeaderMap,
    /// 响应体
    pub body: ByteStream,
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// HTTP 传输接口
#[async_trait]
pub trait Transport: Send + Sync {
    /// 带自定义请求头的 GET 请求，返回解析后的 JSON
    async fn get_json(&self, url: &str, headers: HeaderMap) -> Result<Value>;

    /// 表单 POST 请求，返回解析后的 JSON
    async fn post_form_json(
        &self,
        url: &str,
        form: &[(String, String)],
        headers: HeaderMap,
    ) -> Result<Value>;

    /// 普通 GET 请求，不检查状态码，响应体以流的形式返回
    async fn get_raw(&self, url: &str) -> Result<RawResponse>;
}

/// 基于 reqwest 的默认传输实现
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    /// JSON 接口的整体超时，下载不受此限制
    request_timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// 创建传输层
    ///
    /// # 参数
    /// * `timeout` - JSON 接口的请求超时，同时作为建立连接的超时
    ///
    /// 文件下载只受连接超时约束，大文件不会因为总时长被中断。
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            request_timeout: Some(timeout),
        })
    }

    /// 使用已有的 reqwest 客户端（自定义代理、连接池等），超时沿用客户端自身的设置
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            request_timeout: None,
        }
    }

    fn with_request_timeout(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    async fn read_json(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(DocsError::http_status(status.as_u16(), body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_json(&self, url: &str, headers: HeaderMap) -> Result<Value> {
        debug!("GET {}", url);
        let resp = self
            .with_request_timeout(self.client.get(url).headers(headers))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn post_form_json(
        &self,
        url: &str,
        form: &[(String, String)],
        headers: HeaderMap,
    ) -> Result<Value> {
        debug!("POST {} ({} 个表单字段)", url, form.len());
        let resp = self
            .with_request_timeout(self.client.post(url).headers(headers).form(form))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn get_raw(&self, url: &str) -> Result<RawResponse> {
        debug!("GET (raw) {}", url);
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(DocsError::from))
            .boxed();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// 接口统一响应包 `{ret, msg, data}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// 返回码，0 表示成功
    pub ret: i64,
    /// 返回信息
    #[serde(default)]
    pub msg: String,
    /// 业务数据
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// 检查返回码并取出 data
    pub fn into_data(self) -> Result<T> {
        if self.ret != 0 {
            return Err(DocsError::RemoteApi {
                ret: self.ret,
                msg: self.msg,
            });
        }
        self.data
            .ok_or_else(|| DocsError::metadata("响应中缺少 data 字段"))
    }
}

/// 解析响应包，ret != 0 视为接口错误（与 HTTP 状态码无关）
pub fn decode_envelope<T: DeserializeOwned>(value: Value) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_value(value)?;
    envelope.into_data()
}

/// 表单请求使用的 Content-Type 头
pub(crate) fn form_content_type(headers: &mut HeaderMap) {
    headers.insert(
        CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: i32,
    }

    #[test]
    fn test_decode_envelope_success() {
        let data: Payload = decode_envelope(json!({"ret": 0, "msg": "ok", "data": {"value": 7}}))
            .unwrap();
        assert_eq!(data, Payload { value: 7 });
    }

    #[test]
    fn test_decode_envelope_remote_error() {
        let err = decode_envelope::<Payload>(json!({"ret": 400007, "msg": "token expired"}))
            .unwrap_err();
        match err {
            DocsError::RemoteApi { ret, msg } => {
                assert_eq!(ret, 400007);
                assert_eq!(msg, "token expired");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_envelope_missing_data() {
        let err = decode_envelope::<Payload>(json!({"ret": 0, "msg": ""})).unwrap_err();
        assert!(matches!(err, DocsError::Metadata(_)));
    }

    #[tokio::test]
    async fn test_get_json_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(header("Access-Token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ret": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("Access-Token", "tok".parse().unwrap());

        let value = transport
            .get_json(&format!("{}/api", server.uri()), headers)
            .await
            .unwrap();
        assert_eq!(value["ret"], 0);
    }

    #[tokio::test]
    async fn test_get_json_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport
            .get_json(&server.uri(), HeaderMap::new())
            .await
            .unwrap_err();
        match err {
            DocsError::Transport { status, message } => {
                assert_eq!(status, Some(503));
                assert_eq!(message, "busy");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_json_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport
            .get_json(&server.uri(), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsError::Decode(_)));
    }

    #[tokio::test]
    async fn test_post_form_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "a"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let form = vec![("grant_type".to_string(), "refresh_token".to_string())];
        let value = transport
            .post_form_json(&format!("{}/token", server.uri()), &form, HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(value["access_token"], "a");
    }

    #[tokio::test]
    async fn test_get_raw_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", "attachment; filename=\"a.txt\"")
                    .set_body_bytes(b"hello".to_vec()),
            )
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let mut resp = transport
            .get_raw(&format!("{}/file", server.uri()))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert!(resp.headers.contains_key("content-disposition"));

        let mut body = Vec::new();
        while let Some(chunk) = resp.body.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn test_get_json_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ret": 0}))
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_millis(300)).unwrap();
        let err = transport
            .get_json(&server.uri(), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsError::Transport { status: None, .. }));
    }
}
