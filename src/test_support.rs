// 测试辅助：脚本化的 Transport 实现

use crate::auth::Token;
use crate::config::ClientConfig;
use crate::docs::DocsClient;
use crate::error::{DocsError, Result};
use crate::transport::{RawResponse, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// 记录下来的一次请求
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub headers: HeaderMap,
    pub form: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query(&self, key: &str) -> Option<String> {
        let url = reqwest::Url::parse(&self.url).ok()?;
        let value = url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned());
        value
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// 脚本化的原始响应
pub struct FakeRaw {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub chunks: Vec<Result<Vec<u8>>>,
}

impl FakeRaw {
    pub fn file(disposition: &str, content: &[u8]) -> Self {
        Self {
            status: 200,
            headers: vec![("content-disposition", disposition.to_string())],
            chunks: vec![Ok(content.to_vec())],
        }
    }
}

type CallHook = Box<dyn Fn(&RecordedCall, usize) + Send + Sync>;

/// 按顺序返回预设响应的 Transport
///
/// get_json / post_form_json 共享同一个 JSON 响应队列，get_raw 使用独立队列。
#[derive(Default)]
pub struct FakeTransport {
    json_responses: Mutex<VecDeque<Result<Value>>>,
    raw_responses: Mutex<VecDeque<FakeRaw>>,
    calls: Mutex<Vec<RecordedCall>>,
    hook: Mutex<Option<CallHook>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, value: Value) -> &Self {
        self.json_responses.lock().push_back(Ok(value));
        self
    }

    pub fn push_error(&self, err: DocsError) -> &Self {
        self.json_responses.lock().push_back(Err(err));
        self
    }

    pub fn push_raw(&self, raw: FakeRaw) -> &Self {
        self.raw_responses.lock().push_back(raw);
        self
    }

    /// 每次请求记录后调用，参数为本次请求和累计请求数
    pub fn on_call(&self, hook: impl Fn(&RecordedCall, usize) + Send + Sync + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    fn record(&self, call: RecordedCall) {
        let total = {
            let mut calls = self.calls.lock();
            calls.push(call.clone());
            calls.len()
        };
        if let Some(hook) = self.hook.lock().as_ref() {
            hook(&call, total);
        }
    }

    fn next_json(&self) -> Result<Value> {
        self.json_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(DocsError::Transport {
                    status: None,
                    message: "no scripted response".to_string(),
                })
            })
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, url: &str, headers: HeaderMap) -> Result<Value> {
        self.record(RecordedCall {
            method: "GET",
            url: url.to_string(),
            headers,
            form: Vec::new(),
        });
        self.next_json()
    }

    async fn post_form_json(
        &self,
        url: &str,
        form: &[(String, String)],
        headers: HeaderMap,
    ) -> Result<Value> {
        self.record(RecordedCall {
            method: "POST",
            url: url.to_string(),
            headers,
            form: form.to_vec(),
        });
        self.next_json()
    }

    async fn get_raw(&self, url: &str) -> Result<RawResponse> {
        self.record(RecordedCall {
            method: "RAW",
            url: url.to_string(),
            headers: HeaderMap::new(),
            form: Vec::new(),
        });

        let raw = self.raw_responses.lock().pop_front().ok_or_else(|| {
            DocsError::Transport {
                status: None,
                message: "no scripted raw response".to_string(),
            }
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in raw.headers {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_bytes(value.as_bytes()).expect("valid header value"),
            );
        }

        let body = futures::stream::iter(
            raw.chunks
                .into_iter()
                .map(|chunk| chunk.map(Bytes::from))
                .collect::<Vec<_>>(),
        )
        .boxed();

        Ok(RawResponse {
            status: raw.status,
            headers,
            body,
        })
    }
}

pub fn test_token() -> Token {
    Token {
        access_token: "access-123".to_string(),
        refresh_token: "refresh-456".to_string(),
        expires_in: 108000,
        token_type: "Bearer".to_string(),
        user_id: "open-789".to_string(),
        scope: "all".to_string(),
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new("client-abc", "secret-xyz", "https://app.example.com/callback")
}

/// 已授权的客户端
pub fn authed_client(transport: Arc<FakeTransport>) -> DocsClient {
    let client = DocsClient::with_transport(test_config(), transport);
    client.set_token(test_token());
    client
}
