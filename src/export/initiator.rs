// 导出任务发起与单次进度查询

use crate::docs::DocsClient;
use crate::error::{DocsError, Result};
use crate::export::types::{ExportJob, ExportProgress, ExportType, ProgressData};
use crate::transport::{decode_envelope, form_content_type};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ExportData {
    #[serde(rename = "operationID", default)]
    operation_id: String,
}

impl DocsClient {
    /// 发起异步导出
    ///
    /// # 参数
    /// * `document_id` - 文档ID（不能为空）
    /// * `export_type` - 导出格式，不指定时由服务端决定
    ///
    /// 返回携带服务端操作ID的导出任务。
    pub async fn export_document(
        &self,
        document_id: &str,
        export_type: Option<ExportType>,
    ) -> Result<ExportJob> {
        if document_id.is_empty() {
            return Err(DocsError::invalid("文档ID不能为空"));
        }
        let mut headers = self.auth_headers()?;
        form_content_type(&mut headers);

        let mut form = Vec::new();
        if let Some(export_type) = export_type {
            form.push(("exportType".to_string(), export_type.as_str().to_string()));
        }

        let url = self.api_url(&["drive", "v2", "files", document_id, "async-export"], &[])?;
        let value = self
            .transport()
            .post_form_json(url.as_str(), &form, headers)
            .await?;
        let data: ExportData = decode_envelope(value)?;

        if data.operation_id.is_empty() {
            return Err(DocsError::metadata("导出响应中缺少 operationID"));
        }

        info!(
            "发起导出成功: document_id={}, format={}, operation_id={}",
            document_id,
            export_type.map(|t| t.as_str()).unwrap_or("default"),
            data.operation_id
        );
        ExportJob::new(document_id, data.operation_id)
    }

    /// 查询一次导出进度
    pub async fn export_progress(
        &self,
        document_id: &str,
        operation_id: &str,
    ) -> Result<ExportProgress> {
        if document_id.is_empty() {
            return Err(DocsError::invalid("文档ID不能为空"));
        }
        if operation_id.is_empty() {
            return Err(DocsError::invalid("操作ID不能为空"));
        }
        let headers = self.auth_headers()?;

        let url = self.api_url(
            &["drive", "v2", "files", document_id, "export-progress"],
            &[("operationID", operation_id.to_string())],
        )?;
        let value = self.transport().get_json(url.as_str(), headers).await?;
        let data: ProgressData = decode_envelope(value)?;
        let progress = ExportProgress::try_from(data)?;

        debug!(
            "导出进度: document_id={}, operation_id={}, progress={}%",
            document_id, operation_id, progress.progress
        );
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{authed_client, test_config, FakeTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_export_document() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(json!({"ret": 0, "msg": "", "data": {"operationID": "op-123"}}));
        let client = authed_client(transport.clone());

        let job = client
            .export_document("doc1", Some(ExportType::Pdf))
            .await
            .unwrap();
        assert_eq!(job.document_id(), "doc1");
        assert_eq!(job.operation_id(), "op-123");

        let call = &transport.calls()[0];
        assert_eq!(call.method, "POST");
        assert_eq!(
            call.url,
            "https://docs.qq.com/openapi/drive/v2/files/doc1/async-export"
        );
        assert_eq!(call.form_value("exportType"), Some("pdf"));
        assert_eq!(call.header("Access-Token"), Some("access-123"));
        assert_eq!(call.header("Open-Id"), Some("open-789"));
    }

    #[tokio::test]
    async fn test_export_document_default_format() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(json!({"ret": 0, "msg": "", "data": {"operationID": "op-1"}}));
        let client = authed_client(transport.clone());

        client.export_document("doc1", None).await.unwrap();
        assert!(transport.calls()[0].form.is_empty());
    }

    #[tokio::test]
    async fn test_export_document_empty_id_sends_nothing() {
        let transport = Arc::new(FakeTransport::new());
        // 没有令牌时也优先报告参数错误
        let client = DocsClient::with_transport(test_config(), transport.clone());

        let err = client.export_document("", None).await.unwrap_err();
        assert!(matches!(err, DocsError::InvalidArgument(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_export_document_unauthenticated() {
        let transport = Arc::new(FakeTransport::new());
        let client = DocsClient::with_transport(test_config(), transport.clone());

        let err = client.export_document("doc1", None).await.unwrap_err();
        assert!(matches!(err, DocsError::Unauthenticated));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_export_document_remote_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(json!({"ret": 40003, "msg": "no permission"}));
        let client = authed_client(transport);

        match client.export_document("doc1", None).await.unwrap_err() {
            DocsError::RemoteApi { ret, msg } => {
                assert_eq!(ret, 40003);
                assert_eq!(msg, "no permission");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_export_document_missing_operation_id() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(json!({"ret": 0, "msg": "", "data": {}}));
        let client = authed_client(transport);

        let err = client.export_document("doc1", None).await.unwrap_err();
        assert!(matches!(err, DocsError::Metadata(_)));
    }

    #[tokio::test]
    async fn test_export_progress_query() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(json!({"ret": 0, "msg": "", "data": {"progress": 40}}));
        let client = authed_client(transport.clone());

        let progress = client.export_progress("doc1", "op-123").await.unwrap();
        assert_eq!(progress.progress, 40);
        assert!(progress.download_url.is_none());

        let call = &transport.calls()[0];
        assert!(call
            .url
            .starts_with("https://docs.qq.com/openapi/drive/v2/files/doc1/export-progress?"));
        assert_eq!(call.query("operationID").as_deref(), Some("op-123"));
    }

    #[tokio::test]
    async fn test_document_id_is_escaped_in_path() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(json!({"ret": 0, "msg": "", "data": {"operationID": "op-9"}}));
        transport.push_json(json!({"ret": 0, "msg": "", "data": {"progress": 10}}));
        let client = authed_client(transport.clone());

        client.export_document("../x?y", None).await.unwrap();
        client.export_progress("../x?y", "op-9").await.unwrap();

        let calls = transport.calls();
        let export_url = reqwest::Url::parse(&calls[0].url).unwrap();
        assert_eq!(
            export_url.path(),
            "/openapi/drive/v2/files/..%2Fx%3Fy/async-export"
        );
        assert_eq!(export_url.query(), None);

        let progress_url = reqwest::Url::parse(&calls[1].url).unwrap();
        assert_eq!(
            progress_url.path(),
            "/openapi/drive/v2/files/..%2Fx%3Fy/export-progress"
        );
        assert_eq!(calls[1].query("operationID").as_deref(), Some("op-9"));
    }

    #[tokio::test]
    async fn test_export_progress_validates_ids() {
        let transport = Arc::new(FakeTransport::new());
        let client = authed_client(transport.clone());

        assert!(matches!(
            client.export_progress("", "op").await,
            Err(DocsError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.export_progress("doc", "").await,
            Err(DocsError::InvalidArgument(_))
        ));
        assert!(transport.calls().is_empty());
    }
}
