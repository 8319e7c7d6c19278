// 导出文件下载
//
// 从对象存储下载已完成的导出文件，文件名取自 Content-Disposition 响应头。

use crate::error::{DocsError, Result};
use crate::export::types::DownloadedFile;
use crate::transport::Transport;
use futures::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// 下载文件到本地目录
///
/// # 参数
/// * `transport` - HTTP 传输层
/// * `download_url` - 下载链接（不能为空）
/// * `save_dir` - 保存目录，为空时使用当前目录，不存在时自动创建
///
/// 同名文件会被覆盖；写入失败时删除已写入的部分文件。
pub async fn retrieve(
    transport: &dyn Transport,
    download_url: &str,
    save_dir: Option<&Path>,
) -> Result<DownloadedFile> {
    if download_url.is_empty() {
        return Err(DocsError::invalid("下载链接不能为空"));
    }

    let resp = transport.get_raw(download_url).await?;
    if !(200..300).contains(&resp.status) {
        return Err(DocsError::http_status(resp.status, "下载文件失败"));
    }

    let disposition = resp
        .headers
        .get(CONTENT_DISPOSITION)
        .ok_or_else(|| DocsError::metadata("响应中缺少 Content-Disposition 头"))?;
    // 对象存储可能直接返回 UTF-8 文件名，to_str 只接受可见 ASCII
    let disposition = std::str::from_utf8(disposition.as_bytes())
        .map_err(|e| DocsError::metadata(format!("Content-Disposition 头不是有效的 UTF-8: {}", e)))?;
    let file_name = filename_from_content_disposition(disposition)?;

    let dir = save_dir
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).await?;

    let path = dir.join(&file_name);
    debug!("开始写入文件: {:?}", path);

    let mut body = resp.body;
    let mut file = fs::File::create(&path).await?;
    let mut written: u64 = 0;

    let result: Result<()> = async {
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(e) = result {
        drop(file);
        if let Err(remove_err) = fs::remove_file(&path).await {
            warn!("删除未完成的文件失败: {:?}, {}", path, remove_err);
        }
        return Err(e);
    }

    info!("文件下载完成: {:?} ({} 字节)", path, written);
    Ok(DownloadedFile { file_name, path })
}

/// 从 Content-Disposition 头中解析文件名
///
/// 优先使用 `filename*`（RFC 5987，`charset'lang'百分号编码`），
/// 否则使用 `filename`。结果只保留最后一级路径。
pub fn filename_from_content_disposition(value: &str) -> Result<String> {
    let params = split_params(value);

    let extended = params
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("filename*"))
        .and_then(|(_, v)| decode_extended(v));

    let name = match extended {
        Some(name) => name,
        None => params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("filename"))
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DocsError::metadata("Content-Disposition 中没有文件名"))?,
    };

    sanitize_file_name(&name)
}

/// 拆分 `type; key=value; key="value"` 形式的参数，忽略引号内的分号
fn split_params(value: &str) -> Vec<(String, String)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .filter_map(|part| {
            let (key, val) = part.split_once('=')?;
            Some((key.trim().to_string(), val.trim().to_string()))
        })
        .collect()
}

fn decode_extended(value: &str) -> Option<String> {
    let mut pieces = value.splitn(3, '\'');
    let charset = pieces.next()?;
    let _lang = pieces.next()?;
    let encoded = pieces.next()?;

    if !charset.is_empty() && !charset.eq_ignore_ascii_case("utf-8") {
        debug!("不支持的文件名编码: {}", charset);
        return None;
    }

    let decoded = urlencoding::decode(encoded).ok()?.into_owned();
    Some(decoded).filter(|s| !s.is_empty())
}

fn sanitize_file_name(name: &str) -> Result<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(DocsError::metadata(format!("无效的文件名: {:?}", name)));
    }
    Ok(base.to_string())
}
