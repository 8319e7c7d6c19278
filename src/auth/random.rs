// 随机字符串生成（CSRF state 等）

use crate::error::{DocsError, Result};
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

/// 生成指定长度的随机十六进制字符串
///
/// 使用系统随机源，随机源不可用时返回错误而不是 panic。
pub fn generate_random_string(length: usize) -> Result<String> {
    // hex 编码后长度翻倍
    let mut buf = vec![0u8; (length + 1) / 2];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| DocsError::Entropy(e.to_string()))?;

    let mut encoded = hex::encode(buf);
    encoded.truncate(length);
    Ok(encoded)
}

/// 生成 [0, max) 范围内的随机数
pub fn generate_random_number(max: u64) -> Result<u64> {
    if max == 0 {
        return Err(DocsError::invalid("随机数上限必须大于 0"));
    }
    let mut rng = StdRng::from_rng(OsRng).map_err(|e| DocsError::Entropy(e.to_string()))?;
    Ok(rng.gen_range(0..max))
}
