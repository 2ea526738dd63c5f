// ==========================================
// SIGLAB Aviário - 同步密钥
// ==========================================
// 规则:
// - 保存时 trim + 转大写
// - 少于 3 个字符的密钥不参与同步
// - URL 中非 [A-Z0-9-] 字符替换为 '_'
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 参与同步的最短密钥长度
pub const MIN_KEY_LEN: usize = 3;

/// 随机密钥长度
pub const GENERATED_KEY_LEN: usize = 8;

const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncKey(String);

impl SyncKey {
    /// 规范化用户输入，空白输入返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_uppercase();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// 生成 8 位 A-Z0-9 随机密钥
    pub fn generate() -> Self {
        let bytes = uuid::Uuid::new_v4().into_bytes();
        let key: String = bytes
            .iter()
            .take(GENERATED_KEY_LEN)
            .map(|b| char::from(KEY_ALPHABET[usize::from(*b) % KEY_ALPHABET.len()]))
            .collect();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_usable(&self) -> bool {
        self.0.chars().count() >= MIN_KEY_LEN
    }

    /// URL 路径中使用的形式
    pub fn sanitized(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
