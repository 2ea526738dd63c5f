// ==========================================
// SIGLAB Aviário - 领域类型定义
// ==========================================
// 职责: 鸡舍编号 / 羽毛评级 / 半月段 / 同步状态等基础枚举
// 序列化: 与本地存储 JSON 快照格式保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 鸡舍编号 (Aviary Id)
// ==========================================
// 取值范围: 1..=4
// JSON 中以字符串 "1".."4" 存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AviaryId(u8);

impl AviaryId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// 全部鸡舍（按编号升序）
    pub const ALL: [AviaryId; 4] = [AviaryId(1), AviaryId(2), AviaryId(3), AviaryId(4)];

    pub fn new(value: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// 只保留数字后解析（"Aviário 2" → 2）
    pub fn from_digits(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse::<u8>().ok().and_then(Self::new)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// 数组下标（0..=3）
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// 地面蛋只在 2 号和 4 号鸡舍存在
    pub fn has_floor_eggs(self) -> bool {
        matches!(self.0, 2 | 4)
    }
}

impl fmt::Display for AviaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AviaryId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AviaryId> for String {
    fn from(value: AviaryId) -> Self {
        value.to_string()
    }
}

impl FromStr for AviaryId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("invalid aviary id: {}", s))
    }
}

// ==========================================
// 羽毛评级 (Feathering)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Feathering {
    Excelente,
    #[default]
    Bom,
    Regular,
    Ruim,
}

impl Feathering {
    /// 宽松解析：大小写不敏感，无法识别时回落为 Bom
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "excelente" => Feathering::Excelente,
            "regular" => Feathering::Regular,
            "ruim" => Feathering::Ruim,
            _ => Feathering::Bom,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Feathering::Excelente => "Excelente",
            Feathering::Bom => "Bom",
            Feathering::Regular => "Regular",
            Feathering::Ruim => "Ruim",
        }
    }
}

impl fmt::Display for Feathering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 半月段 (Fortnight Half)
// ==========================================
// First: 1~15 日; Second: 16 日至月末
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FortnightHalf {
    First,
    Second,
}

impl FortnightHalf {
    pub fn of_day(day: u32) -> Self {
        if day <= 15 {
            FortnightHalf::First
        } else {
            FortnightHalf::Second
        }
    }

    /// 值编码中的段号（1 / 2）
    pub fn part(self) -> u8 {
        match self {
            FortnightHalf::First => 1,
            FortnightHalf::Second => 2,
        }
    }

    pub fn from_part(part: u8) -> Option<Self> {
        match part {
            1 => Some(FortnightHalf::First),
            2 => Some(FortnightHalf::Second),
            _ => None,
        }
    }
}

// ==========================================
// 同步状态 (Sync Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Error,
    Success,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Error => "error",
            SyncStatus::Success => "success",
        };
        f.write_str(s)
    }
}

// ==========================================
// 同步服务提供方 (Sync Provider)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncProvider {
    /// 本地存储桩（不访问网络）
    #[default]
    Local,
    /// KVDB 风格公共 bucket
    Kvdb,
    /// JSONBlob 服务
    JsonBlob,
}

impl FromStr for SyncProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(SyncProvider::Local),
            "kvdb" => Ok(SyncProvider::Kvdb),
            "jsonblob" | "json_blob" => Ok(SyncProvider::JsonBlob),
            other => Err(format!("unknown sync provider: {}", other)),
        }
    }
}

impl fmt::Display for SyncProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncProvider::Local => "local",
            SyncProvider::Kvdb => "kvdb",
            SyncProvider::JsonBlob => "jsonblob",
        };
        f.write_str(s)
    }
}

// ==========================================
// 拉取合并策略 (Merge Strategy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// 远端整体覆盖本地
    #[default]
    Replace,
    /// 按记录 updatedAt 逐条比较
    UpdatedAt,
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(MergeStrategy::Replace),
            "updated_at" | "updatedat" => Ok(MergeStrategy::UpdatedAt),
            other => Err(format!("unknown merge strategy: {}", other)),
        }
    }
}
