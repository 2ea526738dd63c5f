// ==========================================
// SIGLAB Aviário - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (scope_id='global' + key/value)
// 优先级: 环境变量 > config_kv > 内置默认值
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::{MergeStrategy, SyncProvider};
use crate::repository::error::RepositoryError;
use crate::report::generator::DEFAULT_REPORT_MODEL;
use crate::sync::kvdb::DEFAULT_BUCKET_ID;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("未知配置键: {0}")]
    UnknownKey(String),

    #[error("配置值无效: {key}={value}")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::Repository(err.into())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置项来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Env,
    Database,
    Default,
}

/// 生效配置项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: ConfigSource,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Clone)]
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::Repository(RepositoryError::LockError(e.to_string())))
    }

    fn ensure_table(&self) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
              scope_id TEXT NOT NULL DEFAULT 'global',
              key TEXT NOT NULL,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（仅接受已知键，写入前校验）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        validate(key, value)?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取单项生效配置
    pub fn get_entry(&self, key: &str) -> ConfigResult<ConfigEntry> {
        let default = default_value(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        if let Some(value) = env_override_for(key) {
            return Ok(ConfigEntry {
                key: key.to_string(),
                value,
                source: ConfigSource::Env,
            });
        }
        if let Some(value) = self.get_global_config_value(key)? {
            return Ok(ConfigEntry {
                key: key.to_string(),
                value,
                source: ConfigSource::Database,
            });
        }
        Ok(ConfigEntry {
            key: key.to_string(),
            value: default.to_string(),
            source: ConfigSource::Default,
        })
    }

    /// 全部已知配置项的生效值
    pub fn list_entries(&self) -> ConfigResult<Vec<ConfigEntry>> {
        config_keys::ALL.iter().map(|key| self.get_entry(key)).collect()
    }

    fn get_parsed<T: FromStr>(&self, key: &str) -> ConfigResult<T> {
        let entry = self.get_entry(key)?;
        entry.value.parse::<T>().or_else(|_| {
            tracing::warn!(
                config_key = key,
                raw_value = %entry.value,
                "配置格式错误，使用默认值"
            );
            default_value(key)
                .and_then(|d| d.parse::<T>().ok())
                .ok_or(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: entry.value.clone(),
                })
        })
    }

    // ===== 同步配置 =====

    pub fn sync_provider(&self) -> ConfigResult<SyncProvider> {
        self.get_parsed(config_keys::SYNC_PROVIDER)
    }

    /// 自定义服务地址，空字符串表示使用各服务默认地址
    pub fn sync_base_url(&self) -> ConfigResult<Option<String>> {
        let value = self.get_entry(config_keys::SYNC_BASE_URL)?.value;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }

    pub fn sync_bucket_id(&self) -> ConfigResult<String> {
        Ok(self.get_entry(config_keys::SYNC_BUCKET_ID)?.value)
    }

    pub fn sync_debounce_ms(&self) -> ConfigResult<u64> {
        self.get_parsed(config_keys::SYNC_DEBOUNCE_MS)
    }

    pub fn merge_strategy(&self) -> ConfigResult<MergeStrategy> {
        self.get_parsed(config_keys::SYNC_MERGE_STRATEGY)
    }

    // ===== 界面与报告 =====

    pub fn locale(&self) -> ConfigResult<String> {
        Ok(self.get_entry(config_keys::UI_LOCALE)?.value)
    }

    pub fn report_model(&self) -> ConfigResult<String> {
        Ok(self.get_entry(config_keys::REPORT_MODEL)?.value)
    }

    /// Gemini API Key 只从环境变量读取，不落库
    pub fn gemini_api_key(&self) -> Option<String> {
        read_env(env_keys::GEMINI_API_KEY)
    }
}

// ==========================================
// 默认值 / 环境变量 / 校验
// ==========================================

fn default_value(key: &str) -> Option<&'static str> {
    match key {
        config_keys::SYNC_PROVIDER => Some("local"),
        config_keys::SYNC_BASE_URL => Some(""),
        config_keys::SYNC_BUCKET_ID => Some(DEFAULT_BUCKET_ID),
        config_keys::SYNC_DEBOUNCE_MS => Some("2000"),
        config_keys::SYNC_MERGE_STRATEGY => Some("replace"),
        config_keys::UI_LOCALE => Some("pt-BR"),
        config_keys::REPORT_MODEL => Some(DEFAULT_REPORT_MODEL),
        _ => None,
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_override_for(key: &str) -> Option<String> {
    match key {
        config_keys::SYNC_PROVIDER => read_env(env_keys::SYNC_PROVIDER),
        config_keys::SYNC_BASE_URL => read_env(env_keys::SYNC_BASE_URL),
        _ => None,
    }
}

fn validate(key: &str, value: &str) -> ConfigResult<()> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    match key {
        config_keys::SYNC_PROVIDER => SyncProvider::from_str(value).map(|_| ()).map_err(|_| invalid()),
        config_keys::SYNC_MERGE_STRATEGY => {
            MergeStrategy::from_str(value).map(|_| ()).map_err(|_| invalid())
        }
        config_keys::SYNC_DEBOUNCE_MS => value.parse::<u64>().map(|_| ()).map_err(|_| invalid()),
        config_keys::UI_LOCALE => match value {
            "pt-BR" | "en" => Ok(()),
            _ => Err(invalid()),
        },
        config_keys::SYNC_BUCKET_ID | config_keys::REPORT_MODEL => {
            if value.is_empty() {
                Err(invalid())
            } else {
                Ok(())
            }
        }
        config_keys::SYNC_BASE_URL => {
            if value.is_empty() || value.starts_with("http://") || value.starts_with("https://") {
                Ok(())
            } else {
                Err(invalid())
            }
        }
        _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 同步
    pub const SYNC_PROVIDER: &str = "sync.provider";
    pub const SYNC_BASE_URL: &str = "sync.base_url";
    pub const SYNC_BUCKET_ID: &str = "sync.bucket_id";
    pub const SYNC_DEBOUNCE_MS: &str = "sync.debounce_ms";
    pub const SYNC_MERGE_STRATEGY: &str = "sync.merge_strategy";

    // 界面
    pub const UI_LOCALE: &str = "ui.locale";

    // 快报
    pub const REPORT_MODEL: &str = "report.model";

    pub const ALL: [&str; 7] = [
        SYNC_PROVIDER,
        SYNC_BASE_URL,
        SYNC_BUCKET_ID,
        SYNC_DEBOUNCE_MS,
        SYNC_MERGE_STRATEGY,
        UI_LOCALE,
        REPORT_MODEL,
    ];
}

// ==========================================
// 环境变量名
// ==========================================
pub mod env_keys {
    pub const DB_PATH: &str = "SIGLAB_DB_PATH";
    pub const SYNC_PROVIDER: &str = "SIGLAB_SYNC_PROVIDER";
    pub const SYNC_BASE_URL: &str = "SIGLAB_SYNC_BASE_URL";
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
}
