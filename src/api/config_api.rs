// ==========================================
// SIGLAB Aviário - 配置管理 API
// ==========================================
// 职责: 配置查询、更新
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::config::config_manager::{config_keys, ConfigEntry, ConfigManager};
use crate::i18n;

/// 配置管理API
///
/// 职责：
/// 1. 配置查询（全部、单个），标明生效来源
/// 2. 配置更新（写入 global 作用域）
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    pub fn list_configs(&self) -> ApiResult<Vec<ConfigEntry>> {
        Ok(self.config_manager.list_entries()?)
    }

    pub fn get_config(&self, key: &str) -> ApiResult<ConfigEntry> {
        Ok(self.config_manager.get_entry(key)?)
    }

    /// 更新配置
    ///
    /// 修改 ui.locale 时立即切换当前语言
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<ConfigEntry> {
        self.config_manager.set_global_config_value(key, value)?;
        if key == config_keys::UI_LOCALE {
            i18n::set_locale(value.trim());
        }
        self.get_config(key)
    }
}
