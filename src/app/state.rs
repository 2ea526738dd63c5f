// ==========================================
// SIGLAB Aviário - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use crate::api::{BatchApi, ConfigApi, DashboardApi, ProductionApi, ReportApi, SyncApi};
use crate::config::config_manager::{env_keys, ConfigManager};
use crate::db::open_shared_connection;
use crate::domain::types::SyncProvider;
use crate::i18n;
use crate::report::generator::{GeminiClient, TextGenerator};
use crate::repository::{BatchRepository, LocalStore, ProductionRepository};
use crate::sync::jsonblob::DEFAULT_JSONBLOB_BASE_URL;
use crate::sync::kvdb::DEFAULT_KVDB_BASE_URL;
use crate::sync::{CloudStore, JsonBlobStore, KvdbStore, LocalMirrorStore, SyncService};

/// 应用状态
///
/// 包含所有API实例和共享资源，所有仓储共用一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 日产记录API
    pub production_api: Arc<ProductionApi>,

    /// 批次特征API
    pub batch_api: Arc<BatchApi>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 云同步API
    pub sync_api: Arc<SyncApi>,

    /// 快速报告API
    pub report_api: Arc<ReportApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并初始化所有Repository
    /// 2. 按配置选择同步服务与报告生成服务
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_shared_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let local_store = LocalStore::from_connection(conn.clone())
            .map_err(|e| format!("无法创建LocalStore: {}", e))?;
        let production_repo = Arc::new(
            ProductionRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ProductionRepository: {}", e))?,
        );
        let batch_repo = Arc::new(
            BatchRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法创建BatchRepository: {}", e))?,
        );
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        match config_manager.locale() {
            Ok(locale) => i18n::set_locale(&locale),
            Err(e) => tracing::warn!("读取界面语言失败，使用默认语言: {}", e),
        }

        // ==========================================
        // 同步服务
        // ==========================================
        let store = build_cloud_store(&config_manager, local_store.clone())
            .map_err(|e| format!("无法创建同步服务: {}", e))?;
        let debounce_ms = config_manager
            .sync_debounce_ms()
            .map_err(|e| format!("读取同步配置失败: {}", e))?;
        let sync_service = SyncService::new(store, Duration::from_millis(debounce_ms));

        // ==========================================
        // 报告生成服务（未配置 Key 时为 None）
        // ==========================================
        let generator: Option<Arc<dyn TextGenerator>> = match config_manager.gemini_api_key() {
            Some(api_key) => {
                let model = config_manager
                    .report_model()
                    .map_err(|e| format!("读取报告配置失败: {}", e))?;
                let client = GeminiClient::new(api_key, model)
                    .map_err(|e| format!("无法创建报告客户端: {}", e))?;
                Some(Arc::new(client))
            }
            None => {
                tracing::debug!("未设置 {}，快速报告不可用", env_keys::GEMINI_API_KEY);
                None
            }
        };

        // ==========================================
        // 初始化API层
        // ==========================================
        let production_api = Arc::new(ProductionApi::new(production_repo.clone(), batch_repo.clone()));
        let batch_api = Arc::new(BatchApi::new(batch_repo.clone(), production_repo.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(production_repo.clone(), batch_repo.clone()));
        let sync_api = Arc::new(SyncApi::new(
            sync_service,
            local_store,
            production_repo.clone(),
            batch_repo,
            config_manager.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(production_repo, generator));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            production_api,
            batch_api,
            dashboard_api,
            sync_api,
            report_api,
            config_api,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

/// 按 sync.provider 选择同步服务
fn build_cloud_store(
    config: &ConfigManager,
    local_store: LocalStore,
) -> Result<Arc<dyn CloudStore>, crate::config::config_manager::ConfigError> {
    let provider = config.sync_provider()?;
    let base_url = config.sync_base_url()?;
    tracing::info!(%provider, base_url = ?base_url, "同步服务");

    let store: Arc<dyn CloudStore> = match provider {
        SyncProvider::Local => Arc::new(LocalMirrorStore::new(local_store)),
        SyncProvider::Kvdb => Arc::new(KvdbStore::new(
            base_url.unwrap_or_else(|| DEFAULT_KVDB_BASE_URL.to_string()),
            config.sync_bucket_id()?,
        )),
        SyncProvider::JsonBlob => Arc::new(JsonBlobStore::new(
            base_url.unwrap_or_else(|| DEFAULT_JSONBLOB_BASE_URL.to_string()),
        )),
    };
    Ok(store)
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SIGLAB_DB_PATH（非空时）
/// - 开发环境: 用户数据目录/siglab-aviario-dev/siglab.db
/// - 生产环境: 用户数据目录/siglab-aviario/siglab.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(env_keys::DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./siglab.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("siglab-aviario-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("siglab-aviario");
        }

        // 目录创建失败时由打开数据库时报错
        std::fs::create_dir_all(&path).ok();
        path = path.join("siglab.db");
    }

    path.to_string_lossy().to_string()
}
