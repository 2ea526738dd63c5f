// ==========================================
// SIGLAB Aviário - SQLite 连接初始化
// ==========================================
// 所有 Connection::open 统一经过这里:
// - busy_timeout 按连接配置
// - 共享连接安装 SQL 统计回调
// ==========================================

use crate::perf::install_sqlite_tracing;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开供各仓储共享的连接（含 SQL 统计）
pub fn open_shared_connection(db_path: &str) -> rusqlite::Result<Arc<Mutex<Connection>>> {
    let mut conn = open_sqlite_connection(db_path)?;
    install_sqlite_tracing(&mut conn);
    Ok(Arc::new(Mutex::new(conn)))
}
