// ==========================================
// SIGLAB Aviário - 应用层
// ==========================================
// 职责: 组装应用状态，连接命令行与 API 层
// ==========================================

pub mod commands;
pub mod state;

// 重导出
pub use commands::{dispatch, wants_help, CliArgs, USAGE};
pub use state::{get_default_db_path, AppState};
