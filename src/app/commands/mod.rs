// ==========================================
// SIGLAB Aviário - 命令行命令
// ==========================================
// 职责: 解析命令行参数，调用 API 层，输出 JSON / SVG / CSV
// ==========================================

pub mod batch;
pub mod common;
pub mod config;
pub mod dashboard;
pub mod production;
pub mod sync;

pub use common::CliArgs;

use crate::api::error::{ApiError, ApiResult};
use crate::app::state::AppState;
use common::{parse_filter, parse_today};

pub const USAGE: &str = "\
siglab-aviario <command> [args] [--db PATH]

  production add --json '<form>' [--id ID] | list | show <id> | delete <id> | clear
  production import <file.csv> | export <file.csv>
  batch add --json '<form>' [--id ID] | list [--flat] | delete <id> | clear
  batch import <file.csv> | export <file.csv>
  dashboard general | aviary | monthly | maturity | options
  dashboard chart monthly|rate|maturity [--line N] [--out file.svg]
  sync key [<value>] | generate-key | push [--debounce] | pull | status
  report
  config list | get <key> | set <key> <value>

filters: --period all|7d|30d|month --year Y --month M --fortnight Y-M0-H
         --aviary N --batch ID --search TEXT --today YYYY-MM-DD
";

/// 是否请求帮助
pub fn wants_help(args: &CliArgs) -> bool {
    args.positional.is_empty()
        || args.flag("help")
        || matches!(args.positional(0), Some("help") | Some("-h"))
}

/// 分发命令
///
/// # 返回
/// - Ok(String): 标准输出内容
/// - Err(ApiError): 由调用方转换为错误响应
pub async fn dispatch(state: &AppState, args: &CliArgs) -> ApiResult<String> {
    let command = args.require_positional(0, "command")?;
    tracing::debug!(command, args = ?args.positional, "执行命令");

    match command {
        "production" => production::run(state, args),
        "batch" => batch::run(state, args),
        "dashboard" => dashboard::run(state, args),
        "sync" => sync::run(state, args).await,
        "report" => {
            let filter = parse_filter(args)?;
            state.report_api.generate(&filter, parse_today(args)?).await
        }
        "config" => config::run(state, args),
        other => Err(ApiError::InvalidInput(format!("未知命令: {}\n\n{}", other, USAGE))),
    }
}
