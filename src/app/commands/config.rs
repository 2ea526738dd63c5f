use crate::api::error::{ApiError, ApiResult};
use crate::app::commands::common::{to_json, CliArgs};
use crate::app::state::AppState;

// ==========================================
// 配置命令
// ==========================================
// config list | get <key> | set <key> <value>

pub fn run(state: &AppState, args: &CliArgs) -> ApiResult<String> {
    let api = &state.config_api;
    match args.require_positional(1, "list|get|set")? {
        "list" => to_json(&api.list_configs()?),
        "get" => to_json(&api.get_config(args.require_positional(2, "key")?)?),
        "set" => {
            let key = args.require_positional(2, "key")?;
            let value = args.require_positional(3, "value")?;
            to_json(&api.update_config(key, value)?)
        }
        other => Err(ApiError::InvalidInput(format!("未知子命令: config {}", other))),
    }
}
