use crate::api::error::{ApiError, ApiResult};
use crate::app::commands::common::{to_json, CliArgs};
use crate::app::state::AppState;

// ==========================================
// 云同步命令
// ==========================================
// sync key [<value>]     查看或设置同步密钥
// sync generate-key
// sync push [--debounce]
// sync pull
// sync status

pub async fn run(state: &AppState, args: &CliArgs) -> ApiResult<String> {
    let api = &state.sync_api;
    match args.require_positional(1, "key|generate-key|push|pull|status")? {
        "key" => match args.positional(2) {
            Some(raw) => to_json(&api.set_key(raw)?),
            None => to_json(&api.get_key()?),
        },
        "generate-key" => to_json(&api.generate_key()?),
        "push" => to_json(&api.push(args.flag("debounce")).await?),
        "pull" => to_json(&api.pull().await?),
        "status" => to_json(&api.status()?),
        other => Err(ApiError::InvalidInput(format!("未知子命令: sync {}", other))),
    }
}
