use std::path::Path;

use crate::api::error::{ApiError, ApiResult};
use crate::app::commands::common::{create_output, read_form_json, to_json, CliArgs};
use crate::app::state::AppState;
use crate::domain::batch::BatchFormData;
use crate::i18n::t;

// ==========================================
// 批次特征命令
// ==========================================
// batch add --json '<form>' [--id ID]
// batch list [--flat]
// batch delete <id> | clear
// batch import <path> | export <path>

pub fn run(state: &AppState, args: &CliArgs) -> ApiResult<String> {
    let api = &state.batch_api;
    match args.require_positional(1, "add|list|delete|clear|import|export")? {
        "add" => {
            let form: BatchFormData = read_form_json(args)?;
            to_json(&api.save_batch(form, args.option("id"))?)
        }
        "list" if args.flag("flat") => to_json(&api.list_batches()?),
        "list" => to_json(&api.list_grouped()?),
        "delete" => {
            api.delete_batch(args.require_positional(2, "id")?)?;
            Ok(t("common.success"))
        }
        "clear" => {
            api.clear_batches()?;
            Ok(t("common.success"))
        }
        "import" => to_json(&api.import_csv(Path::new(args.require_positional(2, "path")?))?),
        "export" => {
            let path = args.require_positional(2, "path")?;
            if api.list_batches()?.is_empty() {
                return Err(ApiError::InvalidInput(t("common.no_data")));
            }
            let rows = api.export_csv(create_output(path)?)?;
            to_json(&serde_json::json!({ "path": path, "rows": rows }))
        }
        other => Err(ApiError::InvalidInput(format!("未知子命令: batch {}", other))),
    }
}
