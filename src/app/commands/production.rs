use std::path::Path;

use crate::api::error::{ApiError, ApiResult};
use crate::app::commands::common::{
    create_output, parse_filter, parse_today, read_form_json, to_json, CliArgs,
};
use crate::app::state::AppState;
use crate::domain::production::ProductionFormData;
use crate::engine::filter::SortOrder;
use crate::i18n::t;

// ==========================================
// 日产记录命令
// ==========================================
// production add --json '<form>' [--id ID]
// production list [筛选] [--oldest]
// production show|delete <id>
// production clear
// production import <path>
// production export <path> [筛选]

pub fn run(state: &AppState, args: &CliArgs) -> ApiResult<String> {
    let api = &state.production_api;
    match args.require_positional(1, "add|list|show|delete|clear|import|export")? {
        "add" => {
            let form: ProductionFormData = read_form_json(args)?;
            let record = api.save_record(form, args.option("id"))?;
            to_json(&record)
        }
        "list" => {
            let order = if args.flag("oldest") {
                SortOrder::OldestFirst
            } else {
                SortOrder::NewestFirst
            };
            let records = api.list_records(&parse_filter(args)?, parse_today(args)?, order)?;
            to_json(&records)
        }
        "show" => to_json(&api.get_record(args.require_positional(2, "id")?)?),
        "delete" => {
            api.delete_record(args.require_positional(2, "id")?)?;
            Ok(t("common.success"))
        }
        "clear" => {
            api.clear_records()?;
            Ok(t("common.success"))
        }
        "import" => {
            let summary = api.import_csv(Path::new(args.require_positional(2, "path")?))?;
            to_json(&summary)
        }
        "export" => {
            let path = args.require_positional(2, "path")?;
            let filter = parse_filter(args)?;
            let today = parse_today(args)?;
            // 先确认有数据，避免留下空文件
            if api.list_records(&filter, today, SortOrder::NewestFirst)?.is_empty() {
                return Err(ApiError::InvalidInput(t("common.no_data")));
            }
            let rows = api.export_csv(&filter, today, create_output(path)?)?;
            to_json(&serde_json::json!({ "path": path, "rows": rows }))
        }
        other => Err(ApiError::InvalidInput(format!("未知子命令: production {}", other))),
    }
}
