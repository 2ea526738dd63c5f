use crate::api::dashboard_api::ChartKind;
use crate::api::error::{ApiError, ApiResult};
use crate::app::commands::common::{parse_filter, parse_today, to_json, CliArgs};
use crate::app::state::AppState;
use crate::domain::types::AviaryId;

// ==========================================
// 看板命令
// ==========================================
// dashboard general|aviary|monthly|maturity [筛选]
// dashboard options
// dashboard chart monthly|rate|maturity [--line N] [--out file.svg] [筛选]

pub fn run(state: &AppState, args: &CliArgs) -> ApiResult<String> {
    let api = &state.dashboard_api;
    let sub = args.require_positional(1, "general|aviary|monthly|maturity|options|chart")?;
    if sub == "options" {
        return to_json(&api.options()?);
    }

    let filter = parse_filter(args)?;
    let today = parse_today(args)?;
    match sub {
        "general" => to_json(&api.general(&filter, today)?),
        "aviary" => to_json(&api.aviaries(&filter, today)?),
        "monthly" => to_json(&api.monthly(&filter, today)?),
        "maturity" => to_json(&api.maturity(&filter, today)?),
        "chart" => {
            let kind = match args.require_positional(2, "monthly|rate|maturity")? {
                "monthly" => ChartKind::Monthly(args.parsed_option::<AviaryId>("line")?),
                "rate" => ChartKind::LayingRate,
                "maturity" => ChartKind::Maturity,
                other => return Err(ApiError::InvalidInput(format!("未知图表类型: {}", other))),
            };
            let svg = api.chart(kind, &filter, today)?;
            match args.option("out") {
                Some(path) => {
                    std::fs::write(path, &svg).map_err(|e| {
                        ApiError::InternalError(format!("无法写入文件 {}: {}", path, e))
                    })?;
                    to_json(&serde_json::json!({ "path": path, "bytes": svg.len() }))
                }
                None => Ok(svg),
            }
        }
        other => Err(ApiError::InvalidInput(format!("未知子命令: dashboard {}", other))),
    }
}
