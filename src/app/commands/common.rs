use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::AviaryId;
use crate::engine::filter::{Fortnight, PeriodFilter, RecordFilter};

// ==========================================
// 公共工具：参数解析、筛选条件、JSON 输出
// ==========================================

/// 命令行参数
///
/// - 位置参数：命令、子命令及其操作数
/// - `--name value`：选项
/// - `--name`（后面紧跟另一个选项或结束）：开关
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub positional: Vec<String>,
    options: HashMap<String, String>,
    flags: Vec<String>,
}

impl CliArgs {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = CliArgs::default();
        let mut iter = args.into_iter().map(Into::into).peekable();

        while let Some(arg) = iter.next() {
            match arg.strip_prefix("--") {
                Some(name) if !name.is_empty() => {
                    let takes_value = iter.peek().map(|next| !next.starts_with("--")).unwrap_or(false);
                    if takes_value {
                        if let Some(value) = iter.next() {
                            parsed.options.insert(name.to_string(), value);
                        }
                    } else {
                        parsed.flags.push(name.to_string());
                    }
                }
                _ => parsed.positional.push(arg),
            }
        }
        parsed
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// 必填位置参数
    pub fn require_positional(&self, index: usize, name: &str) -> ApiResult<&str> {
        self.positional(index)
            .ok_or_else(|| ApiError::InvalidInput(format!("缺少参数: <{}>", name)))
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }

    /// 解析可选的类型化选项
    pub fn parsed_option<T: FromStr>(&self, name: &str) -> ApiResult<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        self.option(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| ApiError::InvalidInput(format!("--{} 无效 ({}): {}", name, raw, e)))
            })
            .transpose()
    }
}

/// 从命令行选项组装筛选条件
///
/// 支持: --period --year --month --fortnight --aviary --batch --search
pub fn parse_filter(args: &CliArgs) -> ApiResult<RecordFilter> {
    let month: Option<u32> = args.parsed_option("month")?;
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            return Err(ApiError::InvalidInput(format!("--month 超出范围: {}", m)));
        }
    }

    Ok(RecordFilter {
        period: args.parsed_option::<PeriodFilter>("period")?.unwrap_or_default(),
        year: args.parsed_option("year")?,
        month,
        fortnight: args.parsed_option::<Fortnight>("fortnight")?,
        aviary: args.parsed_option::<AviaryId>("aviary")?,
        batch_id: args.option("batch").map(str::to_string),
        search: args.option("search").map(str::to_string),
    })
}

/// 参考日期：--today 选项或本地当天
pub fn parse_today(args: &CliArgs) -> ApiResult<NaiveDate> {
    match args.option("today") {
        Some(raw) => parse_date(raw),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// 解析日期字符串
pub fn parse_date(date_str: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::InvalidInput(format!("日期格式错误（应为YYYY-MM-DD）: {}", e)))
}

/// 读取表单 JSON：--json 直接给出，或 --file 指向文件
pub fn read_form_json<T: serde::de::DeserializeOwned>(args: &CliArgs) -> ApiResult<T> {
    let raw = match (args.option("json"), args.option("file")) {
        (Some(json), _) => json.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| ApiError::InvalidInput(format!("无法读取表单文件 {}: {}", path, e)))?,
        (None, None) => {
            return Err(ApiError::InvalidInput("缺少表单数据: --json 或 --file".to_string()))
        }
    };
    serde_json::from_str(&raw).map_err(|e| ApiError::InvalidInput(format!("表单 JSON 无效: {}", e)))
}

pub fn to_json<T: Serialize>(value: &T) -> ApiResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InternalError(format!("序列化失败: {}", e)))
}

/// 创建输出文件
pub fn create_output(path: &str) -> ApiResult<std::fs::File> {
    std::fs::File::create(path)
        .map_err(|e| ApiError::InternalError(format!("无法创建文件 {}: {}", path, e)))
}
