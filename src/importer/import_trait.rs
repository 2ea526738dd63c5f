// ==========================================
// SIGLAB Aviário - 导入管道 Trait
// ==========================================
// 管道: 文件解析 → 数据清洗 → 字段映射 → 导入报告
// 职责: 定义各阶段接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use chrono::NaiveDate;

// ==========================================
// RawRow - 解析后的原始行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 源文件行号（从 1 开始，含表头）
    pub line_number: usize,
    /// 已去除首尾空白与包裹引号的列值
    pub columns: Vec<String>,
}

impl RawRow {
    /// 读取列值，越界或为空时返回 None
    pub fn get(&self, index: usize) -> Option<&str> {
        self.columns
            .get(index)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文本内容 → 原始行（跳过表头与空行）
// 实现者: CsvParser
pub trait FileParser: Send + Sync {
    /// 解析 CSV 文本
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 数据行（不含表头）
    /// - Err: 内容整体无法解析
    fn parse_rows(&self, content: &str) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格级别的宽松清洗
// 实现者: DataCleaner (data_cleaner.rs)
pub trait DataCleaner: Send + Sync {
    /// 去除空白与包裹引号
    fn clean_text(&self, value: &str) -> String;

    /// 日期解析：YYYY-MM-DD 或 DD/MM/YYYY，其它格式返回 None
    fn parse_flexible_date(&self, value: &str) -> Option<NaiveDate>;

    /// 数值解析：无法识别时为 0
    fn parse_number(&self, value: &str) -> f64;

    /// 计数解析：负数与无法识别时为 0，小数四舍五入
    fn parse_count(&self, value: &str) -> u32;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 原始行 → 领域记录
// 实现者: ProductionFieldMapper, BatchFieldMapper
pub trait FieldMapper: Send + Sync {
    type Output;

    /// 映射单行
    ///
    /// # 返回
    /// - Ok(record): 映射成功
    /// - Err(reason): 该行被跳过，原因写入导入报告
    fn map_row(&self, row: &RawRow) -> Result<Self::Output, String>;
}
