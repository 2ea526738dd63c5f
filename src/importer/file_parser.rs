// ==========================================
// SIGLAB Aviário - CSV 解析器
// ==========================================
// 分隔符识别:
// - PerLine: 每行独立判断，含 ';' 用 ';'，否则 ','（日产记录）
// - FromHeader: 按表头判断，';' > ',' > '\t'（批次记录）
// 公共处理: 去除 UTF-8 BOM / 跳过表头 / 跳过空行 / 去除包裹引号
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_trait::{FileParser, RawRow};
use csv::{ReaderBuilder, StringRecord};

const UTF8_BOM: char = '\u{feff}';

/// 分隔符识别方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterMode {
    PerLine,
    FromHeader,
}

/// 按表头识别分隔符
pub fn detect_header_delimiter(header: &str) -> u8 {
    if header.contains(';') {
        b';'
    } else if header.contains(',') {
        b','
    } else if header.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

/// 单行识别分隔符
pub fn detect_line_delimiter(line: &str) -> u8 {
    if line.contains(';') {
        b';'
    } else {
        b','
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix(UTF8_BOM).unwrap_or(content)
}

fn clean_cell(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

fn to_raw_row(line_number: usize, record: &StringRecord) -> Option<RawRow> {
    let columns: Vec<String> = record.iter().map(clean_cell).collect();
    // 跳过完全空白的行
    if columns.iter().all(|c| c.is_empty()) {
        return None;
    }
    Some(RawRow {
        line_number,
        columns,
    })
}

// ==========================================
// CsvParser 实现
// ==========================================
pub struct CsvParser {
    mode: DelimiterMode,
}

impl CsvParser {
    pub fn new(mode: DelimiterMode) -> Self {
        Self { mode }
    }

    /// 日产记录 CSV
    pub fn per_line() -> Self {
        Self::new(DelimiterMode::PerLine)
    }

    /// 批次记录 CSV
    pub fn from_header() -> Self {
        Self::new(DelimiterMode::FromHeader)
    }

    fn parse_per_line(&self, content: &str) -> ImportResult<Vec<RawRow>> {
        let mut rows = Vec::new();
        // 首行为表头
        for (idx, line) in content.lines().enumerate().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut reader = ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .delimiter(detect_line_delimiter(line))
                .from_reader(line.as_bytes());

            let mut record = StringRecord::new();
            match reader.read_record(&mut record) {
                Ok(true) => {
                    if let Some(row) = to_raw_row(idx + 1, &record) {
                        rows.push(row);
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    // 引号不成对等单行错误：退化为简单切分
                    tracing::debug!(line = idx + 1, error = %e, "CSV 行解析失败，按分隔符直接切分");
                    let sep = char::from(detect_line_delimiter(line));
                    let columns: Vec<String> = line
                        .split(sep)
                        .map(|c| c.replace('"', "").trim().to_string())
                        .collect();
                    rows.push(RawRow {
                        line_number: idx + 1,
                        columns,
                    });
                }
            }
        }
        Ok(rows)
    }

    fn parse_from_header(&self, content: &str) -> ImportResult<Vec<RawRow>> {
        let header = content
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or(ImportError::EmptyFile)?;
        let delimiter = detect_header_delimiter(&header.to_lowercase());

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_reader(content.trim_start().as_bytes());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(0);
            if let Some(row) = to_raw_row(line_number, &record) {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

impl FileParser for CsvParser {
    fn parse_rows(&self, content: &str) -> ImportResult<Vec<RawRow>> {
        let content = strip_bom(content);
        if content.trim().is_empty() {
            return Err(ImportError::EmptyFile);
        }
        match self.mode {
            DelimiterMode::PerLine => self.parse_per_line(content),
            DelimiterMode::FromHeader => self.parse_from_header(content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_header_delimiter() {
        assert_eq!(detect_header_delimiter("data;aviario"), b';');
        assert_eq!(detect_header_delimiter("data,aviario"), b',');
        assert_eq!(detect_header_delimiter("data\taviario"), b'\t');
        assert_eq!(detect_header_delimiter("data"), b',');
    }

    #[test]
    fn test_per_line_mixed_separators() {
        let content = "Data;Aviario\n2024-01-01;1;L1\n\n2024-01-02,2,\"L,2\"\n";
        let rows = CsvParser::per_line().parse_rows(content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line_number, 2);
        assert_eq!(rows[0].columns, vec!["2024-01-01", "1", "L1"]);
        assert_eq!(rows[1].line_number, 4);
        assert_eq!(rows[1].columns[2], "L,2");
    }

    #[test]
    fn test_from_header_strips_bom_and_quotes() {
        let content = "\u{feff}Data;Aviario;Lote\r\n\"01/02/2024\";\"2\";\"L-9\"\r\n";
        let rows = CsvParser::from_header().parse_rows(content).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns, vec!["01/02/2024", "2", "L-9"]);
    }

    #[test]
    fn test_from_header_tab_separated() {
        let content = "data\taviario\tlote\n2024-03-01\t3\tL3\n";
        let rows = CsvParser::from_header().parse_rows(content).unwrap();
        assert_eq!(rows[0].columns, vec!["2024-03-01", "3", "L3"]);
    }

    #[test]
    fn test_empty_content_is_error() {
        assert!(matches!(
            CsvParser::per_line().parse_rows("\u{feff}  \n"),
            Err(ImportError::EmptyFile)
        ));
    }

    #[test]
    fn test_raw_row_get_treats_empty_as_missing() {
        let row = RawRow {
            line_number: 2,
            columns: vec!["a".to_string(), String::new()],
        };
        assert_eq!(row.get(0), Some("a"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(5), None);
    }
}
