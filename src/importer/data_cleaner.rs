// ==========================================
// SIGLAB Aviário - 数据清洗器实现
// ==========================================
// 职责: TRIM / 去引号 / 宽松数值 / 日期格式识别
// 规则: 无法识别的数值按 0 处理，不中断导入
// ==========================================

use crate::importer::import_trait::DataCleaner as DataCleanerTrait;
use chrono::NaiveDate;

pub struct DataCleaner;

fn has_shape(value: &str, separators: &[(usize, u8)]) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| {
        match separators.iter().find(|(pos, _)| *pos == i) {
            Some((_, sep)) => b == sep,
            None => b.is_ascii_digit(),
        }
    })
}

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str) -> String {
        value.trim().trim_matches('"').trim().to_string()
    }

    fn parse_flexible_date(&self, value: &str) -> Option<NaiveDate> {
        let v = value.trim();
        // YYYY-MM-DD
        if has_shape(v, &[(4, b'-'), (7, b'-')]) {
            return NaiveDate::parse_from_str(v, "%Y-%m-%d").ok();
        }
        // DD/MM/YYYY
        if has_shape(v, &[(2, b'/'), (5, b'/')]) {
            return NaiveDate::parse_from_str(v, "%d/%m/%Y").ok();
        }
        None
    }

    fn parse_number(&self, value: &str) -> f64 {
        let v = self.clean_text(value);
        if v.is_empty() {
            return 0.0;
        }
        let parsed = v.parse::<f64>().ok().or_else(|| {
            // 分号分隔文件中常见的逗号小数
            if v.contains(',') && !v.contains('.') {
                v.replace(',', ".").parse::<f64>().ok()
            } else {
                None
            }
        });
        match parsed {
            Some(n) if n.is_finite() => n,
            _ => 0.0,
        }
    }

    fn parse_count(&self, value: &str) -> u32 {
        let n = self.parse_number(value);
        if n <= 0.0 {
            0
        } else if n >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            n.round() as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flexible_date() {
        let c = DataCleaner;
        let expected = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert_eq!(c.parse_flexible_date("2024-02-01"), expected);
        assert_eq!(c.parse_flexible_date(" 01/02/2024 "), expected);
        assert_eq!(c.parse_flexible_date("2024/02/01"), None);
        assert_eq!(c.parse_flexible_date("2024-2-1"), None);
        assert_eq!(c.parse_flexible_date("31/02/2024"), None);
        assert_eq!(c.parse_flexible_date("Aviario"), None);
    }

    #[test]
    fn test_parse_number_lenient() {
        let c = DataCleaner;
        assert_eq!(c.parse_number("62.5"), 62.5);
        assert_eq!(c.parse_number("62,5"), 62.5);
        assert_eq!(c.parse_number(""), 0.0);
        assert_eq!(c.parse_number("abc"), 0.0);
        assert_eq!(c.parse_number("\"12\""), 12.0);
        assert_eq!(c.parse_number("NaN"), 0.0);
    }

    #[test]
    fn test_parse_count() {
        let c = DataCleaner;
        assert_eq!(c.parse_count("20"), 20);
        assert_eq!(c.parse_count("19.6"), 20);
        assert_eq!(c.parse_count("-3"), 0);
        assert_eq!(c.parse_count("x"), 0);
    }
}
