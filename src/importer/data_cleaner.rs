// ==========================================
// 安保服务管理系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 联系方式规范化
// ==========================================

use crate::importer::operator_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn clean_telefono(&self, value: Option<String>) -> Option<String> {
        self.normalize_null(value).and_then(|v| {
            // 保留前导 '+'，其余仅保留数字（去除空格/点/横线/括号等排版字符）
            let mut cleaned = String::new();
            let mut chars = v.chars().peekable();
            if chars.peek() == Some(&'+') {
                cleaned.push('+');
                chars.next();
            }
            cleaned.extend(chars.filter(|c| c.is_ascii_digit()));

            if cleaned.trim_start_matches('+').is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
    }

    fn clean_email(&self, value: Option<String>) -> Option<String> {
        self.normalize_null(value).map(|v| v.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::operator_importer_trait::DataCleaner as DataCleanerTrait;

    #[test]
    fn test_clean_text_basic() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  rossi  ", false), "rossi");
        assert_eq!(cleaner.clean_text("  rossi  ", true), "ROSSI");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(cleaner.normalize_null(Some("".to_string())), None);
        assert_eq!(
            cleaner.normalize_null(Some("  value  ".to_string())),
            Some("value".to_string())
        );
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_clean_telefono() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.clean_telefono(Some("+39 333 123-4567".to_string())),
            Some("+393331234567".to_string())
        );
        assert_eq!(
            cleaner.clean_telefono(Some("333.123.4567".to_string())),
            Some("3331234567".to_string())
        );
        assert_eq!(
            cleaner.clean_telefono(Some("(02) 1234567".to_string())),
            Some("021234567".to_string())
        );
        // 无任何数字 → None
        assert_eq!(cleaner.clean_telefono(Some("n/d".to_string())), None);
        assert_eq!(cleaner.clean_telefono(Some("+".to_string())), None);
        assert_eq!(cleaner.clean_telefono(None), None);
    }

    #[test]
    fn test_clean_email() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.clean_email(Some("  Mario.Rossi@Example.COM ".to_string())),
            Some("mario.rossi@example.com".to_string())
        );
        assert_eq!(cleaner.clean_email(Some("   ".to_string())), None);
    }
}
