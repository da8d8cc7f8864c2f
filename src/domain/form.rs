// ==========================================
// 安保服务管理系统 - 表单状态抽象
// ==========================================
// 用途: 干预登记表单的松散类型字段快照
// 契约: get(field) / set(field, value, {validate, mark_dirty})
// 红线: 引擎只通过本接口读写,不感知宿主表单框架
// ==========================================

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ==========================================
// FieldValue - 表单字段标量值
// ==========================================
// 说明: 表单输入通常以文本到达,数值/时间戳的读取需宽松转换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// 读取文本（仅 Text，空白视为缺失）
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            }
            _ => None,
        }
    }

    /// 读取数值（Number 直取；Text 尝试解析，失败返回 None）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            FieldValue::Timestamp(_) => None,
        }
    }

    /// 读取时间戳（Timestamp 直取；Text 依次尝试 RFC3339、
    /// "%Y-%m-%dT%H:%M:%S"、"%Y-%m-%dT%H:%M"，失败返回 None）
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            FieldValue::Text(s) => {
                let raw = s.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                    return Some(dt.with_timezone(&Utc));
                }
                // datetime-local 风格输入（无时区，按 UTC 处理）
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
                    .ok()
                    .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
            }
            FieldValue::Number(_) => None,
        }
    }
}

// ==========================================
// SetOptions - 写回选项
// ==========================================
// validate: 标记字段已通过校验
// mark_dirty: 标记字段被修改（下游保存逻辑据此识别真实变更）
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    pub validate: bool,
    pub mark_dirty: bool,
}

// ==========================================
// FormState Trait
// ==========================================
// 用途: 表单状态提供者接口
// 实现者: InMemoryFormState（以及宿主应用的任意表单框架适配层）
pub trait FormState {
    /// 读取字段当前值（缺失返回 None）
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// 写入字段值
    ///
    /// # 参数
    /// - field: 字段名
    /// - value: 新值
    /// - options: 校验/脏标记选项
    fn set(&mut self, field: &str, value: FieldValue, options: SetOptions);
}

// ==========================================
// InMemoryFormState - 内存表单状态
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryFormState {
    values: HashMap<String, FieldValue>,
    validated: HashSet<String>,
    dirty: HashSet<String>,
}

impl InMemoryFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造器风格的初始填充（不触发脏标记，模拟已加载的表单）
    pub fn with_value(mut self, field: &str, value: FieldValue) -> Self {
        self.values.insert(field.to_string(), value);
        self
    }

    /// 字段是否被标记为已修改
    pub fn is_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    /// 字段是否被标记为已校验
    pub fn is_validated(&self, field: &str) -> bool {
        self.validated.contains(field)
    }
}

impl FormState for InMemoryFormState {
    fn get(&self, field: &str) -> Option<FieldValue> {
        self.values.get(field).cloned()
    }

    fn set(&mut self, field: &str, value: FieldValue, options: SetOptions) {
        self.values.insert(field.to_string(), value);
        if options.validate {
            self.validated.insert(field.to_string());
        }
        if options.mark_dirty {
            self.dirty.insert(field.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_as_number_lenient() {
        assert_eq!(FieldValue::Number(15.0).as_number(), Some(15.0));
        assert_eq!(FieldValue::Text(" 15 ".to_string()).as_number(), Some(15.0));
        assert_eq!(FieldValue::Text("abc".to_string()).as_number(), None);
    }

    #[test]
    fn test_as_text_blank_is_none() {
        assert_eq!(FieldValue::Text("   ".to_string()).as_text(), None);
        assert_eq!(FieldValue::Text(" x ".to_string()).as_text(), Some("x"));
        assert_eq!(FieldValue::Number(1.0).as_text(), None);
    }

    #[test]
    fn test_as_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 7, 10, 8, 0, 0).unwrap();
        assert_eq!(
            FieldValue::Timestamp(expected).as_timestamp(),
            Some(expected)
        );
        assert_eq!(
            FieldValue::Text("2024-07-10T08:00:00Z".to_string()).as_timestamp(),
            Some(expected)
        );
        assert_eq!(
            FieldValue::Text("2024-07-10T08:00".to_string()).as_timestamp(),
            Some(expected)
        );
        assert_eq!(FieldValue::Text("not-a-date".to_string()).as_timestamp(), None);
    }

    #[test]
    fn test_set_marks_flags() {
        let mut form = InMemoryFormState::new();
        form.set(
            "ritardo",
            FieldValue::Number(5.0),
            SetOptions {
                validate: true,
                mark_dirty: true,
            },
        );

        assert!(form.is_dirty("ritardo"));
        assert!(form.is_validated("ritardo"));
        assert_eq!(form.get("ritardo"), Some(FieldValue::Number(5.0)));
    }

    #[test]
    fn test_with_value_does_not_mark_dirty() {
        let form = InMemoryFormState::new().with_value("ritardo", FieldValue::Number(5.0));
        assert!(!form.is_dirty("ritardo"));
        assert!(!form.is_validated("ritardo"));
    }
}
