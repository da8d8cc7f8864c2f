// ==========================================
// 安保服务管理系统 - 冲突处理器实现
// ==========================================
// 职责: 检测同批次内/跨批次重复操作员（姓名去重键）
// ==========================================

use crate::domain::operator::OperatorRecord;
use crate::importer::operator_importer_trait::ConflictHandler as ConflictHandlerTrait;
use std::collections::{HashMap, HashSet};

pub struct ConflictHandler;

impl ConflictHandlerTrait for ConflictHandler {
    /// 检测同批次内重复操作员
    ///
    /// # 返回
    /// - Vec<(行号, 标签)>: 重复记录列表（不包括第一次出现）
    fn detect_duplicates(&self, records: &[OperatorRecord]) -> Vec<(usize, String)> {
        let mut first_occurrence: HashMap<String, usize> = HashMap::new();
        let mut duplicates = Vec::new();

        for record in records {
            let key = record.dedup_key();
            if first_occurrence.contains_key(&key) {
                // 发现重复：记录当前行号
                duplicates.push((record.row_number, record.label()));
            } else {
                // 首次出现：记录行号
                first_occurrence.insert(key, record.row_number);
            }
        }

        duplicates
    }

    /// 检测跨批次重复（与数据库中已有操作员比对）
    ///
    /// # 参数
    /// - records: 待导入记录列表
    /// - existing_keys: 数据库中已存在的姓名去重键列表
    fn detect_cross_batch_duplicates(
        &self,
        records: &[OperatorRecord],
        existing_keys: &[String],
    ) -> Vec<(usize, String)> {
        let existing_set: HashSet<_> = existing_keys.iter().collect();
        let mut duplicates = Vec::new();

        for record in records {
            if existing_set.contains(&record.dedup_key()) {
                duplicates.push((record.row_number, record.label()));
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::operator_importer_trait::ConflictHandler as ConflictHandlerTrait;

    fn create_test_record(nome: &str, cognome: &str, row_number: usize) -> OperatorRecord {
        OperatorRecord {
            nome: nome.to_string(),
            cognome: cognome.to_string(),
            cliente_id: None,
            telefono: None,
            email: None,
            note: None,
            row_number,
        }
    }

    #[test]
    fn test_detect_duplicates_none() {
        let handler = ConflictHandler;
        let records = vec![
            create_test_record("Mario", "Rossi", 1),
            create_test_record("Luca", "Bianchi", 2),
        ];

        let duplicates = handler.detect_duplicates(&records);

        assert_eq!(duplicates.len(), 0);
    }

    #[test]
    fn test_detect_duplicates_found() {
        let handler = ConflictHandler;
        let records = vec![
            create_test_record("Mario", "Rossi", 1),
            create_test_record("Luca", "Bianchi", 2),
            create_test_record("MARIO", "rossi", 3), // 大小写不同仍视为重复
        ];

        let duplicates = handler.detect_duplicates(&records);

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].0, 3); // 行号
    }

    #[test]
    fn test_detect_duplicates_multiple() {
        let handler = ConflictHandler;
        let records = vec![
            create_test_record("Mario", "Rossi", 1),
            create_test_record("Mario", "Rossi", 2), // 重复
            create_test_record("Mario", "Rossi", 3), // 再次重复
        ];

        let duplicates = handler.detect_duplicates(&records);

        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[0].0, 2);
        assert_eq!(duplicates[1].0, 3);
    }

    #[test]
    fn test_detect_cross_batch_duplicates() {
        let handler = ConflictHandler;
        let records = vec![
            create_test_record("Mario", "Rossi", 1),
            create_test_record("Luca", "Bianchi", 2),
        ];

        let existing_keys = vec!["mario|rossi".to_string()];

        let duplicates = handler.detect_cross_batch_duplicates(&records, &existing_keys);

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].0, 1);
        assert_eq!(duplicates[0].1, "Mario Rossi");
    }
}
