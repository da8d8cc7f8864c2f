// ==========================================
// 安保服务管理系统 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段映射 + 类型转换 + 必填校验
// 策略: Nome/Cognome 缺失 → 整行硬失败;
//       cliente_id 非法 → 降级为 None（软失败,刻意与姓名策略不对称）
// ==========================================

use crate::domain::operator::OperatorRecord;
use crate::importer::error::ImportError;
use crate::importer::operator_importer_trait::FieldMapper as FieldMapperTrait;
use std::collections::HashMap;
use uuid::Uuid;

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_operator(
        &self,
        row: HashMap<String, String>,
        row_number: usize,
    ) -> Result<OperatorRecord, Box<dyn std::error::Error>> {
        let nome = self.get_string(&row, "nome");
        let cognome = self.get_string(&row, "cognome");

        // 必填身份字段: 任一缺失/为空 → 整行拒绝
        let (nome, cognome) = match (nome, cognome) {
            (Some(n), Some(c)) => (n, c),
            _ => {
                return Err(Box::new(ImportError::RequiredFieldMissing {
                    row: row_number,
                    message: "Nome 与 Cognome 均为必填字段".to_string(),
                }))
            }
        };

        Ok(OperatorRecord {
            nome,
            cognome,
            cliente_id: self.parse_cliente_id(&row),
            telefono: self.get_string(&row, "telefono"),
            email: self.get_string(&row, "email"),
            note: self.get_string(&row, "note"),
            row_number,
        })
    }
}

impl FieldMapper {
    /// 提取字符串字段（返回 Option），支持多个可能的列名（别名）
    ///
    /// 别名按优先级顺序逐个精确匹配（大小写敏感），命中即取
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        // 定义列名别名映射
        let aliases: Vec<&str> = match key {
            "nome" => vec!["Nome", "nome", "NOME", "Nome Operatore"],
            "cognome" => vec!["Cognome", "cognome", "COGNOME", "Cognome Operatore"],
            "cliente_id" => vec!["ID Cliente", "id_cliente", "idCliente", "ID Cliente (UUID)"],
            "telefono" => vec!["Telefono", "telefono", "TELEFONO", "Cellulare"],
            "email" => vec!["Email", "email", "EMAIL", "E-mail"],
            "note" => vec!["Note", "note", "NOTE", "Annotazioni"],
            _ => vec![key],
        };

        // 尝试所有可能的列名
        for alias in aliases {
            if let Some(v) = row.get(alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    /// 解析客户 ID
    ///
    /// # 规则
    /// - 仅接受连字符 8-4-4-4-12 标准分组（大小写不敏感）
    /// - 缺失或非法 → None,不拒绝整行
    fn parse_cliente_id(&self, row: &HashMap<String, String>) -> Option<Uuid> {
        let raw = self.get_string(row, "cliente_id")?;

        // uuid crate 也接受无连字符/带大括号/urn 等形式,此处按导出格式收紧
        if raw.len() != 36 {
            return None;
        }
        Uuid::parse_str(&raw).ok()
    }
}
